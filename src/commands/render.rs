//! # render 子命令实现
//!
//! 计算派生量与投影，绘制晶体视图和参数面板。
//!
//! ## 依赖关系
//! - 使用 `cli/render.rs` 定义的 RenderArgs
//! - 使用 `xrd/` 模块进行计算与绘图

use crate::cli::render::{ImageFormat, RenderArgs};
use crate::error::Result;
use crate::utils::{output, parse};
use crate::xrd::{plot, DiffractionMetrics, LatticeProjector, ParameterPanel};

use std::path::Path;

/// 执行 render 命令
pub fn execute(args: RenderArgs) -> Result<()> {
    output::print_header("Crystal View Rendering");

    let constants = parse::parse_constants(&args.source.lattice)?;
    let wavelength = parse::parse_wavelength(&args.source.wavelength)?;
    let angle = args.source.angle.to_radians();

    let metrics = DiffractionMetrics::compute(angle, &constants, wavelength);
    let mut panel = ParameterPanel::default();
    panel.apply(&metrics);

    let sites = super::resolve_sites(&args.grid, &constants)?;
    let projection = LatticeProjector::new(args.grid.scale)?.project(&sites, &constants)?;
    output::print_info(&format!("Projected {} atoms", projection.atom_positions.len()));

    let format = args
        .format
        .unwrap_or_else(|| guess_format_from_extension(&args.output));

    plot::render_crystal(
        &projection,
        &panel.lines(),
        &args.output,
        args.width,
        args.height,
        format == ImageFormat::Svg,
    )?;

    output::print_success(&format!("Crystal view saved to '{}'", args.output.display()));
    Ok(())
}

/// 从文件扩展名推断输出格式
fn guess_format_from_extension(path: &Path) -> ImageFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("svg") => ImageFormat::Svg,
        _ => ImageFormat::Png,
    }
}
