//! # sweep 子命令实现
//!
//! 扫描入射角，列出解析 Bragg 级次，并导出数据或曲线图。
//!
//! ## 依赖关系
//! - 使用 `cli/sweep.rs` 定义的 SweepArgs
//! - 使用 `batch/` 并行计算
//! - 使用 `xrd/sweep.rs`, `xrd/export.rs`, `xrd/plot.rs`

use crate::batch::BatchRunner;
use crate::cli::sweep::{SweepArgs, SweepOutputFormat};
use crate::error::Result;
use crate::utils::{output, parse};
use crate::xrd::sweep::{self, AngleSweep, SweepRange};
use crate::xrd::{export, plot};

use std::path::Path;

/// 执行 sweep 命令
pub fn execute(args: SweepArgs) -> Result<()> {
    output::print_header("Incident Angle Sweep");

    let constants = parse::parse_constants(&args.lattice)?;
    let wavelength = parse::parse_wavelength(&args.wavelength)?;
    let (start, end) = parse::parse_range(&args.range)?;
    let range = SweepRange::new(start, end, args.step)?;

    output::print_info(&format!("Using wavelength: {:.4} Å, d = {:.4} Å", wavelength, constants.z));
    output::print_info(&format!(
        "θ range: {:.1}° - {:.1}° (step {}°, {} samples)",
        start,
        end,
        args.step,
        range.sample_count()
    ));

    let runner = BatchRunner::new(args.jobs);
    let result = sweep::sweep(&constants, wavelength, &range, args.tolerance, &runner)?;

    output::print_success(&format!(
        "Evaluated {} angles on {} threads",
        result.samples.len(),
        runner.jobs()
    ));

    let orders = match sweep::bragg_orders(constants.z, wavelength) {
        Ok(orders) => orders,
        Err(e) => {
            output::print_warning(&e.to_string());
            Vec::new()
        }
    };
    super::metrics::print_order_table(&orders);
    print_match_summary(&result);

    if let Some(path) = &args.output {
        let format = args
            .format
            .unwrap_or_else(|| guess_format_from_extension(path));

        match format {
            SweepOutputFormat::Csv => export::sweep_to_csv(&result, path)?,
            SweepOutputFormat::Xy => export::sweep_to_xy(&result, path)?,
            SweepOutputFormat::Png | SweepOutputFormat::Svg => {
                let title = format!("Bragg sweep (d = {}, λ = {})", constants.z, wavelength);
                plot::render_sweep(
                    &result,
                    &orders,
                    path,
                    &title,
                    args.width,
                    args.height,
                    format == SweepOutputFormat::Svg,
                )?
            }
        }
        output::print_success(&format!("Sweep saved to '{}'", path.display()));
    }

    Ok(())
}

/// 打印满足 Bragg 条件的采样区间
fn print_match_summary(result: &AngleSweep) {
    output::print_separator();
    let runs = match_runs(result);

    if runs.is_empty() {
        output::print_warning("No sampled angle satisfies the Bragg condition");
    }
    for (n, lo, hi) in runs {
        output::print_info(&format!("n = {}: θ ≈ {:.2}° - {:.2}°", n, lo, hi));
    }
}

/// 按级次合并匹配点，返回 (n, θ 起点, θ 终点)
fn match_runs(result: &AngleSweep) -> Vec<(u32, f64, f64)> {
    let mut runs: Vec<(u32, f64, f64)> = Vec::new();
    for s in result.matches() {
        let Some(n) = s.order else { continue };
        match runs.last_mut() {
            Some(run) if run.0 == n => run.2 = s.theta_deg,
            _ => runs.push((n, s.theta_deg, s.theta_deg)),
        }
    }
    runs
}

/// 从文件扩展名推断输出格式
fn guess_format_from_extension(path: &Path) -> SweepOutputFormat {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("png") => SweepOutputFormat::Png,
        Some("svg") => SweepOutputFormat::Svg,
        Some("xy") | Some("dat") | Some("txt") => SweepOutputFormat::Xy,
        _ => SweepOutputFormat::Csv,
    }
}
