//! # lattice 子命令实现
//!
//! 生成晶格位点，投影到屏幕坐标，打印原子与标注箭头，可选导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/lattice.rs` 定义的 LatticeArgs
//! - 使用 `xrd/projector.rs` 和 `xrd/export.rs`

use crate::cli::lattice::LatticeArgs;
use crate::error::Result;
use crate::utils::{output, parse};
use crate::xrd::{export, LatticeProjector, Projection};

/// 执行 lattice 命令
pub fn execute(args: LatticeArgs) -> Result<()> {
    output::print_header("Lattice Projection");

    let constants = parse::parse_constants(&args.lattice)?;
    let sites = super::resolve_sites(&args.grid, &constants)?;
    let projector = LatticeProjector::new(args.grid.scale)?;

    output::print_info(&format!(
        "{} sites, lattice constants ({}, {}, {}), scale {}",
        sites.len(),
        constants.x,
        constants.y,
        constants.z,
        projector.scale()
    ));

    let projection = projector.project(&sites, &constants)?;

    output::print_info(&format!(
        "Bounds: xMin = {:.2}, yMin = {:.2}",
        projection.bounds.x_min, projection.bounds.y_min
    ));

    print_projection_tables(&projection, args.top_n);

    if let Some(path) = &args.output {
        export::projection_to_csv(&projection, path)?;
        output::print_success(&format!("Projection saved to '{}'", path.display()));
    }

    Ok(())
}

/// 打印原子与标注箭头表格
fn print_projection_tables(projection: &Projection, count: usize) {
    use tabled::{Table, Tabled};

    #[derive(Tabled)]
    struct AtomRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "x (px)")]
        x: String,
        #[tabled(rename = "y (px)")]
        y: String,
    }

    #[derive(Tabled)]
    struct ArrowRow {
        #[tabled(rename = "label")]
        label: &'static str,
        #[tabled(rename = "tail")]
        tail: String,
        #[tabled(rename = "tip")]
        tip: String,
        #[tabled(rename = "length (px)")]
        length: String,
    }

    let atoms: Vec<AtomRow> = projection
        .atom_positions
        .iter()
        .take(count)
        .enumerate()
        .map(|(index, p)| AtomRow {
            index,
            x: format!("{:.2}", p.x),
            y: format!("{:.2}", p.y),
        })
        .collect();

    if !atoms.is_empty() {
        output::print_header(&format!(
            "Atoms ({} of {})",
            atoms.len(),
            projection.atom_positions.len()
        ));
        println!("{}", Table::new(&atoms));
    }

    let arrows: Vec<ArrowRow> = projection
        .annotations
        .iter()
        .map(|a| ArrowRow {
            label: a.kind.label(),
            tail: format!("({:.2}, {:.2})", a.tail.x, a.tail.y),
            tip: format!("({:.2}, {:.2})", a.tip.x, a.tip.y),
            length: format!("{:.2}", a.length()),
        })
        .collect();

    output::print_header("Dimension Arrows");
    println!("{}", Table::new(&arrows));
}
