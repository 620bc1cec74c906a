//! # 数据导出
//!
//! 导出投影结果与角度扫描结果。
//!
//! ## 支持格式
//! - 投影 CSV: `kind, x, y`（原子位置 + 标注箭头端点）
//! - 扫描 CSV: `theta_deg, path_diff, ratio, order`
//! - 扫描 XY: 标准两列文本（θ, 2d·sin(θ)/λ）
//!
//! ## 依赖关系
//! - 被 `commands/lattice.rs`, `commands/sweep.rs` 调用
//! - 使用 `csv` 库写入 CSV 文件

use crate::error::{Result, XrayError};
use crate::xrd::projector::Projection;
use crate::xrd::sweep::AngleSweep;

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct ProjectionRow<'a> {
    kind: &'a str,
    x: String,
    y: String,
}

/// 导出投影为 CSV
pub fn projection_to_csv(projection: &Projection, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for p in &projection.atom_positions {
        wtr.serialize(ProjectionRow {
            kind: "atom",
            x: format!("{:.4}", p.x),
            y: format!("{:.4}", p.y),
        })?;
    }

    for arrow in projection.annotations.iter() {
        let label = arrow.kind.label();
        for (suffix, p) in [("tail", arrow.tail), ("tip", arrow.tip)] {
            wtr.serialize(ProjectionRow {
                kind: &format!("{}_{}", label, suffix),
                x: format!("{:.4}", p.x),
                y: format!("{:.4}", p.y),
            })?;
        }
    }

    wtr.flush().map_err(|e| XrayError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出扫描结果为 CSV
pub fn sweep_to_csv(sweep: &AngleSweep, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["theta_deg", "path_diff", "ratio", "order"])?;

    for s in &sweep.samples {
        wtr.write_record(&[
            format!("{:.4}", s.theta_deg),
            format!("{:.6}", s.path_diff),
            s.ratio.map(|r| format!("{:.6}", r)).unwrap_or_default(),
            s.order.map(|n| n.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush().map_err(|e| XrayError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出扫描结果为 XY 格式
pub fn sweep_to_xy(sweep: &AngleSweep, output_path: &Path) -> Result<()> {
    let write_err = |e| XrayError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    };

    let file = File::create(output_path).map_err(write_err)?;
    let mut out = BufWriter::new(file);

    let c = &sweep.constants;
    writeln!(out, "# Bragg sweep: a = {:.4}, d = {:.4}", c.x, c.z).map_err(write_err)?;
    writeln!(out, "# Wavelength: {:.6}", sweep.wavelength).map_err(write_err)?;
    writeln!(out, "# Columns: theta (degrees), 2d sin(theta)/lambda").map_err(write_err)?;
    writeln!(out, "#").map_err(write_err)?;

    for s in &sweep.samples {
        if let Some(r) = s.ratio {
            writeln!(out, "{:.4}\t{:.6}", s.theta_deg, r).map_err(write_err)?;
        }
    }

    out.flush().map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchRunner;
    use crate::models::{LatticeConstants, LatticeSite};
    use crate::xrd::projector::project;
    use crate::xrd::sweep::{sweep, SweepRange, DEFAULT_TOLERANCE};
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("xraydiff_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_projection_csv() {
        let c = LatticeConstants::new(4.0, 0.0, 5.0);
        let p = project(&[LatticeSite::new(-2.0, -3.0)], &c, 8.0).unwrap();
        let path = temp_path("projection.csv");

        projection_to_csv(&p, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "kind,x,y");
        assert_eq!(lines[1], "atom,-16.0000,-24.0000");
        assert_eq!(lines[2], "a_tail,-16.0000,40.0000");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_sweep_csv_and_xy() {
        let c = LatticeConstants::new(4.0, 0.0, 5.0);
        let range = SweepRange::new(0.0, 10.0, 5.0).unwrap();
        let s = sweep(&c, 2.0, &range, DEFAULT_TOLERANCE, &BatchRunner::new(1)).unwrap();

        let csv_path = temp_path("sweep.csv");
        sweep_to_csv(&s, &csv_path).unwrap();
        let text = fs::read_to_string(&csv_path).unwrap();
        fs::remove_file(&csv_path).ok();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("theta_deg,path_diff,ratio,order"));
        assert!(text.contains("0.0000,0.000000,0.000000,"));

        let xy_path = temp_path("sweep.xy");
        sweep_to_xy(&s, &xy_path).unwrap();
        let text = fs::read_to_string(&xy_path).unwrap();
        fs::remove_file(&xy_path).ok();
        let data: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0], "0.0000\t0.000000");
    }
}
