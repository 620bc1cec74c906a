//! # sweep 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/sweep.rs`

use crate::xrd::sweep::DEFAULT_TOLERANCE;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 扫描结果输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SweepOutputFormat {
    /// CSV data file (θ, path difference, ratio, order)
    Csv,
    /// XY data file (θ, ratio)
    Xy,
    /// PNG plot
    Png,
    /// SVG plot
    Svg,
}

/// sweep 子命令参数
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Lattice constants "x,y,z" (d = z)
    #[arg(short, long, default_value = "8,0,6", env = "XRAYDIFF_LATTICE")]
    pub lattice: String,

    /// X-ray wavelength: radiation source name (cu-ka, mo-ka, etc.) or value in Å
    #[arg(short, long, default_value = "8", env = "XRAYDIFF_WAVELENGTH")]
    pub wavelength: String,

    /// Incident angle range in degrees (e.g., "0-90")
    #[arg(short, long, default_value = "0-90")]
    pub range: String,

    /// Angle step in degrees
    #[arg(long, default_value_t = 0.1)]
    pub step: f64,

    /// Tolerance when matching 2d sin(θ)/λ to an integer order
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// Output file (CSV, XY or plot); prints a table only when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (auto-detected from extension if not specified)
    #[arg(short, long, value_enum)]
    pub format: Option<SweepOutputFormat>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,
}
