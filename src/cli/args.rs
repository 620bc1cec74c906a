//! # 公共参数
//!
//! 多个子命令共用的 X 射线源参数与晶格网格参数。
//!
//! ## 依赖关系
//! - 被 `cli/` 下各子命令参数 flatten 使用

use crate::xrd::projector::DISPLAY_SCALE;

use clap::Args;

/// X 射线源与晶格常数
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Incident angle θ in degrees
    #[arg(short, long, default_value_t = 30.0, env = "XRAYDIFF_ANGLE", allow_negative_numbers = true)]
    pub angle: f64,

    /// X-ray wavelength: radiation source name (cu-ka, mo-ka, etc.) or value in Å
    #[arg(short, long, default_value = "8", env = "XRAYDIFF_WAVELENGTH")]
    pub wavelength: String,

    /// Lattice constants "x,y,z" (a = x, d = z)
    #[arg(short, long, default_value = "8,0,6", env = "XRAYDIFF_LATTICE")]
    pub lattice: String,
}

/// 晶格网格与显示放大倍数
#[derive(Args, Debug, Clone)]
pub struct GridArgs {
    /// Number of atom columns
    #[arg(long, default_value_t = 7)]
    pub columns: usize,

    /// Number of atom rows
    #[arg(long, default_value_t = 4)]
    pub rows: usize,

    /// Explicit site list "(x,y);(x,y);..." overriding the generated grid
    #[arg(long, allow_hyphen_values = true)]
    pub sites: Option<String>,

    /// Display magnification (pixels per lattice unit)
    #[arg(long, default_value_t = DISPLAY_SCALE, env = "XRAYDIFF_SCALE")]
    pub scale: f64,
}
