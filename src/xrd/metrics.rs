//! # 衍射派生量计算
//!
//! 由入射角、晶格常数和波长计算面板显示的派生量：
//! - 入射角（度）
//! - 晶格常数 a, d
//! - 程差 2d·sin(θ)
//! - 程差与波长之比 2d·sin(θ)/λ
//!
//! 纯函数，无副作用；刷新显示由调用方负责（见 `xrd/panel.rs`）。
//!
//! ## 依赖关系
//! - 被 `models/simulation.rs`, `xrd/sweep.rs` 和 `commands/` 使用
//! - 使用 `models/lattice.rs` 的 LatticeConstants

use crate::error::{Result, XrayError};
use crate::models::LatticeConstants;

use std::fmt;

/// 程差/波长之比
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Computed(f64),
    /// 波长为 0 或结果非有限值
    NotComputable,
}

impl Ratio {
    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Computed(v) => Some(*v),
            Ratio::NotComputable => None,
        }
    }

    pub fn to_result(&self) -> Result<f64> {
        self.value().ok_or_else(|| XrayError::NotComputable {
            quantity: "2d sin(θ)/λ",
            reason: "wavelength is zero or the result is not finite".to_string(),
        })
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Computed(v) => write!(f, "{:.2}", v),
            Ratio::NotComputable => write!(f, "?"),
        }
    }
}

/// 面板显示的派生量（已按显示精度取整）
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    /// 入射角（度，1 位小数）
    pub incident_angle_deg: f64,
    /// 晶格常数 a = x
    pub lattice_a: f64,
    /// 晶面间距 d = z
    pub lattice_d: f64,
    pub wavelength: f64,
    /// 2d·sin(θ)，1 位小数
    pub path_diff: f64,
    /// 2d·sin(θ)/λ，2 位小数
    pub path_diff_over_lambda: Ratio,
}

/// 衍射派生量计算器
pub struct DiffractionMetrics;

impl DiffractionMetrics {
    /// 计算全部派生量
    pub fn compute(angle: f64, constants: &LatticeConstants, wavelength: f64) -> DerivedMetrics {
        let path_diff = Self::path_difference(angle, constants.z);

        DerivedMetrics {
            incident_angle_deg: round_to(angle.to_degrees(), 1),
            lattice_a: round_to(constants.x, 1),
            lattice_d: round_to(constants.z, 1),
            wavelength: round_to(wavelength, 1),
            path_diff: round_to(path_diff, 1),
            path_diff_over_lambda: match Self::ratio(angle, constants.z, wavelength) {
                Ratio::Computed(v) => Ratio::Computed(round_to(v, 2)),
                Ratio::NotComputable => Ratio::NotComputable,
            },
        }
    }

    /// 程差 2d·sin(θ)（未取整）
    pub fn path_difference(angle: f64, d: f64) -> f64 {
        2.0 * d * angle.sin()
    }

    /// 程差与波长之比（未取整）
    pub fn ratio(angle: f64, d: f64, wavelength: f64) -> Ratio {
        if wavelength == 0.0 {
            return Ratio::NotComputable;
        }
        let r = Self::path_difference(angle, d) / wavelength;
        if r.is_finite() {
            Ratio::Computed(r)
        } else {
            Ratio::NotComputable
        }
    }
}

/// 四舍五入到指定小数位（远离零方向）
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
