//! # 参数面板
//!
//! 显示入射角、晶格常数、波长、2d·sin(θ) 和 2d·sin(θ)/λ 的五行文本。
//! `apply` 无条件地用最新的派生量覆盖所有文本行。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `xrd/plot.rs` 使用
//! - 使用 `xrd/metrics.rs` 的 DerivedMetrics

use crate::xrd::metrics::{DerivedMetrics, Ratio};

/// 面板初始占位文本
pub const PLACEHOLDER: &str = "?";

/// 面板文字表
#[derive(Debug, Clone)]
pub struct PanelStrings {
    pub incident_angle: &'static str,
    pub angle_unit: &'static str,
    pub wavelength: &'static str,
    pub wavelength_unit: &'static str,
    pub a_lattice_constant: &'static str,
    pub b_lattice_constant: &'static str,
    pub distance: &'static str,
}

impl Default for PanelStrings {
    fn default() -> Self {
        Self {
            incident_angle: "Incident angle θ",
            angle_unit: "°",
            wavelength: "λ",
            wavelength_unit: " Å",
            a_lattice_constant: "a",
            b_lattice_constant: "b",
            distance: "d",
        }
    }
}

/// 参数面板
#[derive(Debug, Clone)]
pub struct ParameterPanel {
    strings: PanelStrings,
    angle: String,
    lattice_constants: String,
    wavelength: String,
    path_diff: String,
    path_diff_over_lambda: String,
    refreshes: u64,
}

impl ParameterPanel {
    pub fn new(strings: PanelStrings) -> Self {
        Self {
            strings,
            angle: PLACEHOLDER.to_string(),
            lattice_constants: PLACEHOLDER.to_string(),
            wavelength: PLACEHOLDER.to_string(),
            path_diff: PLACEHOLDER.to_string(),
            path_diff_over_lambda: PLACEHOLDER.to_string(),
            refreshes: 0,
        }
    }

    /// 用派生量刷新全部文本
    pub fn apply(&mut self, m: &DerivedMetrics) {
        let s = &self.strings;

        self.angle = format!(
            "{} = {:.1}{}",
            s.incident_angle, m.incident_angle_deg, s.angle_unit
        );
        self.lattice_constants = format!(
            "{} = {:.1}{}   {} = {} = {:.1}{}",
            s.a_lattice_constant,
            m.lattice_a,
            s.wavelength_unit,
            s.b_lattice_constant,
            s.distance,
            m.lattice_d,
            s.wavelength_unit
        );
        self.wavelength = format!("{} = {:.1}{}", s.wavelength, m.wavelength, s.wavelength_unit);
        self.path_diff = format!("2d sin(θ) = {:.1}{}", m.path_diff, s.wavelength_unit);
        self.path_diff_over_lambda = match m.path_diff_over_lambda {
            Ratio::Computed(v) => format!("2d sin(θ)/λ = {:.2}", v),
            Ratio::NotComputable => format!("2d sin(θ)/λ = {}", PLACEHOLDER),
        };

        self.refreshes += 1;
    }

    /// 按显示顺序返回五行文本
    pub fn lines(&self) -> [&str; 5] {
        [
            self.angle.as_str(),
            self.lattice_constants.as_str(),
            self.wavelength.as_str(),
            self.path_diff.as_str(),
            self.path_diff_over_lambda.as_str(),
        ]
    }

    /// 累计刷新次数
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl Default for ParameterPanel {
    fn default() -> Self {
        Self::new(PanelStrings::default())
    }
}
