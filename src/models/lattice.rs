//! # 晶格数据模型
//!
//! 二维原子阵列及其晶格常数。晶格常数是一个 Observable，
//! 每次整体替换；原子位点由晶格常数和网格形状生成。
//!
//! ## 位点排布
//! ```text
//!  列以 x = 0 为中心，间距 a (= x)
//!  行从 y = 0 向下排列，间距 d (= z)
//!
//!   o   o   o   o   o      y = 0
//!   o   o   o   o   o      y = -d
//!   o   o   o   o   o      y = -2d
//! ```
//!
//! ## 依赖关系
//! - 被 `models/simulation.rs`, `xrd/projector.rs` 和 `commands/` 使用
//! - 使用 `reactive/` 的 Observable

use crate::reactive::Observable;

use serde::Serialize;

/// 晶胞尺寸 (x, y, z)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatticeConstants {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl LatticeConstants {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for LatticeConstants {
    fn default() -> Self {
        Self::new(8.0, 0.0, 6.0)
    }
}

/// 原子位点 (x, y)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatticeSite {
    pub x: f64,
    pub y: f64,
}

impl LatticeSite {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// 根据晶格常数生成矩形网格位点
pub fn generate_sites(
    constants: &LatticeConstants,
    columns: usize,
    rows: usize,
) -> Vec<LatticeSite> {
    let offset = columns.saturating_sub(1) as f64 / 2.0;

    (0..rows)
        .flat_map(|j| {
            (0..columns).map(move |i| {
                LatticeSite::new(
                    (i as f64 - offset) * constants.x,
                    -(j as f64) * constants.z,
                )
            })
        })
        .collect()
}

/// 模拟中的晶格
#[derive(Debug, Clone)]
pub struct Lattice {
    /// 晶格常数
    pub constants: Observable<LatticeConstants>,
    columns: usize,
    rows: usize,
}

impl Lattice {
    pub fn new(constants: LatticeConstants, columns: usize, rows: usize) -> Self {
        Self {
            constants: Observable::new(constants),
            columns,
            rows,
        }
    }

    /// 当前晶格常数下的原子位点
    pub fn sites(&self) -> Vec<LatticeSite> {
        self.constants
            .with(|c| generate_sites(c, self.columns, self.rows))
    }
}
