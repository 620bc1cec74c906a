//! # X 射线衍射模块
//!
//! Bragg 衍射模拟的计算与输出。
//!
//! ## 子模块
//! - `metrics`: 派生量计算（入射角、程差、程差/波长）
//! - `projector`: 晶格位点到屏幕坐标的投影与尺寸标注
//! - `panel`: 参数面板文本
//! - `sweep`: 入射角扫描与 Bragg 级次
//! - `plot`: 图像生成
//! - `export`: 数据导出
//!
//! ## 依赖关系
//! - 被 `models/simulation.rs` 和 `commands/` 使用
//! - 使用 `models/lattice.rs`

pub mod export;
pub mod metrics;
pub mod panel;
pub mod plot;
pub mod projector;
pub mod sweep;

pub use metrics::{DerivedMetrics, DiffractionMetrics, Ratio};
pub use panel::ParameterPanel;
pub use projector::{LatticeProjector, Projection};
