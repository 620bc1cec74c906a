//! # 数据模型模块
//!
//! 定义晶格与模拟模型。
//!
//! ## 依赖关系
//! - 被 `xrd/` 和 `commands/` 使用
//! - 子模块: lattice, simulation

pub mod lattice;
pub mod simulation;

pub use lattice::{generate_sites, Lattice, LatticeConstants, LatticeSite};
pub use simulation::{SimulationDefaults, XrayModel};
