//! # 批量计算模块
//!
//! 提供统一的并行计算能力。
//!
//! ## 功能
//! - 并行执行纯计算任务
//! - 进度反馈
//!
//! ## 依赖关系
//! - 被 `xrd/sweep.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod runner;

pub use runner::BatchRunner;
