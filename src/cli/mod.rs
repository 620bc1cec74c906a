//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `metrics`: 计算面板派生量
//! - `lattice`: 生成晶格并投影到屏幕坐标
//! - `render`: 绘制晶体视图与参数面板
//! - `sweep`: 入射角扫描与 Bragg 级次
//! - `replay`: 回放参数变更脚本，驱动响应式模型
//!
//! ## 配置
//! 物理输入都有默认值，并可由环境变量覆盖
//! (`XRAYDIFF_ANGLE`, `XRAYDIFF_WAVELENGTH`, `XRAYDIFF_LATTICE`, `XRAYDIFF_SCALE`)。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: args, metrics, lattice, render, sweep, replay

pub mod args;
pub mod lattice;
pub mod metrics;
pub mod render;
pub mod replay;
pub mod sweep;

use clap::{Parser, Subcommand};

/// xraydiff - X 射线衍射 (Bragg 定律) 晶格模拟工具
#[derive(Parser)]
#[command(name = "xraydiff")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "X-ray diffraction (Bragg's law) lattice simulation toolkit", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Compute incident angle, path difference 2d sin(θ) and 2d sin(θ)/λ
    Metrics(metrics::MetricsArgs),

    /// Generate a lattice and project it to screen coordinates
    Lattice(lattice::LatticeArgs),

    /// Render the crystal view and parameter panel (PNG/SVG)
    Render(render::RenderArgs),

    /// Sweep the incident angle and locate Bragg reflections
    Sweep(sweep::SweepArgs),

    /// Replay a script of parameter changes through the reactive model
    Replay(replay::ReplayArgs),
}
