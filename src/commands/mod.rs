//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `models/`, `xrd/`, `utils/`
//! - 子模块: metrics, lattice, render, sweep, replay

pub mod lattice;
pub mod metrics;
pub mod render;
pub mod replay;
pub mod sweep;

use crate::cli::args::GridArgs;
use crate::cli::Commands;
use crate::error::Result;
use crate::models::{generate_sites, LatticeConstants, LatticeSite};
use crate::utils::parse;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Metrics(args) => metrics::execute(args),
        Commands::Lattice(args) => lattice::execute(args),
        Commands::Render(args) => render::execute(args),
        Commands::Sweep(args) => sweep::execute(args),
        Commands::Replay(args) => replay::execute(args),
    }
}

/// 显式位点列表优先，否则按网格生成
pub(crate) fn resolve_sites(grid: &GridArgs, constants: &LatticeConstants) -> Result<Vec<LatticeSite>> {
    match &grid.sites {
        Some(list) => parse::parse_sites(list),
        None => Ok(generate_sites(constants, grid.columns, grid.rows)),
    }
}
