//! # replay 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/replay.rs`

use super::args::GridArgs;

use clap::Args;
use std::path::PathBuf;

/// replay 子命令参数
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Script file with one change per line; reads stdin when omitted or "-"
    pub script: Option<PathBuf>,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Print the projection bounds each time the lattice constants change
    #[arg(long, default_value_t = false)]
    pub project: bool,
}
