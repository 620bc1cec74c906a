//! # lattice 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/lattice.rs`

use super::args::GridArgs;

use clap::Args;
use std::path::PathBuf;

/// lattice 子命令参数
#[derive(Args, Debug)]
pub struct LatticeArgs {
    /// Lattice constants "x,y,z" (a = x, d = z)
    #[arg(short, long, default_value = "8,0,6", env = "XRAYDIFF_LATTICE")]
    pub lattice: String,

    #[command(flatten)]
    pub grid: GridArgs,

    /// Write the projection (atoms and arrow endpoints) to a CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maximum number of atom rows to print
    #[arg(long, default_value_t = 20)]
    pub top_n: usize,
}
