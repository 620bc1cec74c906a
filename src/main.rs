//! # xraydiff - X 射线衍射晶格模拟工具
//!
//! 二维晶格上的 Bragg 定律模拟：由入射角、波长和晶格常数计算
//! 程差 2d sin(θ) 及其与波长之比，并把晶格投影为带尺寸标注的晶体视图。
//!
//! ## 子命令
//! - `metrics` - 面板派生量计算
//! - `lattice` - 晶格生成与屏幕投影
//! - `render`  - 晶体视图与参数面板绘图
//! - `sweep`   - 入射角扫描与 Bragg 级次
//! - `replay`  - 参数变更脚本回放（响应式模型）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (回放脚本解析)
//!   │     ├── models/    (晶格与模拟模型)
//!   │     ├── reactive/  (可观察值与多源绑定)
//!   │     ├── xrd/       (衍射计算、投影、绘图)
//!   │     └── batch/     (并行扫描)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod models;
mod parsers;
mod reactive;
mod utils;
mod xrd;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
