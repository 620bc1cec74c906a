//! # metrics 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/metrics.rs`

use super::args::SourceArgs;

use clap::Args;

/// metrics 子命令参数
#[derive(Args, Debug)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Interpret --angle as radians instead of degrees
    #[arg(long, default_value_t = false)]
    pub radians: bool,

    /// Also list the analytic Bragg angles θn = asin(nλ/2d)
    #[arg(long, default_value_t = false)]
    pub orders: bool,
}
