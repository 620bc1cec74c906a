//! # 解析器模块
//!
//! 提供回放脚本的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/replay.rs` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: script

pub mod script;

pub use script::{parse_script, parse_script_file, Command, Step};
