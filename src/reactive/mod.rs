//! # 响应式数据绑定模块
//!
//! 为模拟模型提供变更通知原语：
//! - `Observable<T>`: 带版本号的共享值，变更时按注册顺序通知订阅者
//! - `Subscription`: RAII 守卫，drop 时自动取消订阅
//! - `Dispatcher`: 批处理作用域，合并同一批次内的多次变更
//! - `Multilink`: 一个回调同时监听多个 Observable
//!
//! ## 不变量
//! 1. 值真正改变时版本号恰好加一；设置相同的值不触发通知
//! 2. 订阅者按注册顺序被通知
//! 3. 同一批次内无论多少个源发生变化，Multilink 回调只执行一次
//!
//! ## 依赖关系
//! - 被 `models/simulation.rs` 和 `commands/replay.rs` 使用
//! - 无外部 crate 依赖（单线程，`Rc<RefCell<..>>`）

pub mod multilink;
pub mod observable;

pub use multilink::{Dispatcher, Multilink};
pub use observable::{Observable, Subscription};
