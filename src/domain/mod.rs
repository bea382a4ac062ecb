//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Generation Context: 绘图任务
//! - Command Context: 聊天指令

pub mod command;
pub mod generation;

// 多轮指令的会话状态
mod pending;

pub use pending::{BlendProgress, ImageOutcome, PendingCommand};
