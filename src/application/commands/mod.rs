//! 应用层 - 命令
//!
//! 宿主下发的消息事件及其处理器

mod message_commands;

pub mod handlers;

pub use handlers::ImagineSettings;
pub use message_commands::*;
