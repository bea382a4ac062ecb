//! 应用层错误定义
//!
//! 消息处理链路上的统一错误类型，最外层转换为 ERROR 回复

use thiserror::Error;

use crate::application::ports::{ImageError, SendError};
use crate::domain::command::CommandError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 指令格式错误
    #[error("{0}")]
    Command(#[from] CommandError),

    /// 图片处理错误
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// 消息发送错误
    #[error("Send error: {0}")]
    Send(#[from] SendError),
}
