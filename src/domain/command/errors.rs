//! Command Context - Errors

use thiserror::Error;

/// 指令格式错误，Display 即回复给用户的用法提示
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("指令不正确，请根据示例格式重新输入：{trigger} {marker} 2\n合图数量仅限2-5张")]
    InvalidBlendCount { trigger: String, marker: String },

    #[error("格式不正确。请使用如下示例格式：\n{trigger} {marker} 8528881058085979 V1")]
    InvalidChangeFormat { trigger: String, marker: String },
}
