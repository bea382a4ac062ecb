//! Message Commands - 宿主下发的消息事件

use serde::{Deserialize, Serialize};

use crate::application::ports::{MessageContext, Reply};

/// 消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// 画图请求（宿主已去掉触发前缀）
    #[serde(alias = "image-create", alias = "IMAGE_CREATE")]
    ImageCreate,
    /// 用户发送了一张图片，content 为宿主保存的本地文件路径
    #[serde(alias = "IMAGE")]
    Image,
    /// 其他类型，本插件不处理
    #[serde(other)]
    Other,
}

/// 入站消息
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub kind: MessageKind,
    pub content: String,
    pub context: MessageContext,
}

/// 处理后宿主应采取的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// 已处理，跳过宿主默认逻辑
    BreakPass,
    /// 交回宿主继续处理
    Continue,
}

/// 消息处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleOutcome {
    pub action: EventAction,
    pub reply: Option<Reply>,
}

impl HandleOutcome {
    /// 已处理并回复
    pub fn handled(reply: Reply) -> Self {
        Self {
            action: EventAction::BreakPass,
            reply: Some(reply),
        }
    }

    /// 不属于本插件的消息
    pub fn ignored() -> Self {
        Self {
            action: EventAction::Continue,
            reply: None,
        }
    }

    /// 处理出错，带错误回复交回宿主
    pub fn failed(reply: Reply) -> Self {
        Self {
            action: EventAction::Continue,
            reply: Some(reply),
        }
    }
}
