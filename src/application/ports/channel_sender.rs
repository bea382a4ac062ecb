//! Channel Sender Port - 宿主消息通道
//!
//! 宿主框架为每个通道提供发送器，`send(reply, context)` 向会话推送一条消息。
//! 出图过程中的“提交成功”提示与图片本身都经由该端口发送，最终的文本回复由事件处理结果返回。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::image_processor::ImageArtifact;

/// 发送错误
#[derive(Debug, Error)]
pub enum SendError {
    /// 可重试的传输错误（连接失败、超时、TLS）
    #[error("Transient send failure: {0}")]
    Transient(String),

    /// 宿主拒收，重试无意义
    #[error("Send rejected: {0}")]
    Rejected(String),
}

impl SendError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SendError::Transient(_))
    }
}

/// 回复类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyKind {
    Text,
    Info,
    Error,
    Image,
}

/// 回复内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyContent {
    Text(String),
    Image(ImageArtifact),
}

/// 回复消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub content: ReplyContent,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Text,
            content: ReplyContent::Text(content.into()),
        }
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Info,
            content: ReplyContent::Text(content.into()),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            kind: ReplyKind::Error,
            content: ReplyContent::Text(content.into()),
        }
    }

    pub fn image(artifact: ImageArtifact) -> Self {
        Self {
            kind: ReplyKind::Image,
            content: ReplyContent::Image(artifact),
        }
    }

    /// 文本内容，图片回复返回 None
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            ReplyContent::Text(text) => Some(text),
            ReplyContent::Image(_) => None,
        }
    }
}

/// 消息上下文，由宿主随事件下发，发送时原样带回
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContext {
    /// 会话 ID（私聊为用户，群聊为群内用户）
    pub session_id: String,

    /// 是否群聊
    #[serde(default)]
    pub is_group: bool,

    /// 群聊中发送者的昵称
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    /// 宿主侧的接收者标识
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
}

impl MessageContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }
}

/// Channel Sender Port
#[async_trait]
pub trait ChannelSenderPort: Send + Sync {
    async fn send(&self, reply: &Reply, context: &MessageContext) -> Result<(), SendError>;
}
