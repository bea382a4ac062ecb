//! Data Transfer Objects

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::application::{EventAction, HandleOutcome, MessageContext, MessageKind, Reply, ReplyContent, ReplyKind};

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Event DTOs
// ============================================================================

/// 宿主下发的消息事件
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default)]
    pub content: String,
    pub context: MessageContext,
}

#[derive(Debug, Serialize)]
pub struct ReplyDto {
    #[serde(rename = "type")]
    pub kind: ReplyKind,
    /// 文本，或 base64 编码的 JPEG
    pub content: String,
}

impl From<Reply> for ReplyDto {
    fn from(reply: Reply) -> Self {
        let content = match reply.content {
            ReplyContent::Text(text) => text,
            ReplyContent::Image(artifact) => STANDARD.encode(&artifact.bytes),
        };
        Self {
            kind: reply.kind,
            content,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub action: EventAction,
    pub reply: Option<ReplyDto>,
}

impl From<HandleOutcome> for EventResponse {
    fn from(outcome: HandleOutcome) -> Self {
        Self {
            action: outcome.action,
            reply: outcome.reply.map(ReplyDto::from),
        }
    }
}

// ============================================================================
// Help DTOs
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct HelpQuery {
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
pub struct HelpResponse {
    pub text: String,
}
