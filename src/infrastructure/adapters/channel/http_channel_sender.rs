//! HTTP Channel Sender - 通过宿主回调接口推送消息
//!
//! POST {callback_url}
//! ```json
//! {"channel_type": "wechat", "context": {...}, "reply": {"type": "image", "content": "<base64>", "file_name": "1.jpg"}}
//! ```

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{
    ChannelSenderPort, MessageContext, Reply, ReplyContent, ReplyKind, SendError,
};

/// 宿主通道类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// 个人微信（wechat / wx / wxy）
    Wechat,
    /// 公众号（wechatmp / wechatmp_service）
    #[serde(rename = "wechatmp")]
    WechatMp,
    /// 企业微信应用
    #[serde(rename = "wechatcom_app")]
    WechatComApp,
}

impl ChannelType {
    /// 未知类型回退为个人微信
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "wechatmp" | "wechatmp_service" => ChannelType::WechatMp,
            "wechatcom_app" => ChannelType::WechatComApp,
            "wechat" | "wx" | "wxy" => ChannelType::Wechat,
            other => {
                tracing::warn!(channel_type = %other, "Unknown channel type, falling back to wechat");
                ChannelType::Wechat
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct OutboundReply {
    #[serde(rename = "type")]
    kind: ReplyKind,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<String>,
}

impl From<&Reply> for OutboundReply {
    fn from(reply: &Reply) -> Self {
        match &reply.content {
            ReplyContent::Text(text) => Self {
                kind: reply.kind,
                content: text.clone(),
                file_name: None,
            },
            ReplyContent::Image(artifact) => Self {
                kind: reply.kind,
                content: STANDARD.encode(&artifact.bytes),
                file_name: artifact
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct OutboundMessage<'a> {
    channel_type: ChannelType,
    context: &'a MessageContext,
    reply: OutboundReply,
}

/// HTTP 通道发送器配置
#[derive(Debug, Clone)]
pub struct HttpChannelSenderConfig {
    pub channel_type: ChannelType,
    pub callback_url: String,
    pub timeout_secs: u64,
}

impl Default for HttpChannelSenderConfig {
    fn default() -> Self {
        Self {
            channel_type: ChannelType::Wechat,
            callback_url: "http://localhost:9899/api/send".to_string(),
            timeout_secs: 30,
        }
    }
}

pub struct HttpChannelSender {
    client: Client,
    config: HttpChannelSenderConfig,
}

impl HttpChannelSender {
    pub fn new(config: HttpChannelSenderConfig) -> Result<Self, SendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SendError::Rejected(e.to_string()))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl ChannelSenderPort for HttpChannelSender {
    async fn send(&self, reply: &Reply, context: &MessageContext) -> Result<(), SendError> {
        let message = OutboundMessage {
            channel_type: self.config.channel_type,
            context,
            reply: OutboundReply::from(reply),
        };

        let response = self
            .client
            .post(&self.config.callback_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| SendError::Transient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(SendError::Rejected(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        tracing::debug!(
            session_id = %context.session_id,
            kind = ?reply.kind,
            "Reply delivered to channel"
        );
        Ok(())
    }
}
