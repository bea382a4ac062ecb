//! Midjourney API Port - 绘图服务抽象
//!
//! 定义对 Midjourney 代理服务的四个调用，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::generation::{BlendDimensions, ChangeRequest, EncodedImage, GenerationTask};

/// 绘图服务错误
///
/// Display 即回复给用户的文本，细节只写日志
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VendorError {
    /// 服务端返回 code != 1，内容为 description 原文
    #[error("{0}")]
    Rejected(String),

    /// 网络错误、非 2xx 或无法解析的响应
    #[error("哦豁，出现了未知错误，请联系管理员~~~")]
    Transport(String),

    /// 轮询超时
    #[error("请求超时，请稍后再试~~~")]
    Timeout,

    /// 等待被取消（服务关闭或请求中断）
    #[error("任务等待已取消")]
    Cancelled,

    /// 请求参数不合法，未发出网络请求
    #[error("{0}")]
    InvalidRequest(String),
}

/// 提交成功的回执
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    /// 新任务 ID
    pub task_id: String,
    /// 服务端描述（如 "提交成功"、"排队中"）
    pub description: String,
}

/// Midjourney API Port
#[async_trait]
pub trait MidjourneyApiPort: Send + Sync {
    /// 提交出图任务，seed 为垫图
    async fn submit_imagine(
        &self,
        prompt: &str,
        seed: Option<&EncodedImage>,
    ) -> Result<SubmitReceipt, VendorError>;

    /// 查询任务进度
    async fn fetch_task(&self, task_id: &str) -> Result<GenerationTask, VendorError>;

    /// 提交 U/V 变换任务
    async fn submit_change(&self, request: &ChangeRequest) -> Result<SubmitReceipt, VendorError>;

    /// 提交合图任务
    async fn submit_blend(
        &self,
        images: &[EncodedImage],
        dimensions: BlendDimensions,
    ) -> Result<SubmitReceipt, VendorError>;
}
