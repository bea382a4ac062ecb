//! Generation Flow - 提交 → 轮询 → 转发
//!
//! 出图、垫图、变换、合图共用的流程

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::poller::TaskPoller;
use super::relay::ResultRelay;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    MessageContext, MidjourneyApiPort, Reply, SubmitReceipt, VendorError,
};
use crate::domain::generation::{BlendDimensions, ChangeRequest, EncodedImage};

/// 待提交的任务
#[derive(Debug, Clone)]
pub enum Submission {
    Imagine {
        prompt: String,
        seed: Option<EncodedImage>,
    },
    Change(ChangeRequest),
    Blend {
        images: Vec<EncodedImage>,
        dimensions: BlendDimensions,
    },
}

impl Submission {
    fn kind(&self) -> &'static str {
        match self {
            Submission::Imagine { seed: None, .. } => "imagine",
            Submission::Imagine { seed: Some(_), .. } => "imagine_with_seed",
            Submission::Change(_) => "change",
            Submission::Blend { .. } => "blend",
        }
    }
}

/// 出图流程
pub struct GenerationFlow {
    api: Arc<dyn MidjourneyApiPort>,
    poller: TaskPoller,
    relay: ResultRelay,
}

impl GenerationFlow {
    pub fn new(api: Arc<dyn MidjourneyApiPort>, poller: TaskPoller, relay: ResultRelay) -> Self {
        Self { api, poller, relay }
    }

    /// 执行完整流程，返回最终文本回复
    ///
    /// 提交失败与轮询失败都转换为文本回复，只有图片处理与发送的硬错误向上传播
    pub async fn run(
        &self,
        submission: Submission,
        context: &MessageContext,
        cancel: &CancellationToken,
    ) -> Result<Reply, ApplicationError> {
        let kind = submission.kind();
        let receipt = match self.submit(submission).await {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::error!(
                    session_id = %context.session_id,
                    kind = kind,
                    error = ?e,
                    "Task submission failed"
                );
                return Ok(Reply::text(format!("任务提交失败，{}", e)));
            }
        };

        tracing::info!(
            session_id = %context.session_id,
            kind = kind,
            task_id = %receipt.task_id,
            description = %receipt.description,
            "Task submitted"
        );
        self.relay.notify_submitted(&receipt.task_id, context).await?;

        let task = match self.poller.wait_for(&receipt.task_id, cancel).await {
            Ok(task) => task,
            Err(e) => {
                tracing::error!(task_id = %receipt.task_id, error = ?e, "Task polling failed");
                return Ok(Reply::text(e.to_string()));
            }
        };

        self.relay.relay(&receipt.task_id, &task, context).await
    }

    async fn submit(&self, submission: Submission) -> Result<SubmitReceipt, VendorError> {
        match submission {
            Submission::Imagine { prompt, seed } => {
                self.api.submit_imagine(&prompt, seed.as_ref()).await
            }
            Submission::Change(request) => self.api.submit_change(&request).await,
            Submission::Blend { images, dimensions } => {
                self.api.submit_blend(&images, dimensions).await
            }
        }
    }
}
