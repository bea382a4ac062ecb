//! Imagine Command Handler - 处理画图请求

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::error::ApplicationError;
use crate::application::ports::{MessageContext, PendingStorePort, PromptOptimizerPort, Reply};
use crate::application::services::{GenerationFlow, Submission};
use crate::domain::command::{CommandMarkers, ImagineCommand};
use crate::domain::generation::DefaultParams;
use crate::domain::PendingCommand;

/// 画图请求相关配置
#[derive(Debug, Clone, Default)]
pub struct ImagineSettings {
    pub markers: CommandMarkers,
    pub default_params: DefaultParams,
    /// 普通出图前是否先扩写关键词
    pub gpt_optimized: bool,
}

/// ImagineCommand Handler
pub struct ImagineCommandHandler {
    settings: ImagineSettings,
    pending_store: Arc<dyn PendingStorePort>,
    optimizer: Arc<dyn PromptOptimizerPort>,
    flow: Arc<GenerationFlow>,
}

impl ImagineCommandHandler {
    pub fn new(
        settings: ImagineSettings,
        pending_store: Arc<dyn PendingStorePort>,
        optimizer: Arc<dyn PromptOptimizerPort>,
        flow: Arc<GenerationFlow>,
    ) -> Self {
        Self {
            settings,
            pending_store,
            optimizer,
            flow,
        }
    }

    pub async fn handle(
        &self,
        content: &str,
        context: &MessageContext,
        cancel: &CancellationToken,
    ) -> Result<Reply, ApplicationError> {
        let session_id = context.session_id.as_str();

        match self.settings.markers.parse(content)? {
            ImagineCommand::SeedImage { prompt } => {
                let prompt = self.settings.default_params.compose_prompt(&prompt);
                tracing::info!(session_id = %session_id, prompt = %prompt, "Awaiting seed image");
                self.pending_store
                    .set(session_id, PendingCommand::image_seed(prompt));
                Ok(Reply::info("请发送一张图片给我"))
            }
            ImagineCommand::Blend { count, prompt } => {
                let prompt = self.settings.default_params.compose_prompt(&prompt);
                tracing::info!(session_id = %session_id, count = count, "Awaiting blend images");
                self.pending_store
                    .set(session_id, PendingCommand::blend_seed(prompt, count));
                Ok(Reply::info(format!("请直接发送{}张图片给我", count)))
            }
            ImagineCommand::Change(request) => {
                tracing::info!(session_id = %session_id, change = %request, "Submitting change");
                self.flow
                    .run(Submission::Change(request), context, cancel)
                    .await
            }
            ImagineCommand::Generate { prompt, options } => {
                let prompt = format!("{}{}", self.expand(&prompt).await, options);
                tracing::debug!(session_id = %session_id, prompt = %prompt, "Generated prompt");
                self.flow
                    .run(Submission::Imagine { prompt, seed: None }, context, cancel)
                    .await
            }
        }
    }

    /// 扩写关键词，未开启或失败时使用原文
    async fn expand(&self, prompt: &str) -> String {
        if !self.settings.gpt_optimized {
            return prompt.to_string();
        }
        match self.optimizer.optimize(prompt).await {
            Ok(optimized) => {
                tracing::debug!(original = %prompt, optimized = %optimized, "Prompt optimized");
                optimized
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prompt optimization failed, using original prompt");
                prompt.to_string()
            }
        }
    }
}
