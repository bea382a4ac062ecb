//! Result Relay - 出图结果转发
//!
//! 任务结束后:
//! - 失败: 回复失败原因
//! - 成功: 改写图片地址 → 生成短链 → 下载压缩 → 通过通道发送图片 → 回复完成提示

use std::sync::Arc;
use std::time::Duration;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    ChannelSenderPort, ImageProcessorPort, MessageContext, Reply, UrlShortenerPort,
};
use crate::domain::generation::{ElapsedMetrics, GenerationTask};

/// 转发配置
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// 是否去掉图片地址中 host 之后的前两段路径（反代场景）
    pub split_url: bool,
    /// 完成提示模板，支持 {id} {change_ins} {imgurl} {start_finish} {submit_finish}
    pub complete_prompt: String,
    /// 变换指令标记，用于完成提示
    pub change_ins: String,
    /// 发送图片的最大尝试次数
    pub send_max_retries: u32,
    /// 两次尝试之间的固定间隔
    pub send_retry_delay: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            split_url: false,
            complete_prompt: "任务完成！".to_string(),
            change_ins: "/c".to_string(),
            send_max_retries: 3,
            send_retry_delay: Duration::from_secs(2),
        }
    }
}

/// 去掉 `scheme://host/` 之后的前两段路径
///
/// `https://cdn.example.com/attachments/1/2/a.png` → `https://cdn.example.com/2/a.png`
pub fn rewrite_image_url(url: &str, split_url: bool) -> String {
    if !split_url {
        return url.to_string();
    }
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() <= 5 {
        return url.to_string();
    }
    parts[..3]
        .iter()
        .chain(parts[5..].iter())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

/// 完成提示模板变量
#[derive(Debug, Clone)]
pub struct CompletionVars<'a> {
    pub id: &'a str,
    pub change_ins: &'a str,
    pub image_url: &'a str,
    pub metrics: ElapsedMetrics,
}

/// 渲染完成提示
pub fn render_completion(template: &str, vars: &CompletionVars<'_>) -> String {
    template
        .replace("{id}", vars.id)
        .replace("{change_ins}", vars.change_ins)
        .replace("{imgurl}", vars.image_url)
        .replace(
            "{start_finish}",
            &ElapsedMetrics::format(vars.metrics.start_to_finish),
        )
        .replace(
            "{submit_finish}",
            &ElapsedMetrics::format(vars.metrics.submit_to_finish),
        )
}

/// 提交成功提示，群聊中 @ 发送者
pub fn submission_notice(task_id: &str, context: &MessageContext) -> String {
    let body = format!(
        "☑️您的绘图任务提交成功！\n🆔ID：{}\n⏳正在努力出图，请您耐心等待...",
        task_id
    );
    match (&context.nickname, context.is_group) {
        (Some(nickname), true) => format!("@{}\n{}", nickname, body),
        _ => body,
    }
}

/// 结果转发器
pub struct ResultRelay {
    sender: Arc<dyn ChannelSenderPort>,
    shortener: Arc<dyn UrlShortenerPort>,
    images: Arc<dyn ImageProcessorPort>,
    config: RelayConfig,
}

impl ResultRelay {
    pub fn new(
        sender: Arc<dyn ChannelSenderPort>,
        shortener: Arc<dyn UrlShortenerPort>,
        images: Arc<dyn ImageProcessorPort>,
        config: RelayConfig,
    ) -> Self {
        Self {
            sender,
            shortener,
            images,
            config,
        }
    }

    /// 推送“提交成功”提示
    pub async fn notify_submitted(
        &self,
        task_id: &str,
        context: &MessageContext,
    ) -> Result<(), ApplicationError> {
        let reply = Reply::text(submission_notice(task_id, context));
        self.send_with_retry(&reply, context).await
    }

    /// 转发终态任务，返回最终的文本回复
    pub async fn relay(
        &self,
        task_id: &str,
        task: &GenerationTask,
        context: &MessageContext,
    ) -> Result<Reply, ApplicationError> {
        if let Some(reason) = task.failure() {
            tracing::info!(task_id = %task_id, reason = %reason, "Task failed, relaying reason");
            return Ok(Reply::text(reason));
        }

        let Some(image_url) = task.image_url.as_deref() else {
            tracing::warn!(task_id = %task_id, "Task succeeded without image url");
            return Ok(Reply::text("任务已完成，但未返回图片地址"));
        };

        let image_url = rewrite_image_url(image_url, self.config.split_url);
        let short_url = match self.shortener.shorten(&image_url).await {
            Ok(short) => short,
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "Failed to shorten url, using original");
                image_url.clone()
            }
        };
        tracing::debug!(task_id = %task_id, image_url = %image_url, short_url = %short_url, "Resolved image url");

        let artifact = self.images.download_and_compress(&image_url, task_id).await?;
        tracing::debug!(
            task_id = %task_id,
            path = %artifact.path.display(),
            size = artifact.bytes.len(),
            "Image compressed"
        );
        let sent = self
            .send_with_retry(&Reply::image(artifact.clone()), context)
            .await;
        self.images.release(&artifact).await;
        sent?;

        let text = render_completion(
            &self.config.complete_prompt,
            &CompletionVars {
                id: task_id,
                change_ins: &self.config.change_ins,
                image_url: &short_url,
                metrics: task.elapsed(),
            },
        );
        Ok(Reply::text(text))
    }

    /// 发送消息，仅对可重试错误按固定间隔重试，用尽后记录日志并放弃
    async fn send_with_retry(
        &self,
        reply: &Reply,
        context: &MessageContext,
    ) -> Result<(), ApplicationError> {
        let max_retries = self.config.send_max_retries.max(1);

        for attempt in 1..=max_retries {
            match self.sender.send(reply, context).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() => {
                    tracing::error!(
                        session_id = %context.session_id,
                        error = %e,
                        attempt = attempt,
                        max_retries = max_retries,
                        "Failed to send message"
                    );
                    if attempt < max_retries {
                        tokio::time::sleep(self.config.send_retry_delay).await;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::error!(
            session_id = %context.session_id,
            max_retries = max_retries,
            "Giving up sending message"
        );
        Ok(())
    }
}
