//! Task Poller - 任务进度轮询
//!
//! 立即查询一次，之后按固定间隔查询，直到任务到达终态或超过总时长。
//! 等待可被 CancellationToken 打断。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{MidjourneyApiPort, VendorError};
use crate::domain::generation::GenerationTask;

/// 轮询配置
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// 查询间隔
    pub interval: Duration,
    /// 从第一次查询开始计算的总时长上限
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(300),
        }
    }
}

/// 任务轮询器
pub struct TaskPoller {
    api: Arc<dyn MidjourneyApiPort>,
    config: PollConfig,
}

impl TaskPoller {
    pub fn new(api: Arc<dyn MidjourneyApiPort>, config: PollConfig) -> Self {
        Self { api, config }
    }

    /// 等待任务结束
    ///
    /// 返回第一次出现的终态任务；查询失败、超时或被取消时返回对应错误
    pub async fn wait_for(
        &self,
        task_id: &str,
        cancel: &CancellationToken,
    ) -> Result<GenerationTask, VendorError> {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let task = tokio::select! {
                _ = cancel.cancelled() => return Err(Self::cancelled(task_id, attempts)),
                result = self.api.fetch_task(task_id) => result?,
            };

            tracing::debug!(
                task_id = %task_id,
                attempt = attempts,
                status = %task.status,
                fail_reason = ?task.fail_reason,
                "Polled task"
            );

            if task.is_terminal() {
                tracing::info!(
                    task_id = %task_id,
                    status = %task.status,
                    attempts = attempts,
                    elapsed_secs = started.elapsed().as_secs(),
                    "Task reached terminal state"
                );
                return Ok(task);
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(Self::cancelled(task_id, attempts)),
                _ = tokio::time::sleep(self.config.interval) => {}
            }

            if started.elapsed() >= self.config.timeout {
                tracing::warn!(
                    task_id = %task_id,
                    attempts = attempts,
                    timeout_secs = self.config.timeout.as_secs(),
                    "Task polling timed out"
                );
                return Err(VendorError::Timeout);
            }
        }
    }

    fn cancelled(task_id: &str, attempts: u32) -> VendorError {
        tracing::info!(task_id = %task_id, attempts = attempts, "Task polling cancelled");
        VendorError::Cancelled
    }
}
