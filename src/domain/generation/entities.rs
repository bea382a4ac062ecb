//! Generation Context - Entities
//!
//! 远端绘图任务的只读快照。任务只由 Midjourney 服务端修改，本系统只读取、转发一次后丢弃。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 任务状态
///
/// 服务端状态字符串的映射:
/// - `NOT_START` / `SUBMITTED` → Submitted
/// - `IN_PROGRESS` / `RUNNING` 以及未知值 → Running
/// - `SUCCESS` → Success
/// - `FAILURE` / `FAILED` → Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", from = "String")]
pub enum TaskStatus {
    #[default]
    Submitted,
    Running,
    Success,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Submitted => "SUBMITTED",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failed => "FAILED",
        }
    }
}

impl From<String> for TaskStatus {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "NOT_START" | "SUBMITTED" => TaskStatus::Submitted,
            "SUCCESS" => TaskStatus::Success,
            "FAILURE" | "FAILED" => TaskStatus::Failed,
            _ => TaskStatus::Running,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 绘图任务（fetch 接口返回）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTask {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub status: TaskStatus,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub fail_reason: Option<String>,

    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub submit_time: Option<DateTime<Utc>>,

    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub finish_time: Option<DateTime<Utc>>,
}

impl GenerationTask {
    /// 是否已到达终态
    ///
    /// failReason 非空、SUCCESS 或 FAILED 都视为终态，其余状态仍在进行中
    pub fn is_terminal(&self) -> bool {
        self.fail_reason.is_some() || matches!(self.status, TaskStatus::Success | TaskStatus::Failed)
    }

    /// 获取失败原因，没有失败时返回 None
    pub fn failure(&self) -> Option<String> {
        match (&self.fail_reason, self.status) {
            (Some(reason), _) => Some(reason.clone()),
            (None, TaskStatus::Failed) => Some("任务执行失败".to_string()),
            _ => None,
        }
    }

    /// 根据服务端时间戳计算耗时
    pub fn elapsed(&self) -> ElapsedMetrics {
        let secs_between = |from: Option<DateTime<Utc>>| -> Option<f64> {
            let finish = self.finish_time?;
            let from = from?;
            Some((finish - from).num_milliseconds() as f64 / 1000.0)
        };

        ElapsedMetrics {
            start_to_finish: secs_between(self.start_time),
            submit_to_finish: secs_between(self.submit_time),
        }
    }
}

/// 任务耗时（秒）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElapsedMetrics {
    /// 开始执行到完成
    pub start_to_finish: Option<f64>,
    /// 提交到完成
    pub submit_to_finish: Option<f64>,
}

impl ElapsedMetrics {
    /// 格式化为展示文本，缺失时显示 "未知"
    pub fn format(value: Option<f64>) -> String {
        match value {
            Some(secs) => format!("{:.2}", secs),
            None => "未知".to_string(),
        }
    }
}
