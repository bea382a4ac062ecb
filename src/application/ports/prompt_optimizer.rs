//! Prompt Optimizer Port - 关键词扩写

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Empty completion")]
    EmptyCompletion,
}

/// Prompt Optimizer Port
///
/// 把用户的简短关键词扩写为更适合出图的英文描述
#[async_trait]
pub trait PromptOptimizerPort: Send + Sync {
    async fn optimize(&self, prompt: &str) -> Result<String, PromptError>;
}
