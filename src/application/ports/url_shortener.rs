//! URL Shortener Port - 短链接服务

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShortenerError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// URL Shortener Port
///
/// 未配置短链服务时实现应原样返回 url
#[async_trait]
pub trait UrlShortenerPort: Send + Sync {
    async fn shorten(&self, url: &str) -> Result<String, ShortenerError>;
}
