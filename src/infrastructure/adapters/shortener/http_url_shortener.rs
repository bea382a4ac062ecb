//! HTTP URL Shortener - 短链接服务客户端
//!
//! POST {api} {"url": "..."} → {"key": "abc"}，短链为 `{api}{key}`

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{ShortenerError, UrlShortenerPort};

#[derive(Debug, Serialize)]
struct ShortenRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ShortenResponse {
    key: Option<String>,
}

/// 短链接客户端
///
/// api 为空时不发请求，原样返回
pub struct HttpUrlShortener {
    client: Client,
    api: String,
}

impl HttpUrlShortener {
    pub fn new(api: impl Into<String>, timeout_secs: u64) -> Result<Self, ShortenerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ShortenerError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            api: api.into(),
        })
    }
}

#[async_trait]
impl UrlShortenerPort for HttpUrlShortener {
    async fn shorten(&self, url: &str) -> Result<String, ShortenerError> {
        if self.api.is_empty() {
            return Ok(url.to_string());
        }

        let response = self
            .client
            .post(&self.api)
            .json(&ShortenRequest { url })
            .send()
            .await
            .map_err(|e| ShortenerError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShortenerError::InvalidResponse(format!("HTTP {}", status)));
        }

        let body: ShortenResponse = response
            .json()
            .await
            .map_err(|e| ShortenerError::InvalidResponse(e.to_string()))?;

        let key = body
            .key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ShortenerError::InvalidResponse("missing key".to_string()))?;

        tracing::debug!(url = %url, key = %key, "URL shortened");
        Ok(format!("{}{}", self.api, key))
    }
}
