//! HTTP Midjourney Client - 调用 Midjourney 代理服务
//!
//! 实现 MidjourneyApiPort trait
//!
//! 代理服务 API（请求头 `mj-api-secret` 携带密钥）:
//! - POST {domain}/mj/submit/imagine        {"prompt": "...", "base64": "data:..."|null}
//! - GET  {domain}/mj/task/{id}/fetch
//! - POST {domain}/mj/submit/simple-change  {"content": "<id> U1"}
//! - POST {domain}/mj/submit/blend          {"base64Array": [...], "dimensions": "SQUARE", ...}
//!
//! 提交类接口返回 `{"code": 1, "description": "...", "result": "<task id>"}`，code != 1 为拒绝

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{MidjourneyApiPort, SubmitReceipt, VendorError};
use crate::domain::generation::{
    BlendDimensions, ChangeRequest, EncodedImage, GenerationTask, BLEND_MAX_IMAGES,
    BLEND_MIN_IMAGES,
};

const SECRET_HEADER: &str = "mj-api-secret";

#[derive(Debug, Serialize)]
struct ImagineRequest<'a> {
    prompt: &'a str,
    base64: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SimpleChangeRequest {
    content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlendRequest<'a> {
    base64_array: Vec<&'a str>,
    dimensions: BlendDimensions,
    notify_hook: &'a str,
    state: &'a str,
}

/// 提交类接口的响应
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    description: String,
    /// 任务 ID，不同版本的代理可能返回字符串或数字
    #[serde(default)]
    result: Option<serde_json::Value>,
}

impl SubmitResponse {
    fn into_receipt(self) -> Result<SubmitReceipt, VendorError> {
        if self.code != 1 {
            return Err(VendorError::Rejected(self.description));
        }
        let task_id = match self.result {
            Some(serde_json::Value::String(id)) if !id.is_empty() => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            other => {
                return Err(VendorError::Transport(format!(
                    "submit accepted without task id: {:?}",
                    other
                )))
            }
        };
        Ok(SubmitReceipt {
            task_id,
            description: self.description,
        })
    }
}

/// Midjourney 客户端配置
#[derive(Debug, Clone)]
pub struct HttpMidjourneyClientConfig {
    /// 代理服务地址，如 `https://mj.example.com`
    pub domain_name: String,
    pub api_key: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for HttpMidjourneyClientConfig {
    fn default() -> Self {
        Self {
            domain_name: "http://localhost:8080".to_string(),
            api_key: String::new(),
            timeout_secs: 120,
        }
    }
}

impl HttpMidjourneyClientConfig {
    pub fn new(domain_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            domain_name: domain_name.into(),
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP Midjourney 客户端
pub struct HttpMidjourneyClient {
    client: Client,
    config: HttpMidjourneyClientConfig,
}

impl HttpMidjourneyClient {
    pub fn new(config: HttpMidjourneyClientConfig) -> Result<Self, VendorError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VendorError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}",
            self.config.domain_name.trim_end_matches('/'),
            path
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(SECRET_HEADER, &self.config.api_key)
    }

    async fn submit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<SubmitReceipt, VendorError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "Sending Midjourney submit request");

        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(url = %url, status = %status, body = %error_text, "Midjourney submit failed");
            return Err(VendorError::Transport(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let submit: SubmitResponse = response
            .json()
            .await
            .map_err(|e| VendorError::Transport(format!("Invalid submit response: {}", e)))?;

        tracing::debug!(
            url = %url,
            code = submit.code,
            description = %submit.description,
            "Midjourney submit response"
        );

        submit.into_receipt()
    }
}

fn transport_error(e: reqwest::Error) -> VendorError {
    if e.is_timeout() {
        VendorError::Transport(format!("Midjourney request timed out: {}", e))
    } else if e.is_connect() {
        VendorError::Transport(format!("Cannot connect to Midjourney service: {}", e))
    } else {
        VendorError::Transport(e.to_string())
    }
}

#[async_trait]
impl MidjourneyApiPort for HttpMidjourneyClient {
    async fn submit_imagine(
        &self,
        prompt: &str,
        seed: Option<&EncodedImage>,
    ) -> Result<SubmitReceipt, VendorError> {
        let body = ImagineRequest {
            prompt,
            base64: seed.map(EncodedImage::as_str),
        };
        self.submit("/mj/submit/imagine", &body).await
    }

    async fn fetch_task(&self, task_id: &str) -> Result<GenerationTask, VendorError> {
        let url = self.url(&format!("/mj/task/{}/fetch", task_id));

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(task_id = %task_id, status = %status, body = %error_text, "Midjourney fetch failed");
            return Err(VendorError::Transport(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let task: Option<GenerationTask> = response
            .json()
            .await
            .map_err(|e| VendorError::Transport(format!("Invalid fetch response: {}", e)))?;

        let task = task.ok_or_else(|| VendorError::Rejected(format!("任务不存在：{}", task_id)))?;

        tracing::debug!(
            task_id = %task_id,
            status = %task.status,
            has_image = task.image_url.is_some(),
            fail_reason = ?task.fail_reason,
            "Midjourney task fetched"
        );

        Ok(task)
    }

    async fn submit_change(&self, request: &ChangeRequest) -> Result<SubmitReceipt, VendorError> {
        let body = SimpleChangeRequest {
            content: request.content(),
        };
        self.submit("/mj/submit/simple-change", &body).await
    }

    async fn submit_blend(
        &self,
        images: &[EncodedImage],
        dimensions: BlendDimensions,
    ) -> Result<SubmitReceipt, VendorError> {
        if !(BLEND_MIN_IMAGES..=BLEND_MAX_IMAGES).contains(&images.len()) {
            return Err(VendorError::InvalidRequest(format!(
                "合图数量仅限{}-{}张，当前{}张",
                BLEND_MIN_IMAGES,
                BLEND_MAX_IMAGES,
                images.len()
            )));
        }

        let body = BlendRequest {
            base64_array: images.iter().map(EncodedImage::as_str).collect(),
            dimensions,
            notify_hook: "",
            state: "",
        };
        self.submit("/mj/submit/blend", &body).await
    }
}
