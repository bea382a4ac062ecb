//! JPEG Image Processor - 结果图下载与压缩、用户图片编码
//!
//! 出图结果通常是数 MB 的 PNG，转发前统一重编码为低质量 JPEG 保存到临时目录，
//! 发送结束后删除

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::ports::{ImageArtifact, ImageError, ImageProcessorPort};
use crate::domain::generation::EncodedImage;

/// 图片处理配置
#[derive(Debug, Clone)]
pub struct JpegImageProcessorConfig {
    /// 压缩后文件的保存目录
    pub tmp_dir: PathBuf,
    /// JPEG 质量 (1-100)
    pub quality: u8,
    /// 下载超时（秒）
    pub timeout_secs: u64,
}

impl Default for JpegImageProcessorConfig {
    fn default() -> Self {
        Self {
            tmp_dir: PathBuf::from("tmp"),
            quality: 30,
            timeout_secs: 120,
        }
    }
}

pub struct JpegImageProcessor {
    client: Client,
    config: JpegImageProcessorConfig,
}

impl JpegImageProcessor {
    pub fn new(config: JpegImageProcessorConfig) -> Result<Self, ImageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ImageError::Download(e.to_string()))?;

        Ok(Self { client, config })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Download(format!("HTTP {} for {}", status, url)));
        }

        Ok(response
            .bytes()
            .await
            .map_err(|e| ImageError::Download(e.to_string()))?
            .to_vec())
    }
}

/// 文件名来自远端任务 ID，只接受字母、数字、`-` 与 `_`
fn validate_artifact_name(name: &str) -> Result<(), ImageError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ImageError::InvalidName(name.to_string()))
    }
}

/// 解码任意支持的格式并重编码为 JPEG
fn compress_to_jpeg(raw: &[u8], quality: u8) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(raw).map_err(|e| ImageError::Decode(e.to_string()))?;
    let rgb = decoded.to_rgb8();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[async_trait]
impl ImageProcessorPort for JpegImageProcessor {
    async fn download_and_compress(
        &self,
        url: &str,
        name: &str,
    ) -> Result<ImageArtifact, ImageError> {
        validate_artifact_name(name)?;
        let raw = self.download(url).await?;
        let original_size = raw.len();

        let quality = self.config.quality;
        let bytes = tokio::task::spawn_blocking(move || compress_to_jpeg(&raw, quality))
            .await
            .map_err(|e| ImageError::Encode(format!("Compression task failed: {}", e)))??;

        tokio::fs::create_dir_all(&self.config.tmp_dir)
            .await
            .map_err(|e| ImageError::Io(e.to_string()))?;
        let path = self.config.tmp_dir.join(format!("{}.jpg", name));
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| ImageError::Io(e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            original_size = original_size,
            compressed_size = bytes.len(),
            "Image compressed"
        );

        Ok(ImageArtifact { path, bytes })
    }

    async fn encode_file(&self, path: &Path) -> Result<EncodedImage, ImageError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ImageError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(EncodedImage::from_bytes(&bytes))
    }

    async fn release(&self, artifact: &ImageArtifact) {
        if let Err(e) = tokio::fs::remove_file(&artifact.path).await {
            tracing::warn!(path = %artifact.path.display(), error = %e, "Failed to remove image artifact");
        }
    }
}
