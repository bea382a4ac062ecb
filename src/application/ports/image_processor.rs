//! Image Processor Port - 图片下载、压缩与编码

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::generation::EncodedImage;

/// 图片处理错误
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Download failed: {0}")]
    Download(String),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid artifact name: {0}")]
    InvalidName(String),
}

/// 压缩后的图片文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArtifact {
    /// 本地文件路径
    pub path: PathBuf,
    /// 文件内容（JPEG）
    pub bytes: Vec<u8>,
}

/// Image Processor Port
#[async_trait]
pub trait ImageProcessorPort: Send + Sync {
    /// 下载图片并重新压缩为体积受限的 JPEG，文件名为 `{name}.jpg`
    ///
    /// name 只允许字母、数字、`-` 与 `_`
    async fn download_and_compress(&self, url: &str, name: &str)
        -> Result<ImageArtifact, ImageError>;

    /// 读取宿主保存的图片文件并编码为 data URL
    async fn encode_file(&self, path: &Path) -> Result<EncodedImage, ImageError>;

    /// 发送结束后释放压缩文件，失败只记录日志
    async fn release(&self, artifact: &ImageArtifact);
}
