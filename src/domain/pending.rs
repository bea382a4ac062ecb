//! 多轮指令的中间状态
//!
//! 垫图与合图需要用户在后续消息中补发图片，期间的参数按会话缓存。
//! 每个会话同一时刻至多一个中间状态。

use crate::domain::generation::EncodedImage;

/// 会话中的待完成指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCommand {
    /// 等待一张参考图
    ImageSeed { prompt: String },
    /// 等待 remaining 张合图图片，已收到的按到达顺序保存在 images 中
    BlendSeed {
        prompt: String,
        remaining: usize,
        images: Vec<EncodedImage>,
    },
}

/// 合图收图进度
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlendProgress {
    /// 还需要更多图片
    Waiting { received: usize, remaining: usize },
    /// 已收齐，可以提交
    Complete(Vec<EncodedImage>),
}

/// 待完成指令收到一张图片后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// 垫图的参考图已到
    SeedReady { prompt: String, image: EncodedImage },
    Blend(BlendProgress),
}

impl ImageOutcome {
    /// 指令已可提交，状态应随之移除
    pub fn is_final(&self) -> bool {
        !matches!(self, ImageOutcome::Blend(BlendProgress::Waiting { .. }))
    }
}

impl PendingCommand {
    pub fn image_seed(prompt: impl Into<String>) -> Self {
        Self::ImageSeed {
            prompt: prompt.into(),
        }
    }

    pub fn blend_seed(prompt: impl Into<String>, count: usize) -> Self {
        Self::BlendSeed {
            prompt: prompt.into(),
            remaining: count,
            images: Vec::with_capacity(count),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::ImageSeed { .. } => "image_seed",
            Self::BlendSeed { .. } => "blend_seed",
        }
    }

    /// 收到一张图片，垫图直接就绪，合图累加
    pub fn accept_image(&mut self, image: EncodedImage) -> ImageOutcome {
        match self {
            Self::ImageSeed { prompt } => ImageOutcome::SeedReady {
                prompt: prompt.clone(),
                image,
            },
            Self::BlendSeed {
                remaining, images, ..
            } => {
                images.push(image);
                *remaining = remaining.saturating_sub(1);

                if *remaining == 0 {
                    ImageOutcome::Blend(BlendProgress::Complete(std::mem::take(images)))
                } else {
                    ImageOutcome::Blend(BlendProgress::Waiting {
                        received: images.len(),
                        remaining: *remaining,
                    })
                }
            }
        }
    }
}
