//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod channel_sender;
mod image_processor;
mod midjourney_api;
mod pending_store;
mod prompt_optimizer;
mod url_shortener;

pub use channel_sender::{
    ChannelSenderPort, MessageContext, Reply, ReplyContent, ReplyKind, SendError,
};
pub use image_processor::{ImageArtifact, ImageError, ImageProcessorPort};
pub use midjourney_api::{MidjourneyApiPort, SubmitReceipt, VendorError};
pub use pending_store::PendingStorePort;
pub use prompt_optimizer::{PromptError, PromptOptimizerPort};
pub use url_shortener::{ShortenerError, UrlShortenerPort};
