//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（MidjourneyApi、ChannelSender、PendingStore 等）
//! - services: 轮询、结果转发、出图流程
//! - commands: 消息事件及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use commands::{
    handlers::{ImageArrivalHandler, ImagineCommandHandler, MessageDispatcher},
    EventAction, HandleOutcome, ImagineSettings, InboundMessage, MessageKind,
};

pub use error::ApplicationError;

pub use ports::{
    ChannelSenderPort, ImageArtifact, ImageError, ImageProcessorPort, MessageContext,
    MidjourneyApiPort, PendingStorePort, PromptError, PromptOptimizerPort, Reply, ReplyContent,
    ReplyKind, SendError, ShortenerError, SubmitReceipt, UrlShortenerPort, VendorError,
};

pub use services::{GenerationFlow, PollConfig, RelayConfig, ResultRelay, Submission, TaskPoller};
