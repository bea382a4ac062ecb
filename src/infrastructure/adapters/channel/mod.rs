//! Channel Adapter - 宿主回调通道

mod http_channel_sender;

pub use http_channel_sender::{ChannelType, HttpChannelSender, HttpChannelSenderConfig};
