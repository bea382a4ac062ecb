//! Midjourney Adapter - 代理服务 HTTP 客户端实现

mod http_midjourney_client;

pub use http_midjourney_client::*;
