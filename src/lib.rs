//! MJ Turbo - Midjourney 聊天机器人插件
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Generation Context: 远端任务快照、U/V 变换、合图参数
//! - Command: 画图指令解析
//! - Pending: 垫图/合图的多轮状态
//!
//! 应用层 (application/):
//! - Ports: 端口定义（MidjourneyApi, ChannelSender, PendingStore, ImageProcessor 等）
//! - Services: 轮询、结果转发、出图流程
//! - Commands: 消息事件分发与处理
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 宿主事件接口
//! - Memory: PendingStore 内存实现
//! - Worker: 过期状态清理
//! - Adapters: Midjourney / OpenAI / 短链 / 图片 / 通道客户端

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
