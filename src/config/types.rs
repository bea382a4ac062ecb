//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::generation::{BlendDimensions, DefaultParams};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// Midjourney 代理服务配置
    #[serde(default)]
    pub midjourney: MidjourneyConfig,

    /// 子指令标记
    #[serde(default)]
    pub instructions: InstructionsConfig,

    /// 垫图/合图的默认参数
    #[serde(default)]
    pub default_params: DefaultParams,

    /// 结果转发配置
    #[serde(default)]
    pub relay: RelayConfig,

    /// 关键词扩写配置
    #[serde(default)]
    pub gpt: GptConfig,

    /// 宿主通道配置
    #[serde(default)]
    pub channel: ChannelConfig,

    /// 会话状态缓存配置
    #[serde(default)]
    pub cache: CacheConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Midjourney 代理服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct MidjourneyConfig {
    /// 代理服务地址
    #[serde(default)]
    pub domain_name: String,

    /// `mj-api-secret` 密钥
    #[serde(default)]
    pub api_key: String,

    /// 单次请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,

    /// 轮询间隔（秒）
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// 轮询总时长上限（秒）
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,

    /// 合图比例
    #[serde(default)]
    pub blend_dimensions: BlendDimensions,
}

fn default_request_timeout() -> u64 {
    120
}

fn default_poll_interval() -> u64 {
    30
}

fn default_poll_timeout() -> u64 {
    300 // 5 分钟
}

impl Default for MidjourneyConfig {
    fn default() -> Self {
        Self {
            domain_name: String::new(),
            api_key: String::new(),
            timeout_secs: default_request_timeout(),
            poll_interval_secs: default_poll_interval(),
            poll_timeout_secs: default_poll_timeout(),
            blend_dimensions: BlendDimensions::default(),
        }
    }
}

impl MidjourneyConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

/// 子指令标记
#[derive(Debug, Clone, Deserialize)]
pub struct InstructionsConfig {
    /// 垫图
    #[serde(default = "default_image_ins")]
    pub image_ins: String,

    /// 合图
    #[serde(default = "default_blend_ins")]
    pub blend_ins: String,

    /// U/V 变换
    #[serde(default = "default_change_ins")]
    pub change_ins: String,

    /// 宿主的画图触发前缀，仅用于帮助与用法提示
    #[serde(default = "default_trigger_prefix")]
    pub trigger_prefix: String,
}

fn default_image_ins() -> String {
    "/p".to_string()
}

fn default_blend_ins() -> String {
    "/b".to_string()
}

fn default_change_ins() -> String {
    "/c".to_string()
}

fn default_trigger_prefix() -> String {
    "画".to_string()
}

impl Default for InstructionsConfig {
    fn default() -> Self {
        Self {
            image_ins: default_image_ins(),
            blend_ins: default_blend_ins(),
            change_ins: default_change_ins(),
            trigger_prefix: default_trigger_prefix(),
        }
    }
}

/// 结果转发配置
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// 去掉图片地址中 host 之后的前两段路径
    #[serde(default)]
    pub split_url: bool,

    /// 短链接服务地址，为空时不生成短链
    #[serde(default)]
    pub short_url_api: String,

    /// 完成提示模板
    #[serde(default = "default_complete_prompt")]
    pub complete_prompt: String,

    /// 转发图片的 JPEG 质量
    #[serde(default = "default_image_quality")]
    pub image_quality: u8,

    /// 压缩图片的保存目录
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: PathBuf,

    /// 发送图片的最大尝试次数
    #[serde(default = "default_send_max_retries")]
    pub send_max_retries: u32,

    /// 重试间隔（秒）
    #[serde(default = "default_send_retry_delay")]
    pub send_retry_delay_secs: u64,
}

fn default_complete_prompt() -> String {
    "任务完成！".to_string()
}

fn default_image_quality() -> u8 {
    30
}

fn default_tmp_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_send_max_retries() -> u32 {
    3
}

fn default_send_retry_delay() -> u64 {
    2
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            split_url: false,
            short_url_api: String::new(),
            complete_prompt: default_complete_prompt(),
            image_quality: default_image_quality(),
            tmp_dir: default_tmp_dir(),
            send_max_retries: default_send_max_retries(),
            send_retry_delay_secs: default_send_retry_delay(),
        }
    }
}

/// 关键词扩写配置
#[derive(Debug, Clone, Deserialize)]
pub struct GptConfig {
    /// 普通出图前是否扩写关键词
    #[serde(default)]
    pub optimized: bool,

    #[serde(default = "default_gpt_api_base")]
    pub api_base: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_gpt_model")]
    pub model: String,
}

fn default_gpt_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_gpt_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for GptConfig {
    fn default() -> Self {
        Self {
            optimized: false,
            api_base: default_gpt_api_base(),
            api_key: String::new(),
            model: default_gpt_model(),
        }
    }
}

/// 宿主通道配置
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    /// wechat / wx / wxy / wechatmp / wechatmp_service / wechatcom_app
    #[serde(default = "default_channel_type")]
    pub channel_type: String,

    /// 宿主接收推送消息的地址
    #[serde(default = "default_callback_url")]
    pub callback_url: String,
}

fn default_channel_type() -> String {
    "wechat".to_string()
}

fn default_callback_url() -> String {
    "http://localhost:9899/api/send".to_string()
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel_type: default_channel_type(),
            callback_url: default_callback_url(),
        }
    }
}

/// 会话状态缓存配置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// 无活动多久后失效（秒）
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,

    /// 后台清理间隔（秒）
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_expire_secs() -> u64 {
    3600 // 1 小时
}

fn default_sweep_interval() -> u64 {
    600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            expire_secs: default_expire_secs(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
