//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 模板里的占位域名，未修改即视为未配置
const DOMAIN_PLACEHOLDER: &str = "你的域名";

/// 加载应用配置
///
/// # 环境变量示例
/// - `MJT_SERVER__PORT=8080`
/// - `MJT_MIDJOURNEY__DOMAIN_NAME=https://mj.example.com`
/// - `MJT_MIDJOURNEY__API_KEY=secret`
/// - `MJT_GPT__OPTIMIZED=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 前缀: MJT_，层级分隔符: __
    builder = builder.add_source(
        Environment::with_prefix("MJT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    // 缺省字段由 serde default 补齐
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

    if config.server.port == 0 {
        return invalid("Server port cannot be 0");
    }

    let mj = &config.midjourney;
    if mj.domain_name.trim().is_empty() || mj.domain_name.contains(DOMAIN_PLACEHOLDER) {
        return invalid("midjourney.domain_name is not configured");
    }
    if mj.poll_interval_secs == 0 {
        return invalid("midjourney.poll_interval_secs cannot be 0");
    }
    if mj.poll_timeout_secs < mj.poll_interval_secs {
        return invalid("midjourney.poll_timeout_secs must not be shorter than the poll interval");
    }

    let ins = &config.instructions;
    if ins.image_ins.is_empty() || ins.blend_ins.is_empty() || ins.change_ins.is_empty() {
        return invalid("instruction markers cannot be empty");
    }

    if !(1..=100).contains(&config.relay.image_quality) {
        return invalid("relay.image_quality must be between 1 and 100");
    }

    if config.gpt.optimized && config.gpt.api_key.is_empty() {
        return invalid("gpt.api_key is required when gpt.optimized is enabled");
    }

    if config.cache.sweep_interval_secs == 0 {
        return invalid("cache.sweep_interval_secs cannot be 0");
    }

    Ok(())
}

/// 密钥只显示首尾
fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => "<empty>".to_string(),
        n if n <= 8 => "****".to_string(),
        n => format!(
            "{}****{}",
            chars[..3].iter().collect::<String>(),
            chars[n - 3..].iter().collect::<String>()
        ),
    }
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    tracing::info!("Midjourney Domain: {}", config.midjourney.domain_name);
    tracing::info!("Midjourney API Key: {}", mask_secret(&config.midjourney.api_key));
    tracing::info!(
        "Polling: every {}s, timeout {}s",
        config.midjourney.poll_interval_secs,
        config.midjourney.poll_timeout_secs
    );
    tracing::info!("Blend Dimensions: {:?}", config.midjourney.blend_dimensions);
    tracing::info!(
        "Instructions: trigger={} image={} blend={} change={}",
        config.instructions.trigger_prefix,
        config.instructions.image_ins,
        config.instructions.blend_ins,
        config.instructions.change_ins
    );
    tracing::info!("Split URL: {}", config.relay.split_url);
    if !config.relay.short_url_api.is_empty() {
        tracing::info!("Short URL API: {}", config.relay.short_url_api);
    }
    tracing::info!("Temp Directory: {:?}", config.relay.tmp_dir);
    tracing::info!("GPT Optimized: {}", config.gpt.optimized);
    if config.gpt.optimized {
        tracing::info!("GPT Model: {} ({})", config.gpt.model, config.gpt.api_base);
        tracing::info!("GPT API Key: {}", mask_secret(&config.gpt.api_key));
    }
    tracing::info!(
        "Channel: {} -> {}",
        config.channel.channel_type,
        config.channel.callback_url
    );
    tracing::info!("Pending Expire: {}s", config.cache.expire_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
