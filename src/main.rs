//! MJ Turbo - Midjourney 聊天机器人插件
//!
//! 通过 HTTP 接收宿主消息事件，提交绘图任务并把结果推送回通道

use std::sync::Arc;
use std::time::Duration;

use mj_turbo::application::services::{
    GenerationFlow, PollConfig, RelayConfig, ResultRelay, TaskPoller,
};
use mj_turbo::application::{
    ImageArrivalHandler, ImagineCommandHandler, ImagineSettings, MessageDispatcher,
    PendingStorePort,
};
use mj_turbo::config::{load_config, print_config, AppConfig};
use mj_turbo::domain::command::CommandMarkers;
use mj_turbo::infrastructure::adapters::{
    ChannelType, HttpChannelSender, HttpChannelSenderConfig, HttpMidjourneyClient,
    HttpMidjourneyClientConfig, HttpUrlShortener, JpegImageProcessor, JpegImageProcessorConfig,
    OpenAiPromptOptimizer, OpenAiPromptOptimizerConfig,
};
use mj_turbo::infrastructure::http::{AppState, HttpServer, ServerConfig};
use mj_turbo::infrastructure::memory::InMemoryPendingStore;
use mj_turbo::infrastructure::worker::PendingSweeper;
use tokio_util::sync::CancellationToken;

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},mj_turbo={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("MJ Turbo - Midjourney 画图插件");
    print_config(&config);

    tokio::fs::create_dir_all(&config.relay.tmp_dir).await?;

    // 出站适配器
    let midjourney = Arc::new(HttpMidjourneyClient::new(
        HttpMidjourneyClientConfig::new(
            &config.midjourney.domain_name,
            &config.midjourney.api_key,
        )
        .with_timeout(config.midjourney.timeout_secs),
    )?);
    let sender = Arc::new(HttpChannelSender::new(HttpChannelSenderConfig {
        channel_type: ChannelType::parse(&config.channel.channel_type),
        callback_url: config.channel.callback_url.clone(),
        ..Default::default()
    })?);
    let shortener = Arc::new(HttpUrlShortener::new(&config.relay.short_url_api, 30)?);
    let images = Arc::new(JpegImageProcessor::new(JpegImageProcessorConfig {
        tmp_dir: config.relay.tmp_dir.clone(),
        quality: config.relay.image_quality,
        timeout_secs: config.midjourney.timeout_secs,
    })?);
    let optimizer = Arc::new(OpenAiPromptOptimizer::new(OpenAiPromptOptimizerConfig {
        api_base: config.gpt.api_base.clone(),
        api_key: config.gpt.api_key.clone(),
        model: config.gpt.model.clone(),
        ..Default::default()
    })?);

    // 会话状态
    let pending_store: Arc<dyn PendingStorePort> = Arc::new(InMemoryPendingStore::new(
        Duration::from_secs(config.cache.expire_secs),
    ));

    // 出图流程
    let poller = TaskPoller::new(
        midjourney.clone(),
        PollConfig {
            interval: config.midjourney.poll_interval(),
            timeout: config.midjourney.poll_timeout(),
        },
    );
    let relay = ResultRelay::new(
        sender,
        shortener,
        images.clone(),
        RelayConfig {
            split_url: config.relay.split_url,
            complete_prompt: config.relay.complete_prompt.clone(),
            change_ins: config.instructions.change_ins.clone(),
            send_max_retries: config.relay.send_max_retries,
            send_retry_delay: Duration::from_secs(config.relay.send_retry_delay_secs),
        },
    );
    let flow = Arc::new(GenerationFlow::new(midjourney, poller, relay));

    // 消息分发
    let markers = CommandMarkers {
        image_ins: config.instructions.image_ins.clone(),
        blend_ins: config.instructions.blend_ins.clone(),
        change_ins: config.instructions.change_ins.clone(),
        trigger: config.instructions.trigger_prefix.clone(),
    };
    let dispatcher = Arc::new(MessageDispatcher::new(
        ImagineCommandHandler::new(
            ImagineSettings {
                markers: markers.clone(),
                default_params: config.default_params.clone(),
                gpt_optimized: config.gpt.optimized,
            },
            pending_store.clone(),
            optimizer,
            flow.clone(),
        ),
        ImageArrivalHandler::new(
            pending_store.clone(),
            images,
            flow,
            config.midjourney.blend_dimensions,
        ),
        markers,
    ));

    let shutdown = CancellationToken::new();

    // 启动过期状态清理
    let sweeper = PendingSweeper::new(
        pending_store.clone(),
        Duration::from_secs(config.cache.sweep_interval_secs),
    );
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown.clone()));

    // 创建 HTTP 服务器
    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let state = AppState::new(dispatcher, pending_store, shutdown.clone());
    let server = HttpServer::new(server_config, state);

    tracing::info!("Starting HTTP server...");

    // 收到信号后先取消等待中的任务，再等待连接排空
    let signal_token = shutdown.clone();
    server
        .run_with_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
            signal_token.cancel();
        })
        .await?;

    shutdown.cancel();
    let _ = sweeper_handle.await;

    tracing::info!("Server shutdown complete");

    Ok(())
}
