//! HTTP Routes
//!
//! API Endpoints:
//! - /api/ping      GET   健康检查
//! - /api/help      GET   帮助文本（?verbose=true 显示用法）
//! - /api/events    POST  宿主消息事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .fallback(handlers::not_found)
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .route("/help", get(handlers::help))
        .route("/events", post(handlers::handle_event))
}
