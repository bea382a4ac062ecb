//! Event Handlers - 宿主消息事件入口

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

use crate::application::InboundMessage;
use crate::infrastructure::http::dto::{ApiResponse, EventRequest, EventResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 处理一条消息事件
///
/// 出图请求会一直等到任务结束（或服务关闭）才返回
pub async fn handle_event(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EventRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<EventResponse>>, ApiError> {
    let Json(req) = payload?;

    let message = InboundMessage {
        kind: req.kind,
        content: req.content,
        context: req.context,
    };

    let cancel = state.shutdown.child_token();
    let outcome = state.dispatcher.handle(message, &cancel).await;

    Ok(Json(ApiResponse::success(EventResponse::from(outcome))))
}

/// 未匹配的路由
pub async fn not_found() -> ApiError {
    ApiError::NotFound("route not found".to_string())
}
