//! Help Handler

use axum::extract::{Query, State};
use axum::Json;
use std::sync::Arc;

use crate::infrastructure::http::dto::{ApiResponse, HelpQuery, HelpResponse};
use crate::infrastructure::http::state::AppState;

pub async fn help(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HelpQuery>,
) -> Json<ApiResponse<HelpResponse>> {
    Json(ApiResponse::success(HelpResponse {
        text: state.dispatcher.help_text(query.verbose),
    }))
}
