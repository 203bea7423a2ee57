/// History handler
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::error;
use tracing::info;

use super::AppState;
use crate::api::auth::caller_identity;
use crate::api::types::ApiError;
use crate::api::types::ApiResponse;
use crate::api::types::HistoryItem;
use crate::api::types::HistoryResponse;

/// Past exchanges of the calling user (GET /history)
pub async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<HistoryResponse>>, ApiError> {
    let username = caller_identity(&headers)?;
    info!("GET /history for {}", username);

    let entries = state.history.list_for_user(&username).await.map_err(|e| {
        error!("Failed to load history for {}: {}", username, e);
        ApiError::internal("Failed to load history")
    })?;

    Ok(Json(ApiResponse::success(HistoryResponse {
        history: entries.into_iter().map(HistoryItem::from).collect(),
    })))
}
