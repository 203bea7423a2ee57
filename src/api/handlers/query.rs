/// Question answering handler
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::AppState;
use crate::api::auth::caller_identity;
use crate::api::types::ApiError;
use crate::api::types::ApiResponse;
use crate::api::types::QueryRequest;
use crate::api::types::QueryResponse;
use crate::errors::PipelineError;
use crate::models::NewHistoryEntry;

/// Answer a question and record the exchange (POST /query)
pub async fn query(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<QueryResponse>>, ApiError> {
    // Identity is checked before the body is parsed
    let username = caller_identity(&headers)?;
    let req = parse_query_request(&body)?;
    let question = req.question.trim();
    if question.is_empty() {
        return Err(ApiError::bad_request("Question must not be empty"));
    }

    info!("POST /query from {}: {}", username, question);

    let result = tokio::time::timeout(state.request_timeout, state.pipeline.answer(question))
        .await
        .map_err(|_| {
            warn!(
                "Query from {} exceeded {:?}",
                username, state.request_timeout
            );
            ApiError::new(StatusCode::GATEWAY_TIMEOUT, "Timed out answering the question")
        })?
        .map_err(|e| {
            error!("Query from {} failed ({}): {}", username, e.kind(), e);
            pipeline_error_response(&e)
        })?;

    let entry = NewHistoryEntry::from_answer(&username, question, &result);
    state.history.record(entry).await.map_err(|e| {
        error!("Failed to record history for {}: {}", username, e);
        ApiError::internal("Failed to record the exchange")
    })?;

    Ok(Json(ApiResponse::success(QueryResponse::from(result))))
}

fn parse_query_request(body: &[u8]) -> Result<QueryRequest, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))
}

fn pipeline_error_response(error: &PipelineError) -> ApiError {
    match error {
        PipelineError::Retrieval(_) => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "The knowledge base is unavailable, please retry later",
        ),
        PipelineError::Generation(_) => ApiError::new(
            StatusCode::BAD_GATEWAY,
            "The language model failed to produce an answer",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HelpdeskError;

    #[test]
    fn test_pipeline_error_status_mapping() {
        let retrieval =
            PipelineError::retrieval(HelpdeskError::EmbeddingError("down".to_string()));
        assert_eq!(
            pipeline_error_response(&retrieval).status,
            StatusCode::SERVICE_UNAVAILABLE
        );

        let generation = PipelineError::generation(HelpdeskError::LlmError("quota".to_string()));
        assert_eq!(
            pipeline_error_response(&generation).status,
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_parse_query_request() {
        let req = parse_query_request(br#"{"question": "VPN drops"}"#).unwrap();
        assert_eq!(req.question, "VPN drops");

        let err = parse_query_request(br#"{"q": "VPN drops"}"#).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(parse_query_request(b"not json").is_err());
    }
}
