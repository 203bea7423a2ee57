//! API request and response types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::models::HistoryEntry;
use crate::rag::AnswerResult;

/// Standard API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Error response: a status code plus the error envelope
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.message))).into_response()
    }
}

/// Root status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Question request
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

/// Answer response
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    pub latency_ms: f64,
    pub num_chunks: usize,
    pub average_distance: Option<f32>,
}

impl From<AnswerResult> for QueryResponse {
    fn from(result: AnswerResult) -> Self {
        Self {
            latency_ms: result.latency_ms(),
            num_chunks: result.num_chunks_retrieved,
            average_distance: result.average_retrieval_distance,
            answer: result.answer_text,
        }
    }
}

/// One past exchange
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryItem {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
    pub latency_ms: f64,
    pub num_chunks: i32,
    pub cluster: Option<i32>,
}

impl From<HistoryEntry> for HistoryItem {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            question: entry.question,
            answer: entry.answer,
            timestamp: entry.created_at,
            latency_ms: entry.latency_ms,
            num_chunks: entry.num_chunks,
            cluster: entry.cluster,
        }
    }
}

/// History listing response
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<HistoryItem>,
}
