//! Caller identity and shared-key checks
//!
//! Users are authenticated upstream; this service only trusts the
//! `X-User` header that layer sets.

use axum::body::Body;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::ApiError;

pub const USER_HEADER: &str = "X-User";
pub const API_KEY_HEADER: &str = "X-API-KEY";

#[derive(Clone)]
pub struct ApiKeyState {
    pub expected_key: String,
}

/// Backend API key authentication middleware
///
/// # Errors
/// Returns 401 when `X-API-KEY` is missing or does not match
pub async fn backend_api_key_middleware(
    State(state): State<ApiKeyState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request.headers().get(API_KEY_HEADER);
    match header.and_then(|h| h.to_str().ok()) {
        Some(k) if k == state.expected_key => Ok(next.run(request).await),
        _ => Err(ApiError::unauthorized("Unauthorized")),
    }
}

/// Username set by the upstream authentication layer
///
/// # Errors
/// Returns 401 when the header is absent or blank
pub fn caller_identity(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::unauthorized(format!("Missing {USER_HEADER} header")))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn test_caller_identity_present() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static(" alice "));
        assert_eq!(caller_identity(&headers).unwrap(), "alice");
    }

    #[test]
    fn test_caller_identity_missing_or_blank() {
        let err = caller_identity(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, HeaderValue::from_static("   "));
        assert!(caller_identity(&headers).is_err());
    }
}
