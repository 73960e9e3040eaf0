//! API key check for prediction routes

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::warn;

/// Header carrying the client's key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Compare keys in constant time
pub fn keys_match(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Middleware rejecting requests without the configured key
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if !keys_match(provided, &state.config.api_key) {
        warn!(path = %request.uri().path(), "Rejected request with invalid API key");
        return AppError::Unauthorized.into_response();
    }

    next.run(request).await
}
