//! Client-facing error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medpredict_core::{Domain, Error};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Error returned by request handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid API Key")]
    Unauthorized,

    #[error("{} not available", unavailable_subject(.0))]
    Unavailable(Domain),

    #[error(transparent)]
    Internal(#[from] Error),
}

fn unavailable_subject(domain: &Domain) -> String {
    match domain {
        Domain::Common => format!("{} models", domain.display_name()),
        _ => format!("{} model", domain.display_name()),
    }
}

impl AppError {
    /// Label used for `medpredict_errors_total`
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::Unavailable(_) => "unavailable",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        metrics::counter!("medpredict_errors_total", "kind" => self.kind()).increment(1);

        match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": self.to_string() })),
            )
                .into_response(),
            AppError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": self.to_string() })),
            )
                .into_response(),
            AppError::Internal(err) => {
                let correlation_id = Uuid::new_v4();
                error!(correlation_id = %correlation_id, error = %err, "Prediction failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "detail": "Internal prediction error",
                        "correlation_id": correlation_id.to_string(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
