use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::config::ConfigError;
use crate::evaluation::router::error_response;
use crate::evaluation::{CatalogError, EvaluationError};
use crate::identity::IdentityError;
use crate::telemetry::TelemetryError;

/// Failures surfaced by the binaries while starting up, serving, or running CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("could not initialise tracing: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("question catalog rejected: {0}")]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("http server stopped: {0}")]
    Server(#[from] axum::Error),
}

impl From<IdentityError> for AppError {
    fn from(value: IdentityError) -> Self {
        Self::Evaluation(value.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Evaluation(err) => error_response(err),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal", "message": other.to_string() })),
            )
                .into_response(),
        }
    }
}
