use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Startup vs Request Errors
///
/// - `ConfigError` is fatal and only ever surfaces before the listener binds
/// - `MissingKey` / `InvalidKey` are produced by the auth layer (401)
/// - `MalformedBody` is produced by the webhook handlers (400)
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No API key provided")]
    MissingKey,

    #[error("Invalid API key")]
    InvalidKey,

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),
}

/// Error response body for API endpoints.
///
/// Auth failures carry only `error`, matching what webhook senders expect.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::MissingKey | AppError::InvalidKey => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse {
                    error: self.to_string(),
                    message: None,
                },
            ),
            AppError::MalformedBody(e) => {
                tracing::warn!(error = %e, "Rejected webhook with malformed body");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Malformed request body".to_string(),
                        message: Some(sanitize_serde_error(e)),
                    },
                )
            }
            AppError::ConfigError(_) => {
                // Never reaches a client in practice, config is checked at startup
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Service configuration error".to_string(),
                        message: None,
                    },
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Sanitize serde error messages to avoid leaking parser internals.
fn sanitize_serde_error(e: &serde_json::Error) -> String {
    if e.is_eof() {
        if e.line() == 1 && e.column() == 0 {
            return "Request body is empty; expected a JSON document".to_string();
        }
        return "Unexpected end of JSON input".to_string();
    }

    if e.is_syntax() {
        return format!(
            "Invalid JSON at line {} column {}",
            e.line(),
            e.column()
        );
    }

    "Invalid request format".to_string()
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
