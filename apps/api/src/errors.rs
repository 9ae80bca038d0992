use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::compile::CompileError;

pub const PDF_FAILURE: &str = "Failed to generate PDF";
pub const SOURCE_FAILURE: &str = "Failed to generate resume";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested style is not configured on this deployment.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The engine rejected the document. `details` reaches the client.
    #[error("{message}")]
    Compilation {
        message: &'static str,
        details: String,
    },

    /// Anything else. Only `message` reaches the client; `source` is logged.
    #[error("{message}: {source:#}")]
    Internal {
        message: &'static str,
        source: anyhow::Error,
    },
}

impl AppError {
    pub fn internal(message: &'static str, source: impl Into<anyhow::Error>) -> Self {
        AppError::Internal {
            message,
            source: source.into(),
        }
    }
}

impl From<CompileError> for AppError {
    fn from(err: CompileError) -> Self {
        if !err.is_compilation_failure() {
            return AppError::internal(PDF_FAILURE, err);
        }
        let details = match err.log() {
            Some(log) => format!("{err}\nLog: {log}"),
            None => format!("{err}\nLog: (compiler log unavailable)"),
        };
        AppError::Compilation {
            message: PDF_FAILURE,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Unavailable(msg) => {
                tracing::warn!("Unavailable: {msg}");
                (StatusCode::SERVICE_UNAVAILABLE, json!({ "error": msg }))
            }
            AppError::Compilation { message, details } => {
                tracing::warn!("Compilation error: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message, "details": details }),
                )
            }
            AppError::Internal { message, source } => {
                tracing::error!("Internal error: {source:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_compile_failure_carries_log_as_details() {
        let err: AppError = CompileError::Failed {
            pass: 1,
            status: "exit status: 1".to_string(),
            log: Some("! Missing $ inserted.".to_string()),
        }
        .into();

        match err {
            AppError::Compilation { message, details } => {
                assert_eq!(message, PDF_FAILURE);
                assert!(details.contains("! Missing $ inserted."));
            }
            other => panic!("expected Compilation, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_log_is_noted_in_details() {
        let err: AppError = CompileError::TimedOut {
            timeout: Duration::from_secs(30),
            log: None,
        }
        .into();

        match err {
            AppError::Compilation { details, .. } => {
                assert!(details.contains("timed out"));
                assert!(details.contains("log unavailable"));
            }
            other => panic!("expected Compilation, got {other:?}"),
        }
    }

    #[test]
    fn test_infrastructure_failure_is_internal() {
        let err: AppError = CompileError::Io(std::io::Error::other("disk full")).into();
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[test]
    fn test_status_codes() {
        let validation = AppError::Validation("bad".to_string()).into_response();
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let internal = AppError::internal(PDF_FAILURE, anyhow::anyhow!("boom")).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let unavailable = AppError::Unavailable("not configured".to_string()).into_response();
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
