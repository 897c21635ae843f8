use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Transport-level failures. These bypass the XML-RPC envelope and surface as HTTP status codes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("method not allowed: {message}")]
    MethodNotAllowed {
        code: &'static str,
        message: &'static str,
    },
    #[error("failed to read request body: {message}")]
    BodyRead { code: &'static str, message: String },
    #[error("internal error")]
    Internal { code: &'static str, message: String },
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl AppError {
    pub fn method_not_allowed() -> Self {
        Self::MethodNotAllowed {
            code: "method_not_allowed",
            message: "only POST is accepted",
        }
    }

    pub fn body_read(message: impl Into<String>) -> Self {
        Self::BodyRead {
            code: "body_read_failed",
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            code: "internal_error",
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::MethodNotAllowed { code, message } => {
                (StatusCode::METHOD_NOT_ALLOWED, code, message.to_string())
            }
            Self::BodyRead { code, message } => {
                tracing::error!(error = %message, "failed to read request body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "failed to read request body".to_string(),
                )
            }
            Self::Internal { code, message } => {
                tracing::error!(error = %message, "request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    code,
                    "internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                code: code.to_string(),
                message,
                details: json!({}),
            }),
        )
            .into_response()
    }
}
