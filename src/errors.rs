use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Failure of a single chain read. Handled per element by exclusion.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("RPC transport failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("ABI decode failed: {0}")]
    Decode(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("read unavailable: {0}")]
    Unavailable(String),

    #[error("RPC serves chain {actual}, expected {expected}")]
    ChainMismatch { expected: u64, actual: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<ReadError> for AppError {
    fn from(e: ReadError) -> Self {
        AppError::Internal(e.into())
    }
}
