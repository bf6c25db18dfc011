use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Shared handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors a handler can return. Every variant renders as `{"error": message}`;
/// the source of an internal error is logged and never sent to the client.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{message}")]
    Internal {
        message: &'static str,
        cause: Arc<anyhow::Error>,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wraps an infrastructure failure behind a fixed client-facing message.
    pub fn internal(message: &'static str, err: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message,
            cause: Arc::new(err.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

/// Plain confirmation payload, e.g. after a delete.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: &'static str,
}

impl MessageBody {
    pub fn new(message: &'static str) -> Json<Self> {
        Json(Self { message })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { message, cause } = &self {
            error!(error = %format!("{cause:#}"), "{message}");
        }
        let message = self.to_string();
        (
            self.status(),
            Json(ErrorBody {
                error: message.as_str(),
            }),
        )
            .into_response()
    }
}
