//! The `error` module defines the error type shared by the `beacon` crate.
//!
//! Only caller mistakes and startup failures are errors. A subscriber whose
//! stream has gone away is not: the broker logs and skips it.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Message must be a string")]
    InvalidMessage,

    #[error("Unauthorized: No token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidMessage => StatusCode::BAD_REQUEST,
            Error::MissingToken | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::Token(_) | Error::Config(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
