use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Two prizes registered under one code. Fatal at startup.
    #[error("Two prizes exist with the same code: '{0}'")]
    DuplicatePrize(String),

    #[error("Unknown {kind} strategy: '{name}'")]
    UnknownStrategy { kind: &'static str, name: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid match result: '{0}'")]
    InvalidResult(String),

    #[error("Prize slot out of range (1-3): {0}")]
    InvalidSlot(u8),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidResult(_) | AppError::InvalidSlot(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
