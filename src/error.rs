use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Errors raised by a storage/auth backend.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    /// The human-readable message shown to the user
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// User-visible failures of the auth and runs screens.
///
/// Each variant renders as the exact message displayed on the page.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Auth(String),

    #[error("Login successful, but there was an error creating the runs table: {0}")]
    Provisioning(String),

    #[error("Failed to fetch runs: {0}")]
    Fetch(String),

    #[error("Failed to add run: {0}")]
    Insert(String),

    #[error("{0}")]
    UserNotFound(String),

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) | AppError::UserNotFound(_) => StatusCode::UNAUTHORIZED,
            AppError::Provisioning(_) | AppError::Fetch(_) | AppError::Insert(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
