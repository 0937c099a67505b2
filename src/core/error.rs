use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::ApiResponse;
use crate::tree::TreeError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Maps constraint violations to client errors, everything else to
    /// [`AppError::Database`].
    pub fn from_db(e: sqlx::Error, conflict_message: &str) -> AppError {
        if let sqlx::Error::Database(db_err) = &e {
            // unique_violation
            if db_err.code().as_deref() == Some("23505") {
                return AppError::Conflict(conflict_message.to_string());
            }
            // foreign_key_violation
            if db_err.code().as_deref() == Some("23503") {
                return AppError::BadRequest("Referenced record does not exist".to_string());
            }
        }
        tracing::error!("Database error: {:?}", e);
        AppError::Database(e)
    }
}

impl From<TreeError> for AppError {
    fn from(e: TreeError) -> Self {
        match e {
            TreeError::SelfParent(_) | TreeError::Cycle { .. } | TreeError::ParentNotFound(_) => {
                AppError::Validation(e.to_string())
            }
            TreeError::NotFound(_) => AppError::NotFound(e.to_string()),
            TreeError::HasChildren { .. } => AppError::Conflict(e.to_string()),
            TreeError::Store(inner) => AppError::Database(inner),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                    None,
                )
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Auth(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Forbidden(ref msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, msg.clone(), None),
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
