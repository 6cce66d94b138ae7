mod quizzes;
mod random;

pub use quizzes::quizzes_router;
pub use random::random_router;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Key under which the signed-in user's id is kept in the session. Quizzes
/// created without a signed-in user get author id 0.
pub const SESSION_USER_ID_KEY: &str = "user_id";

pub type ApiResponse<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    Database(sqlx::Error),
    Session(tower_sessions::session::Error),
    Internal(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "Object not found".to_owned())
            }
            AppError::Database(error) => {
                tracing::error!(%error, "database failure");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
            AppError::Session(error) => {
                tracing::error!(%error, "session failure");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
            AppError::Internal(error) => {
                tracing::error!(%error, "request failure");
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
        };
        (status, message).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        AppError::Database(error)
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(error: tower_sessions::session::Error) -> Self {
        AppError::Session(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal(error)
    }
}
