//! Ошибки приложения и их отображение в HTTP-ответы.
//!
//! `ValidationError` - нарушение бизнес-правила записи, сообщение уходит
//! пользователю как есть. `AppError` добавляет к нему ошибки хранилища и
//! отсутствующие записи.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Нарушенное правило валидации. Каждый вариант несёт фиксированное сообщение.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Capacity must be greater than 0")]
    CapacityNotPositive,
    #[error("End Date must be after Start Date")]
    EndBeforeStart,
    #[error("Status must be Draft, Approved, or Rejected")]
    InvalidEventStatus,
    #[error("Please select a Venue")]
    VenueRequired,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Please enter a valid phone number")]
    InvalidPhone,
    #[error("Number of tickets must be greater than 0")]
    TicketsNotPositive,
    #[error("Phone number must be exactly 10 digits")]
    InvalidBookingPhone,
    #[error("Cannot book tickets for an event that is not approved")]
    EventNotApproved,
    #[error("Not enough capacity available for this event")]
    CapacityExceeded,
    #[error("Invalid status")]
    InvalidBookingStatus,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid query parameters: {0}")]
    InvalidQuery(#[from] validator::ValidationErrors),
    #[error("{}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
    #[error("{}", .0.body_text())]
    InvalidParams(#[from] QueryRejection),
    #[error("{}", .0.body_text())]
    InvalidPath(#[from] PathRejection),
    #[error("{0} not found")]
    NotFound(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Нарушение внешнего ключа при вставке означает, что связанная запись
    /// не существует.
    pub fn from_insert(err: sqlx::Error, referenced: impl FnOnce() -> String) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                AppError::NotFound(referenced())
            }
            _ => AppError::Database(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            // 417 - код, которым исходный фреймворк отдаёт пользовательские ошибки валидации
            AppError::Validation(_) => StatusCode::EXPECTATION_FAILED,
            AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidBody(rejection) => rejection.status(),
            AppError::InvalidParams(rejection) => rejection.status(),
            AppError::InvalidPath(rejection) => rejection.status(),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            AppError::Database(e) => tracing::error!("database error: {:?}", e),
            other => tracing::debug!("request rejected: {}", other),
        }

        (
            status,
            Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
