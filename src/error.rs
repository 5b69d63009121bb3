//! Error types for the working hours server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable numeric error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    NotAuthorized = 2,
    DbFailure = 3,
    BadValue = 5,
    InvalidTime = 6,
    InvalidDate = 7,
    InvalidRange = 8,
    MalformedSchedule = 9,
    OutsideWorkingHours = 10,
    Unavailable = 11,
    Busy = 12,
}

/// Domain errors of the working hours model, engine and draft store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid time '{0}' (use HH:MM)")]
    InvalidTimeFormat(String),

    #[error("Invalid date '{0}' (use YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Unknown timezone '{0}'")]
    InvalidTimezone(String),

    #[error("Malformed schedule: {0}")]
    MalformedSchedule(String),

    #[error("Working hours service unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("{field}: End must be after start")]
    InvalidRange { field: String },

    #[error("{date}: {reason}")]
    OutsideWorkingHours { date: String, reason: String },

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Working hours are still loading")]
    StillLoading,
}

impl ScheduleError {
    fn code(&self) -> ErrorCode {
        match self {
            ScheduleError::InvalidTimeFormat(_) => ErrorCode::InvalidTime,
            ScheduleError::InvalidDate(_) | ScheduleError::InvalidDateRange(_) => {
                ErrorCode::InvalidDate
            }
            ScheduleError::InvalidTimezone(_) => ErrorCode::BadValue,
            ScheduleError::MalformedSchedule(_) => ErrorCode::MalformedSchedule,
            ScheduleError::PersistenceUnavailable(_) => ErrorCode::Unavailable,
            ScheduleError::InvalidRange { .. } => ErrorCode::InvalidRange,
            ScheduleError::OutsideWorkingHours { .. } => ErrorCode::OutsideWorkingHours,
            ScheduleError::SaveInProgress | ScheduleError::StillLoading => ErrorCode::Busy,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ScheduleError::OutsideWorkingHours { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ScheduleError::PersistenceUnavailable(_) => StatusCode::BAD_GATEWAY,
            ScheduleError::SaveInProgress | ScheduleError::StillLoading => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                )
            }
            AppError::Schedule(e) => (e.status(), e.code(), e.to_string()),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
