use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use once_cell::sync::OnceCell;

use crate::{
    models::ApiResponse,
    timesheet::{ApprovalError, EntryError, PeriodError, TimesheetStatus, Transition},
};

/// Whether 500 responses carry the underlying error text.
static EXPOSE_INTERNAL_ERRORS: OnceCell<bool> = OnceCell::new();

pub fn set_expose_internal_errors(expose: bool) {
    let _ = EXPOSE_INTERNAL_ERRORS.set(expose);
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Missing, deleted, or not visible to the caller. The three cases are
    /// reported identically so callers cannot probe for other users' data.
    #[error("{0} not found")]
    NotFoundOrForbidden(&'static str),

    #[error("Invalid period: {0}")]
    Period(#[from] PeriodError),

    #[error("Invalid entry: {0}")]
    Entry(#[from] EntryError),

    #[error("Invalid entry fields")]
    Fields(Vec<EntryError>),

    #[error("{0}")]
    Validation(String),

    #[error("Cannot {} a period that is {}", .transition.as_str(), .from)]
    InvalidTransition {
        from: TimesheetStatus,
        transition: Transition,
    },

    #[error("Period is {0} and can no longer be changed")]
    Locked(TimesheetStatus),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFoundOrForbidden(_) => StatusCode::NOT_FOUND,
            AppError::Period(_) | AppError::Entry(_) | AppError::Fields(_) | AppError::Validation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::InvalidTransition { .. } | AppError::Locked(_) | AppError::Conflict(_) => {
                StatusCode::CONFLICT
            }
            AppError::Internal(_) | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Detail lines for the envelope's `errors` array.
    fn details(&self) -> Vec<String> {
        match self {
            AppError::Period(e) => vec![e.to_string()],
            AppError::Entry(e) => vec![e.to_string()],
            AppError::Fields(errors) => errors.iter().map(|e| e.to_string()).collect(),
            AppError::Validation(msg) => vec![msg.clone()],
            _ => Vec::new(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Period(_) | AppError::Entry(_) | AppError::Fields(_) | AppError::Validation(_) => {
                "Validation failed".to_string()
            }
            AppError::Internal(_) | AppError::Database(_) => {
                tracing::error!(error = %self, "Unhandled error while serving request");
                if EXPOSE_INTERNAL_ERRORS.get().copied().unwrap_or(false) {
                    self.to_string()
                } else {
                    "Internal server error".to_string()
                }
            }
            other => other.to_string(),
        };

        let body = Json(ApiResponse::failure(message, self.details()));

        (status, body).into_response()
    }
}

impl From<ApprovalError> for AppError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::NotFoundOrForbidden => AppError::NotFoundOrForbidden("Period"),
            ApprovalError::InvalidTransition { from, transition } => {
                AppError::InvalidTransition { from, transition }
            }
            ApprovalError::Validation(msg) => AppError::Validation(msg),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
