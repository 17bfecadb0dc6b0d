//! Error types for Shelfkeep server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::i18n::{Locale, Message, MessageCatalog};

/// Application error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    NotAuthorized = 3,
    DbFailure = 4,
    NotFound = 5,
    BadValue = 6,
    Conflict = 7,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(Message),

    #[error("Authorization failed: {0}")]
    Authorization(Message),

    #[error("Not found: {0}")]
    NotFound(Message),

    #[error("Validation error: {0}")]
    Validation(Message),

    #[error("Conflict: {0}")]
    Conflict(Message),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) => ErrorCode::NotAuthenticated,
            AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Conflict(_) => ErrorCode::Conflict,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    /// Message shown to the client. Server-side failures never leak details.
    pub fn public_message(&self) -> Message {
        match self {
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Database(_) => Message::new("error.database"),
            AppError::Internal(_) => Message::new("error.internal"),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let message = fields
            .into_iter()
            .find_map(|(field, errs)| {
                errs.first().map(|e| {
                    let key = if e.code.starts_with("error.") {
                        e.code.to_string()
                    } else {
                        "error.form.invalid".to_string()
                    };
                    Message::new(key).arg("field", field)
                })
            })
            .unwrap_or_else(|| Message::new("error.form.invalid").arg("field", "form"));

        AppError::Validation(message)
    }
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::Internal(format!("Password hashing failed: {}", e))
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

/// Carried in response extensions so the locale middleware can re-render
/// the body in the caller's language.
#[derive(Debug, Clone)]
pub struct ErrorMessage {
    pub code: ErrorCode,
    pub message: Message,
}

impl ErrorMessage {
    pub fn into_body(self, locale: Locale) -> ErrorResponse {
        ErrorResponse {
            code: self.code as u32,
            error: format!("{:?}", self.code),
            message: self.message.render(MessageCatalog::global(), locale),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            _ => {}
        }

        let status = self.status();
        let error = ErrorMessage {
            code: self.code(),
            message: self.public_message(),
        };

        let body = Json(error.clone().into_body(Locale::En));
        let mut response = (status, body).into_response();
        response.extensions_mut().insert(error);
        response
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
