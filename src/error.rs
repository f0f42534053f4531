//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler can produce is one of these variants, and each variant maps to
//! exactly one HTTP status code and a `{ "success": false, "message": ... }` JSON body.
//!
//! `AppError` implements `actix_web::error::ResponseError` so handlers can simply return
//! `Result<_, AppError>`. `From` implementations for `sqlx::Error`,
//! `validator::ValidationErrors`, `jsonwebtoken::errors::Error`, `bcrypt::BcryptError`
//! and `tokio::task::JoinError` allow the `?` operator at every store, hasher and
//! token boundary.
//!
//! Server-side failures are logged with their cause and rendered with a fixed message,
//! so driver or library details never reach the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Message returned to clients for every 5xx response.
const INTERNAL_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input (HTTP 400).
    ValidationError(String),
    /// Failed login or password check (HTTP 400).
    /// The message never says which factor was wrong.
    InvalidCredentials(String),
    /// The email address is already taken (HTTP 400).
    Conflict(String),
    /// Missing, invalid or expired session token (HTTP 401).
    Unauthorized(String),
    /// The resource does not exist or is not owned by the caller (HTTP 404).
    NotFound(String),
    /// Hashing, signing or any other unexpected failure (HTTP 500).
    InternalServerError(String),
    /// Failure reported by the persistence backend (HTTP 500).
    DatabaseError(String),
}

impl AppError {
    /// The message that is safe to show to the client.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::ValidationError(msg)
            | AppError::InvalidCredentials(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg) => msg,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => INTERNAL_MESSAGE,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InvalidCredentials(msg) => write!(f, "Invalid Credentials: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidCredentials(_)
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "message": self.public_message()
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound` and a unique-index violation becomes `Conflict`
/// (the only unique index is on the user email). Everything else is a `DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("User already exists".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// Only the first field message is kept, which is what a form can show next to the input.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);
        let message = fields
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid input".to_string());
        AppError::ValidationError(message)
    }
}

/// Converts `jsonwebtoken::errors::Error` into `AppError::Unauthorized`.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("rejected session token: {}", error);
        AppError::Unauthorized("Invalid or expired token".into())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Password hashing failed: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> AppError {
        AppError::InternalServerError(format!("Blocking task failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use validator::Validate;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized("Invalid token".into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::ValidationError("Invalid input".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::InvalidCredentials("Invalid email or password".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::Conflict("User already exists".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Task not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::DatabaseError("connection reset".into());
        assert_eq!(error.error_response().status(), 500);
    }

    #[actix_rt::test]
    async fn test_internal_details_are_not_rendered() {
        let error = AppError::DatabaseError("pq: relation \"tasks\" does not exist".into());
        let body = to_bytes(error.error_response().into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["message"], INTERNAL_MESSAGE);
    }

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    #[test]
    fn test_validation_errors_keep_field_message() {
        let errors = Probe {
            email: "nope".into(),
        }
        .validate()
        .unwrap_err();

        match AppError::from(errors) {
            AppError::ValidationError(msg) => assert_eq!(msg, "Invalid email format"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
