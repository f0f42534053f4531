pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::PublicUser;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};

/// Payload for `POST /api/register`.
///
/// Fields are optional at the serde level so a missing field becomes a validation
/// error with a readable message instead of a deserialization failure.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: Option<String>,
}

/// Payload for `POST /api/login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Payload for `PUT /api/profile`. A non-empty `password` replaces the current one.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: Option<String>,
}

/// Payload for `PUT /api/password`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub current_password: Option<String>,
    #[validate(length(
        min = 8,
        message = "New password must be at least 8 characters long"
    ))]
    pub new_password: Option<String>,
}

/// Response after a successful registration or login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    /// Signed session token, valid for 24 hours.
    pub token: String,
    pub user: PublicUser,
}

/// Returns the field when it was sent and is not blank.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}

/// Like [`present`] but for secrets: whitespace is a legitimate password character,
/// so only an empty string counts as missing.
pub(crate) fn supplied(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}
