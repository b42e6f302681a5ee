pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use middleware::AuthMiddleware;
pub use password::{equalize_timing, hash_password, verify_password};
pub use token::{AuthenticatedUser, TokenError, TokenKind, TokenService};

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Represents the payload for a new account registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account. Normalized to lowercase before
    /// any lookup or storage.
    #[validate(email)]
    pub email: String,
    /// Password for the new account. Presence is the only requirement; the
    /// stored form is always a salted bcrypt hash.
    #[validate(length(min = 1))]
    pub password: String,
    /// Optional display name.
    pub name: Option<String>,
}

/// Token block returned by a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Lowercase normalization applied to every email before lookup or
/// storage; uniqueness is enforced on this form.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
