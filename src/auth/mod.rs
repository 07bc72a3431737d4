pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::models::user::UserResponse;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenManager, TokenPair, TokenType};

/// Lowercases and trims an email, then checks the normalized form. All
/// storage and comparison go through this, so uniqueness is case-insensitive.
pub fn normalize_email(email: &str) -> Result<String, AppError> {
    let normalized = email.trim().to_lowercase();
    if !validator::validate_email(&normalized) {
        return Err(AppError::ValidationError("Invalid email format".into()));
    }
    Ok(normalized)
}

/// Payload for a login request. The email is normalized in the handler.
/// Only non-emptiness is checked here: the password policy applies when a
/// password is set, not when one is tried, so any wrong password gets the
/// same 401 regardless of its length.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Payload for a new registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    pub email: String,
    /// Must be at least 6 characters.
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    pub token: String,
    #[validate(length(min = 6))]
    pub new_password: String,
}

/// Successful login/refresh response: the token pair plus the public user.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub user: UserResponse,
}
