//! # Auth Errors
//!
//! Failures while turning a bearer token into a [`super::Principal`].

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Request Errors
    // ==================
    /// No bearer token on the request
    #[error("Not authenticated")]
    AuthenticationRequired,

    // ==================
    // JWT Errors
    // ==================
    /// JWT token is malformed
    #[error("Invalid token")]
    MalformedToken,

    /// JWT token has expired
    #[error("Token expired")]
    TokenExpired,

    /// JWT signature is invalid
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Claimed account type is not one we know
    #[error("Unknown user type: {0}")]
    UnknownUserType(String),

    // ==================
    // Internal Errors
    // ==================
    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::AuthenticationRequired => 401,
            AuthError::MalformedToken => 401,
            AuthError::TokenExpired => 401,
            AuthError::InvalidSignature => 401,
            AuthError::UnknownUserType(_) => 401,

            AuthError::TokenGenerationFailed => 500,
        }
    }
}
