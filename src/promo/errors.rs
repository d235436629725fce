//! # Promotion Errors
//!
//! Everything except `Store` and `Internal` is a caller-input problem and
//! is surfaced directly, never retried.

use thiserror::Error;

use super::model::PromotionStatus;
use crate::store::StoreError;

/// Result type for promotion operations
pub type PromoResult<T> = Result<T, PromoError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoError {
    // ==================
    // Caller Errors
    // ==================
    /// Principal does not own the resource it is acting on
    #[error("Not authorized")]
    Forbidden,

    /// Referenced post or promo code is absent
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Code is malformed, tampered with, or does not match its record
    #[error("Invalid promo code")]
    InvalidCode,

    /// Code was minted for another restaurant
    #[error("Invalid promo code for this restaurant")]
    RestaurantMismatch,

    /// Code is past its expiry date
    #[error("Promo code expired")]
    Expired,

    /// Post is not in a state that allows the requested transition
    #[error("Promotion is {0}, only Pending requests can be decided")]
    InvalidTransition(PromotionStatus),

    /// Request body failed validation
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // ==================
    // Infrastructure Errors
    // ==================
    /// Document store failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Code could not be minted
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PromoError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PromoError::InvalidCode => 400,
            PromoError::RestaurantMismatch => 400,
            PromoError::Expired => 400,
            PromoError::InvalidRequest(_) => 400,

            PromoError::Forbidden => 403,

            PromoError::NotFound(_) => 404,

            PromoError::InvalidTransition(_) => 409,

            PromoError::Internal(_) => 500,

            PromoError::Store(e) if e.is_retryable() => 503,
            PromoError::Store(StoreError::DuplicateKey { .. }) => 409,
            PromoError::Store(_) => 500,
        }
    }

    /// Returns whether this is a caller-side failure
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }

    /// Short machine-readable label used in logs
    pub fn reason(&self) -> &'static str {
        match self {
            PromoError::Forbidden => "forbidden",
            PromoError::NotFound(_) => "not_found",
            PromoError::InvalidCode => "invalid_code",
            PromoError::RestaurantMismatch => "restaurant_mismatch",
            PromoError::Expired => "expired",
            PromoError::InvalidTransition(_) => "invalid_transition",
            PromoError::InvalidRequest(_) => "invalid_request",
            PromoError::Store(_) => "store_failure",
            PromoError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(PromoError::Forbidden.status_code(), 403);
        assert_eq!(PromoError::NotFound("Post").status_code(), 404);
        assert_eq!(PromoError::InvalidCode.status_code(), 400);
        assert_eq!(PromoError::RestaurantMismatch.status_code(), 400);
        assert_eq!(PromoError::Expired.status_code(), 400);
        assert_eq!(
            PromoError::InvalidTransition(PromotionStatus::Approved).status_code(),
            409
        );
        assert_eq!(
            PromoError::Store(StoreError::Unavailable("down".to_string())).status_code(),
            503
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(PromoError::Expired.is_client_error());
        assert!(!PromoError::Internal("x".to_string()).is_client_error());
    }

    #[test]
    fn test_messages() {
        assert_eq!(PromoError::NotFound("Post").to_string(), "Post not found");
        assert_eq!(
            PromoError::InvalidTransition(PromotionStatus::Rejected).to_string(),
            "Promotion is Rejected, only Pending requests can be decided"
        );
    }
}
