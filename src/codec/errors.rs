//! # Codec Errors

use thiserror::Error;

/// Result type for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Promo code encoding and decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    // ==================
    // Decode Errors
    // ==================
    /// Not valid URL-safe base64
    #[error("Promo code is not valid base64")]
    MalformedEncoding,

    /// Envelope shorter than header + nonce + tag
    #[error("Promo code is truncated")]
    Truncated,

    /// Envelope version byte not understood
    #[error("Unsupported promo code version: {0}")]
    UnsupportedVersion(u8),

    /// Key id not present in the keyring
    #[error("Promo code was minted under an unknown key")]
    UnknownKey,

    /// AEAD tag did not verify
    #[error("Promo code failed integrity verification")]
    IntegrityCheckFailed,

    /// Decrypted record is not a well-formed field list
    #[error("Malformed promo code payload: {0}")]
    MalformedPayload(String),

    /// Record carries fewer than the four mandatory fields
    #[error("Promo code payload has {0} fields, expected at least 4")]
    MissingFields(usize),

    // ==================
    // Encode / Key Errors
    // ==================
    /// A field exceeds the per-field length limit
    #[error("Field '{0}' is too long to encode")]
    FieldTooLong(&'static str),

    /// Key material is not 32 bytes of base64
    #[error("Invalid promo key: {0}")]
    InvalidKey(String),

    /// Cipher refused to encrypt
    #[error("Internal error: promo code encryption failed")]
    EncryptionFailed,
}

impl CodecError {
    /// Whether the error describes a bad code presented by a caller
    /// (as opposed to bad configuration or an encode-side failure)
    pub fn is_invalid_code(&self) -> bool {
        !matches!(
            self,
            CodecError::FieldTooLong(_) | CodecError::InvalidKey(_) | CodecError::EncryptionFailed
        )
    }
}
