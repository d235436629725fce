//! # Promo Code Cipher
//!
//! Seals a [`PromoFields`] record into an opaque, URL-safe bearer string.
//!
//! Envelope (before base64):
//!
//! ```text
//! | version (1) | key id (4) | nonce (24) | ciphertext + tag (n + 16) |
//! ```
//!
//! Version and key id are bound as associated data, so swapping either
//! fails verification. Nonces are random, so encoding the same fields twice
//! yields different codes; compare decoded fields, never code strings.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    XChaCha20Poly1305, XNonce,
};

use super::errors::{CodecError, CodecResult};
use super::key::{PromoKey, PromoKeyring, KEY_ID_LEN};
use super::payload::PromoFields;

/// Current envelope version
pub const CODE_VERSION: u8 = 1;

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + KEY_ID_LEN;
const MIN_ENVELOPE_LEN: usize = HEADER_LEN + NONCE_LEN + TAG_LEN;

/// Encodes and decodes promo codes under an injected keyring
#[derive(Debug, Clone)]
pub struct PromoCodec {
    keyring: PromoKeyring,
}

impl PromoCodec {
    /// Create a codec over the given keyring
    pub fn new(keyring: PromoKeyring) -> Self {
        Self { keyring }
    }

    /// Codec with a single key
    pub fn with_key(key: PromoKey) -> Self {
        Self::new(PromoKeyring::new(key))
    }

    pub fn keyring(&self) -> &PromoKeyring {
        &self.keyring
    }

    /// Mint a code for the given fields under the active key
    pub fn encode(&self, fields: &PromoFields) -> CodecResult<String> {
        let key = self.keyring.active();
        let record = fields.to_record()?;

        let cipher = cipher_for(key)?;
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let header = header_for(key);

        let sealed = cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: &record,
                    aad: &header,
                },
            )
            .map_err(|_| CodecError::EncryptionFailed)?;

        let mut envelope = Vec::with_capacity(HEADER_LEN + NONCE_LEN + sealed.len());
        envelope.extend_from_slice(&header);
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&sealed);

        Ok(URL_SAFE_NO_PAD.encode(envelope))
    }

    /// Recover the fields from a code
    pub fn decode(&self, code: &str) -> CodecResult<PromoFields> {
        let envelope = URL_SAFE_NO_PAD
            .decode(code.trim().trim_end_matches('='))
            .map_err(|_| CodecError::MalformedEncoding)?;

        if envelope.len() < MIN_ENVELOPE_LEN {
            return Err(CodecError::Truncated);
        }

        let (header, body) = envelope.split_at(HEADER_LEN);
        let version = header[0];
        if version != CODE_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }

        let key = self
            .keyring
            .find(&header[1..])
            .ok_or(CodecError::UnknownKey)?;

        let (nonce, sealed) = body.split_at(NONCE_LEN);
        let record = cipher_for(key)?
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: header,
                },
            )
            .map_err(|_| CodecError::IntegrityCheckFailed)?;

        PromoFields::from_record(&record)
    }
}

fn cipher_for(key: &PromoKey) -> CodecResult<XChaCha20Poly1305> {
    XChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|_| CodecError::InvalidKey("cipher rejected key length".to_string()))
}

fn header_for(key: &PromoKey) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0] = CODE_VERSION;
    header[1..].copy_from_slice(&key.id());
    header
}
