//! # Promo Keys
//!
//! Symmetric key material for the promo code cipher.
//!
//! Keys are resolved once at startup from configuration and handed to the
//! codec. A restart with the same configuration never invalidates codes;
//! rotation happens only when an operator installs a new active key.

use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::errors::{CodecError, CodecResult};

/// Key length in bytes (XChaCha20-Poly1305)
pub const KEY_LEN: usize = 32;

/// Length of the key id carried in every code
pub const KEY_ID_LEN: usize = 4;

/// A single 256-bit promo key
#[derive(Clone)]
pub struct PromoKey {
    bytes: [u8; KEY_LEN],
    id: [u8; KEY_ID_LEN],
}

impl PromoKey {
    /// Build a key from raw bytes
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut id = [0u8; KEY_ID_LEN];
        id.copy_from_slice(&digest[..KEY_ID_LEN]);
        Self { bytes, id }
    }

    /// Parse a key from URL-safe base64 (padding optional)
    pub fn from_base64(encoded: &str) -> CodecResult<Self> {
        let trimmed = encoded.trim().trim_end_matches('=');
        let raw = URL_SAFE_NO_PAD
            .decode(trimmed)
            .map_err(|e| CodecError::InvalidKey(format!("not base64: {}", e)))?;

        let bytes: [u8; KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
            CodecError::InvalidKey(format!("expected {} bytes, got {}", KEY_LEN, raw.len()))
        })?;

        Ok(Self::from_bytes(bytes))
    }

    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self::from_bytes(bytes)
    }

    /// Encode the key for a config file
    pub fn to_base64(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.bytes)
    }

    /// Fingerprint embedded in codes minted under this key
    pub fn id(&self) -> [u8; KEY_ID_LEN] {
        self.id
    }

    /// Hex rendering of the key id, safe to log
    pub fn id_hex(&self) -> String {
        self.id.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for PromoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromoKey")
            .field("id", &self.id_hex())
            .finish_non_exhaustive()
    }
}

/// Active key plus retired keys still accepted for decoding
#[derive(Debug, Clone)]
pub struct PromoKeyring {
    active: PromoKey,
    retired: Vec<PromoKey>,
}

impl PromoKeyring {
    /// Keyring with a single active key
    pub fn new(active: PromoKey) -> Self {
        Self {
            active,
            retired: Vec::new(),
        }
    }

    /// Add keys that remain valid for decoding only
    pub fn with_retired(mut self, retired: Vec<PromoKey>) -> Self {
        self.retired = retired
            .into_iter()
            .filter(|k| k.id() != self.active.id())
            .collect();
        self
    }

    /// Key used to mint new codes
    pub fn active(&self) -> &PromoKey {
        &self.active
    }

    /// Look up a key by its id
    pub fn find(&self, id: &[u8]) -> Option<&PromoKey> {
        std::iter::once(&self.active)
            .chain(self.retired.iter())
            .find(|k| k.id().as_slice() == id)
    }

    /// Number of keys accepted for decoding
    pub fn len(&self) -> usize {
        1 + self.retired.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}
