//! Service configuration
//!
//! Loaded from a JSON file. The promo key is always supplied by the
//! operator; a missing or malformed key fails the boot.

use std::fs;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::JwtConfig;
use crate::codec::{CodecError, PromoKey, PromoKeyring};
use crate::http_server::HttpServerConfig;
use crate::promo::DEFAULT_POINTS_PER_REDEMPTION;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub http: HttpServerConfig,

    /// Active promo key, base64url of 32 bytes (required)
    pub promo_key: String,

    /// Keys still accepted for decoding codes minted before a rotation
    #[serde(default)]
    pub retired_promo_keys: Vec<String>,

    /// HS256 signing secret (required)
    pub jwt_secret: String,

    #[serde(default = "default_jwt_claim")]
    pub jwt_issuer: String,

    #[serde(default = "default_jwt_claim")]
    pub jwt_audience: String,

    /// Token lifetime in hours (default 30 days)
    #[serde(default = "default_jwt_ttl_hours")]
    pub jwt_ttl_hours: u64,

    #[serde(default = "default_points_per_redemption")]
    pub points_per_redemption: u64,
}

/// Ten years
const MAX_JWT_TTL_HOURS: u64 = 10 * 365 * 24;

fn default_jwt_claim() -> String {
    "foodcircle".to_string()
}

fn default_jwt_ttl_hours() -> u64 {
    30 * 24
}

fn default_points_per_redemption() -> u64 {
    DEFAULT_POINTS_PER_REDEMPTION
}

impl ServiceConfig {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: ServiceConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.keyring()?;

        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::invalid("jwt_secret", "must not be empty"));
        }
        if !(1..=MAX_JWT_TTL_HOURS).contains(&self.jwt_ttl_hours) {
            return Err(ConfigError::invalid(
                "jwt_ttl_hours",
                format!("must be between 1 and {}", MAX_JWT_TTL_HOURS),
            ));
        }
        if self.points_per_redemption == 0 {
            return Err(ConfigError::invalid("points_per_redemption", "must be > 0"));
        }

        Ok(())
    }

    /// Build the codec keyring from the active and retired keys
    pub fn keyring(&self) -> Result<PromoKeyring, ConfigError> {
        let active = parse_key("promo_key", &self.promo_key)?;
        let retired = self
            .retired_promo_keys
            .iter()
            .map(|k| parse_key("retired_promo_keys", k))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(PromoKeyring::new(active).with_retired(retired))
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            token_ttl: Duration::hours(self.jwt_ttl_hours as i64),
            issuer: self.jwt_issuer.clone(),
            audience: self.jwt_audience.clone(),
        }
    }
}

fn parse_key(field: &'static str, encoded: &str) -> Result<PromoKey, ConfigError> {
    if encoded.trim().is_empty() {
        return Err(ConfigError::invalid(field, "promo key is required"));
    }
    PromoKey::from_base64(encoded.trim()).map_err(|e| match e {
        CodecError::InvalidKey(reason) => ConfigError::invalid(field, reason),
        other => ConfigError::invalid(field, other.to_string()),
    })
}
