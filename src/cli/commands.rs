//! CLI command implementations
//!
//! `serve` follows a fixed boot sequence: load and validate configuration,
//! resolve the keyring, build the promotion state, then bind. Any failure
//! before binding aborts the boot.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::auth::{JwtManager, Principal, UserType};
use crate::codec::{PromoCodec, PromoKey};
use crate::config::ServiceConfig;
use crate::http_server::{HttpServer, PromoState};
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::promo::PromotionManager;
use crate::store::InMemoryPromoStore;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config } => serve(&config),
        Command::Keygen => keygen(),
        Command::Token {
            config,
            user_id,
            user_type,
        } => token(&config, &user_id, &user_type),
        Command::Decode { config, code } => decode(&config, &code),
    }
}

/// Build the shared promotion state from validated configuration
pub fn build_state(config: &ServiceConfig) -> CliResult<Arc<PromoState>> {
    let keyring = config.keyring()?;

    log_event_with_fields(
        Event::KeyringLoaded,
        &[
            ("active_key_id", keyring.active().id_hex().as_str()),
            ("keys", keyring.len().to_string().as_str()),
        ],
    );

    let manager = PromotionManager::new(InMemoryPromoStore::new(), PromoCodec::new(keyring))
        .with_points_per_redemption(config.points_per_redemption);
    let jwt = JwtManager::new(config.jwt_config());

    Ok(Arc::new(PromoState::new(manager, jwt)))
}

/// Load configuration and serve the HTTP API until the process exits
pub fn serve(config_path: &Path) -> CliResult<()> {
    log_event(Event::BootStart);

    let result = boot(config_path).and_then(|server| {
        let rt = tokio::runtime::Runtime::new().map_err(|e| {
            CliError::boot_failed(format!("Failed to create tokio runtime: {}", e))
        })?;

        rt.block_on(async {
            server
                .start()
                .await
                .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
        })
    });

    if let Err(e) = &result {
        Logger::fatal(
            Event::BootFailed.as_str(),
            &[("code", e.code_str()), ("message", e.message())],
        );
    }

    result
}

fn boot(config_path: &Path) -> CliResult<HttpServer> {
    let config = ServiceConfig::load(config_path)?;

    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("addr", config.http.socket_addr().as_str()),
            (
                "points_per_redemption",
                config.points_per_redemption.to_string().as_str(),
            ),
        ],
    );

    let state = build_state(&config)?;
    Ok(HttpServer::with_state(config.http.clone(), state))
}

/// Generate a fresh promo key for the config file
pub fn keygen() -> CliResult<()> {
    let key = PromoKey::generate();
    write_response(json!({
        "promo_key": key.to_base64(),
        "key_id": key.id_hex(),
    }))
}

/// Mint a bearer token for a user
pub fn token(config_path: &Path, user_id: &str, user_type: &str) -> CliResult<()> {
    if user_id.trim().is_empty() {
        return Err(CliError::invalid_argument("user_id must not be empty"));
    }
    let user_type: UserType = user_type.parse()?;
    let config = ServiceConfig::load(config_path)?;

    let principal = Principal::new(user_id, user_type);
    let token = JwtManager::new(config.jwt_config()).issue(&principal)?;

    write_response(json!({
        "token": token,
        "user_id": principal.user_id,
        "user_type": principal.user_type,
    }))
}

/// Decode a promo code with the configured keyring
pub fn decode(config_path: &Path, code: &str) -> CliResult<()> {
    let config = ServiceConfig::load(config_path)?;
    let codec = PromoCodec::new(config.keyring()?);

    let fields = codec
        .decode(code)
        .map_err(|e| CliError::invalid_argument(format!("Invalid promo code: {}", e)))?;

    write_response(serde_json::to_value(&fields)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::codec::{PromoFields, KEY_LEN};
    use crate::cli::CliErrorCode;

    fn write_config(key: &PromoKey) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"promo_key": "{}", "jwt_secret": "cli-secret", "points_per_redemption": 15}}"#,
            key.to_base64()
        )
        .unwrap();
        file
    }

    #[test]
    fn test_build_state_uses_config() {
        let key = PromoKey::from_bytes([9u8; KEY_LEN]);
        let file = write_config(&key);
        let config = ServiceConfig::load(file.path()).unwrap();

        let state = build_state(&config).unwrap();
        assert_eq!(state.manager.points_per_redemption(), 15);
        assert_eq!(state.manager.codec().keyring().active().id(), key.id());
    }

    #[test]
    fn test_decode_command() {
        let key = PromoKey::from_bytes([9u8; KEY_LEN]);
        let file = write_config(&key);
        let code = PromoCodec::with_key(key)
            .encode(&PromoFields::new("SAVE10", "f1", "r1", "p1"))
            .unwrap();

        assert!(decode(file.path(), &code).is_ok());

        let err = decode(file.path(), "not-a-code").unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidArgument);
    }

    #[test]
    fn test_token_rejects_unknown_user_type() {
        let file = write_config(&PromoKey::generate());
        let err = token(file.path(), "u1", "Admin").unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::InvalidArgument);
    }

    #[test]
    fn test_missing_config_is_config_error() {
        let err = decode(Path::new("/nonexistent/foodcircle.json"), "x").unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[test]
    fn test_keygen() {
        assert!(keygen().is_ok());
    }
}
