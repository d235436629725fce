//! CLI argument definitions using clap
//!
//! Commands:
//! - foodcircle serve --config <path>
//! - foodcircle keygen
//! - foodcircle token --config <path> --user-id <id> --user-type <type>
//! - foodcircle decode --config <path> --code <code>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// foodcircle - promotion and loyalty service
#[derive(Parser, Debug)]
#[command(name = "foodcircle")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./foodcircle.json")]
        config: PathBuf,
    },

    /// Generate a new promo key for the config file
    Keygen,

    /// Mint a bearer token for a user (development and operations)
    Token {
        /// Path to configuration file
        #[arg(long, default_value = "./foodcircle.json")]
        config: PathBuf,

        #[arg(long)]
        user_id: String,

        /// "Foodie" or "Restaurant"
        #[arg(long)]
        user_type: String,
    },

    /// Decode a promo code with the configured keyring
    Decode {
        /// Path to configuration file
        #[arg(long, default_value = "./foodcircle.json")]
        config: PathBuf,

        #[arg(long)]
        code: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_command() {
        let cli = Cli::try_parse_from([
            "foodcircle",
            "token",
            "--user-id",
            "r1",
            "--user-type",
            "Restaurant",
        ])
        .unwrap();

        match cli.command {
            Command::Token {
                config,
                user_id,
                user_type,
            } => {
                assert_eq!(config, PathBuf::from("./foodcircle.json"));
                assert_eq!(user_id, "r1");
                assert_eq!(user_type, "Restaurant");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_decode_requires_code() {
        assert!(Cli::try_parse_from(["foodcircle", "decode"]).is_err());
    }
}
