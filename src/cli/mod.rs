//! CLI module for foodcircle
//!
//! Provides command-line interface for:
//! - serve: Load configuration and serve the HTTP API
//! - keygen: Generate a promo key
//! - token: Mint a bearer token
//! - decode: Inspect a promo code

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{build_state, decode, keygen, run, run_command, serve, token};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
