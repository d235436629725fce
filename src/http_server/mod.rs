//! # HTTP Server Module
//!
//! JSON-over-HTTP surface for the promotion lifecycle.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/metrics` - Promotion counters
//! - `/api/posts` - Post submission
//! - `/api/restaurants/:restaurant_id/*` - Request review, redemption, ledgers
//! - `/api/users/:foodie_id/loyalty_points` - Foodie ledgers
//! - `/api/promo_codes/decode` - Code inspection

pub mod config;
pub mod observability_routes;
pub mod promo_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use promo_routes::{ErrorResponse, PromoState};
pub use server::HttpServer;
