//! foodcircle - promotion requests, encrypted promo codes, and loyalty points
//!
//! A foodie tags a restaurant on a post and asks for a promotion. The
//! restaurant approves it, minting an encrypted promo code bound to the
//! foodie, the restaurant, and the post. Each redemption of that code at
//! the restaurant credits the foodie's loyalty ledger.

pub mod auth;
pub mod cli;
pub mod codec;
pub mod config;
pub mod http_server;
pub mod observability;
pub mod promo;
pub mod store;
