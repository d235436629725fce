//! # Promotion Lifecycle
//!
//! Promotion requests, their approval into encrypted promo codes, and
//! redemption into loyalty points.
//!
//! ## Invariants
//! - A request is decided at most once (status compare-and-swap)
//! - At most one promo code exists per post
//! - A code only redeems at the restaurant it was minted for, and only
//!   while its decoded tuple matches the stored record
//! - Ledger accrual is a single atomic store mutation

pub mod errors;
pub mod lifecycle;
pub mod model;

pub use errors::{PromoError, PromoResult};
pub use lifecycle::{
    ApproveRequest, ApprovedPromo, PromoDisplay, PromotionManager, RedeemOutcome, RedeemRequest,
    DEFAULT_POINTS_PER_REDEMPTION,
};
pub use model::{
    ConfirmationStatus, LoyaltyLedger, LoyaltyTransaction, Post, PostDraft, PostType, PromoCode,
    PromotionRequest, PromotionStatus, Redemption, TransactionType,
};
