//! # Document Store
//!
//! The promotion engine's view of the document store. Every method is a
//! single point lookup or a single atomic mutation; the lifecycle never
//! reads a document, edits it, and writes it back.

mod errors;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use memory::InMemoryPromoStore;

use chrono::{DateTime, Utc};

use crate::promo::model::{
    LoyaltyLedger, LoyaltyTransaction, Post, PromoCode, PromotionStatus, Redemption,
};

/// Outcome of a status compare-and-swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSwap {
    /// Status matched and was replaced; carries the updated post
    Swapped(Post),
    /// Post does not exist
    Missing,
    /// Post exists but its status was not the expected one
    Conflict(PromotionStatus),
}

/// Store operations required by the promotion lifecycle
pub trait PromoStore: Send + Sync {
    // ==================
    // Posts
    // ==================

    /// Insert a new post
    fn insert_post(&self, post: &Post) -> StoreResult<()>;

    /// Find a post by id
    fn get_post(&self, post_id: &str) -> StoreResult<Option<Post>>;

    /// Pending promotion requests tagged to a restaurant, oldest first
    fn pending_requests_for(&self, restaurant_id: &str) -> StoreResult<Vec<Post>>;

    /// Atomically move a post from `expected` to `next`, optionally linking
    /// a promo code id, iff its current status equals `expected`
    fn swap_promotion_status(
        &self,
        post_id: &str,
        expected: PromotionStatus,
        next: PromotionStatus,
        promo_code_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> StoreResult<StatusSwap>;

    // ==================
    // Promo codes
    // ==================

    /// Insert a promo code; `post_id` is a unique key
    fn insert_promo_code(&self, promo: &PromoCode) -> StoreResult<()>;

    /// Find a promo code by id
    fn get_promo_code(&self, promo_code_id: &str) -> StoreResult<Option<PromoCode>>;

    /// Find the promo code minted for a post
    fn find_promo_code_by_post(&self, post_id: &str) -> StoreResult<Option<PromoCode>>;

    /// Append a redemption; returns false when the promo code is absent
    fn append_redemption(&self, promo_code_id: &str, redemption: Redemption)
        -> StoreResult<bool>;

    // ==================
    // Loyalty ledgers
    // ==================

    /// Upsert the (restaurant, foodie) ledger, crediting the transaction
    /// amount and appending it in one atomic step. Returns the ledger after
    /// the update.
    fn accrue_points(
        &self,
        restaurant_id: &str,
        foodie_id: &str,
        transaction: LoyaltyTransaction,
    ) -> StoreResult<LoyaltyLedger>;

    /// Find the ledger for a (restaurant, foodie) pair
    fn get_ledger(&self, restaurant_id: &str, foodie_id: &str)
        -> StoreResult<Option<LoyaltyLedger>>;

    /// All ledgers held by a foodie
    fn ledgers_for_foodie(&self, foodie_id: &str) -> StoreResult<Vec<LoyaltyLedger>>;

    /// All ledgers kept by a restaurant
    fn ledgers_for_restaurant(&self, restaurant_id: &str) -> StoreResult<Vec<LoyaltyLedger>>;
}
