//! In-memory document store
//!
//! Each collection sits behind its own lock, so every trait method runs as
//! one critical section. That is what makes the status swap a real
//! compare-and-swap and the ledger accrual a single atomic
//! increment-and-append.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};

use super::errors::{StoreError, StoreResult};
use super::{PromoStore, StatusSwap};
use crate::promo::model::{
    LoyaltyLedger, LoyaltyTransaction, Post, PromoCode, PromotionStatus, Redemption,
};

#[derive(Debug, Default)]
struct PromoCodeTable {
    by_id: HashMap<String, PromoCode>,
    /// post_id -> promo code id
    by_post: HashMap<String, String>,
}

/// In-memory [`PromoStore`]
#[derive(Debug, Default)]
pub struct InMemoryPromoStore {
    posts: RwLock<HashMap<String, Post>>,
    promo_codes: RwLock<PromoCodeTable>,
    /// keyed by (restaurant_id, foodie_id)
    ledgers: Mutex<HashMap<(String, String), LoyaltyLedger>>,
}

impl InMemoryPromoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(collection: &'static str) -> impl FnOnce(T) -> StoreError {
    move |_| StoreError::LockPoisoned(collection)
}

impl PromoStore for InMemoryPromoStore {
    fn insert_post(&self, post: &Post) -> StoreResult<()> {
        let mut posts = self.posts.write().map_err(poisoned("posts"))?;
        if posts.contains_key(&post.id) {
            return Err(StoreError::DuplicateKey {
                collection: "posts",
                key: post.id.clone(),
            });
        }
        posts.insert(post.id.clone(), post.clone());
        Ok(())
    }

    fn get_post(&self, post_id: &str) -> StoreResult<Option<Post>> {
        let posts = self.posts.read().map_err(poisoned("posts"))?;
        Ok(posts.get(post_id).cloned())
    }

    fn pending_requests_for(&self, restaurant_id: &str) -> StoreResult<Vec<Post>> {
        let posts = self.posts.read().map_err(poisoned("posts"))?;
        let mut pending: Vec<Post> = posts
            .values()
            .filter(|p| {
                p.is_promotion_request
                    && p.promotion_status == PromotionStatus::Pending
                    && p.restaurant_tagged_id.as_deref() == Some(restaurant_id)
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(pending)
    }

    fn swap_promotion_status(
        &self,
        post_id: &str,
        expected: PromotionStatus,
        next: PromotionStatus,
        promo_code_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> StoreResult<StatusSwap> {
        let mut posts = self.posts.write().map_err(poisoned("posts"))?;
        let Some(post) = posts.get_mut(post_id) else {
            return Ok(StatusSwap::Missing);
        };

        if post.promotion_status != expected {
            return Ok(StatusSwap::Conflict(post.promotion_status));
        }

        post.promotion_status = next;
        if let Some(id) = promo_code_id {
            post.promo_code_id = Some(id.to_string());
        }
        post.updated_at = at;
        Ok(StatusSwap::Swapped(post.clone()))
    }

    fn insert_promo_code(&self, promo: &PromoCode) -> StoreResult<()> {
        let mut table = self.promo_codes.write().map_err(poisoned("promocodes"))?;
        if table.by_post.contains_key(&promo.post_id) {
            return Err(StoreError::DuplicateKey {
                collection: "promocodes",
                key: promo.post_id.clone(),
            });
        }
        if table.by_id.contains_key(&promo.id) {
            return Err(StoreError::DuplicateKey {
                collection: "promocodes",
                key: promo.id.clone(),
            });
        }
        table
            .by_post
            .insert(promo.post_id.clone(), promo.id.clone());
        table.by_id.insert(promo.id.clone(), promo.clone());
        Ok(())
    }

    fn get_promo_code(&self, promo_code_id: &str) -> StoreResult<Option<PromoCode>> {
        let table = self.promo_codes.read().map_err(poisoned("promocodes"))?;
        Ok(table.by_id.get(promo_code_id).cloned())
    }

    fn find_promo_code_by_post(&self, post_id: &str) -> StoreResult<Option<PromoCode>> {
        let table = self.promo_codes.read().map_err(poisoned("promocodes"))?;
        Ok(table
            .by_post
            .get(post_id)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    fn append_redemption(
        &self,
        promo_code_id: &str,
        redemption: Redemption,
    ) -> StoreResult<bool> {
        let mut table = self.promo_codes.write().map_err(poisoned("promocodes"))?;
        match table.by_id.get_mut(promo_code_id) {
            Some(promo) => {
                promo.redemptions.push(redemption);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn accrue_points(
        &self,
        restaurant_id: &str,
        foodie_id: &str,
        transaction: LoyaltyTransaction,
    ) -> StoreResult<LoyaltyLedger> {
        let mut ledgers = self.ledgers.lock().map_err(poisoned("loyalty_points"))?;
        let ledger = ledgers
            .entry((restaurant_id.to_string(), foodie_id.to_string()))
            .or_insert_with(|| LoyaltyLedger::open(restaurant_id, foodie_id, transaction.date));
        ledger.credit(transaction);
        Ok(ledger.clone())
    }

    fn get_ledger(
        &self,
        restaurant_id: &str,
        foodie_id: &str,
    ) -> StoreResult<Option<LoyaltyLedger>> {
        let ledgers = self.ledgers.lock().map_err(poisoned("loyalty_points"))?;
        Ok(ledgers
            .get(&(restaurant_id.to_string(), foodie_id.to_string()))
            .cloned())
    }

    fn ledgers_for_foodie(&self, foodie_id: &str) -> StoreResult<Vec<LoyaltyLedger>> {
        let ledgers = self.ledgers.lock().map_err(poisoned("loyalty_points"))?;
        let mut found: Vec<LoyaltyLedger> = ledgers
            .values()
            .filter(|l| l.foodie_id == foodie_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.restaurant_id.cmp(&b.restaurant_id));
        Ok(found)
    }

    fn ledgers_for_restaurant(&self, restaurant_id: &str) -> StoreResult<Vec<LoyaltyLedger>> {
        let ledgers = self.ledgers.lock().map_err(poisoned("loyalty_points"))?;
        let mut found: Vec<LoyaltyLedger> = ledgers
            .values()
            .filter(|l| l.restaurant_id == restaurant_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.foodie_id.cmp(&b.foodie_id));
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promo::model::{ConfirmationStatus, PostDraft, TransactionType};

    fn promotion_post(author: &str, restaurant: &str) -> Post {
        Post::from_draft(
            author,
            PostDraft {
                caption: "ramen".to_string(),
                restaurant_tagged_id: Some(restaurant.to_string()),
                is_promotion_request: true,
                ..Default::default()
            },
            Utc::now(),
        )
    }

    fn promo_for(post: &Post) -> PromoCode {
        PromoCode {
            id: format!("promo-{}", post.id),
            code_encrypted: "code".to_string(),
            promoter_id: post.user_id.clone(),
            restaurant_id: "r1".to_string(),
            post_id: post.id.clone(),
            offer_description: "10% off".to_string(),
            expiry_date: None,
            redemptions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn earned(amount: u64) -> LoyaltyTransaction {
        LoyaltyTransaction {
            amount,
            kind: TransactionType::Earned,
            source_promo_code_id: "c1".to_string(),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_post_insert_and_lookup() {
        let store = InMemoryPromoStore::new();
        let post = promotion_post("f1", "r1");
        store.insert_post(&post).unwrap();

        assert_eq!(store.get_post(&post.id).unwrap(), Some(post.clone()));
        assert!(store.get_post("missing").unwrap().is_none());
        assert!(matches!(
            store.insert_post(&post),
            Err(StoreError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_status_swap_is_compare_and_swap() {
        let store = InMemoryPromoStore::new();
        let post = promotion_post("f1", "r1");
        store.insert_post(&post).unwrap();
        let now = Utc::now();

        let first = store
            .swap_promotion_status(
                &post.id,
                PromotionStatus::Pending,
                PromotionStatus::Approved,
                Some("c1"),
                now,
            )
            .unwrap();
        match first {
            StatusSwap::Swapped(updated) => {
                assert_eq!(updated.promotion_status, PromotionStatus::Approved);
                assert_eq!(updated.promo_code_id.as_deref(), Some("c1"));
            }
            other => panic!("expected swap, got {:?}", other),
        }

        let second = store
            .swap_promotion_status(
                &post.id,
                PromotionStatus::Pending,
                PromotionStatus::Rejected,
                None,
                now,
            )
            .unwrap();
        assert_eq!(second, StatusSwap::Conflict(PromotionStatus::Approved));

        let missing = store
            .swap_promotion_status(
                "nope",
                PromotionStatus::Pending,
                PromotionStatus::Approved,
                None,
                now,
            )
            .unwrap();
        assert_eq!(missing, StatusSwap::Missing);
    }

    #[test]
    fn test_pending_requests_filtered_by_restaurant() {
        let store = InMemoryPromoStore::new();
        let a = promotion_post("f1", "r1");
        let b = promotion_post("f2", "r2");
        let normal = Post::from_draft("f3", PostDraft::default(), Utc::now());
        for p in [&a, &b, &normal] {
            store.insert_post(p).unwrap();
        }

        let pending = store.pending_requests_for("r1").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, a.id);
    }

    #[test]
    fn test_promo_code_unique_per_post() {
        let store = InMemoryPromoStore::new();
        let post = promotion_post("f1", "r1");
        let promo = promo_for(&post);
        store.insert_promo_code(&promo).unwrap();

        let mut again = promo.clone();
        again.id = "other".to_string();
        assert!(matches!(
            store.insert_promo_code(&again),
            Err(StoreError::DuplicateKey { .. })
        ));

        assert_eq!(
            store.find_promo_code_by_post(&post.id).unwrap(),
            Some(promo.clone())
        );
        assert_eq!(store.get_promo_code(&promo.id).unwrap(), Some(promo));
    }

    #[test]
    fn test_redemptions_append_in_order() {
        let store = InMemoryPromoStore::new();
        let post = promotion_post("f1", "r1");
        let promo = promo_for(&post);
        store.insert_promo_code(&promo).unwrap();

        for who in ["u1", "u2"] {
            let appended = store
                .append_redemption(
                    &promo.id,
                    Redemption {
                        redeemer_user_id: who.to_string(),
                        redeemed_at: Utc::now(),
                        confirmation_status: ConfirmationStatus::Confirmed,
                    },
                )
                .unwrap();
            assert!(appended);
        }

        let stored = store.get_promo_code(&promo.id).unwrap().unwrap();
        let who: Vec<_> = stored
            .redemptions
            .iter()
            .map(|r| r.redeemer_user_id.as_str())
            .collect();
        assert_eq!(who, vec!["u1", "u2"]);

        let missing = store
            .append_redemption(
                "nope",
                Redemption {
                    redeemer_user_id: "u3".to_string(),
                    redeemed_at: Utc::now(),
                    confirmation_status: ConfirmationStatus::Confirmed,
                },
            )
            .unwrap();
        assert!(!missing);
    }

    #[test]
    fn test_accrue_creates_then_increments() {
        let store = InMemoryPromoStore::new();
        assert!(store.get_ledger("r1", "f1").unwrap().is_none());

        store.accrue_points("r1", "f1", earned(10)).unwrap();
        let ledger = store.accrue_points("r1", "f1", earned(10)).unwrap();

        assert_eq!(ledger.points, 20);
        assert_eq!(ledger.transactions.len(), 2);
        assert_eq!(store.ledgers_for_foodie("f1").unwrap().len(), 1);
        assert_eq!(store.ledgers_for_restaurant("r1").unwrap().len(), 1);
        assert!(store.ledgers_for_restaurant("r2").unwrap().is_empty());
    }
}
