//! # Promotion Documents
//!
//! Records the promotion engine reads and writes: posts carrying a
//! promotion request, minted promo codes with their redemptions, and
//! per-(restaurant, foodie) loyalty ledgers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Promotion status of a post
///
/// `N/A` and the decided states are terminal; only `Pending` moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionStatus {
    #[serde(rename = "N/A")]
    NotApplicable,
    Pending,
    Approved,
    Rejected,
}

impl PromotionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionStatus::NotApplicable => "N/A",
            PromotionStatus::Pending => "Pending",
            PromotionStatus::Approved => "Approved",
            PromotionStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PromotionStatus::Pending)
    }

    /// Whether `self -> next` is an allowed transition
    pub fn can_transition_to(&self, next: PromotionStatus) -> bool {
        matches!(
            (self, next),
            (
                PromotionStatus::Pending,
                PromotionStatus::Approved | PromotionStatus::Rejected
            )
        )
    }
}

impl std::fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostType {
    Normal,
    Promotion,
}

/// Post submission body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostDraft {
    pub caption: String,
    #[serde(default)]
    pub stars: Option<u8>,
    #[serde(default)]
    pub restaurant_tagged_id: Option<String>,
    #[serde(default)]
    pub dish_id: Option<String>,
    #[serde(default)]
    pub is_promotion_request: bool,
    #[serde(default)]
    pub promotion_offer_idea: Option<String>,
}

/// A post as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// Author; the promoter when this is a promotion request
    pub user_id: String,
    pub caption: String,
    pub stars: Option<u8>,
    pub restaurant_tagged_id: Option<String>,
    pub dish_id: Option<String>,
    pub is_promotion_request: bool,
    pub promotion_offer_idea: Option<String>,
    pub post_type: PostType,
    pub promotion_status: PromotionStatus,
    pub promo_code_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a new post from a draft
    pub fn from_draft(author_id: &str, draft: PostDraft, now: DateTime<Utc>) -> Self {
        let (post_type, promotion_status) = if draft.is_promotion_request {
            (PostType::Promotion, PromotionStatus::Pending)
        } else {
            (PostType::Normal, PromotionStatus::NotApplicable)
        };

        Self {
            id: Uuid::new_v4().to_string(),
            user_id: author_id.to_string(),
            caption: draft.caption,
            stars: draft.stars,
            restaurant_tagged_id: draft.restaurant_tagged_id,
            dish_id: draft.dish_id,
            is_promotion_request: draft.is_promotion_request,
            promotion_offer_idea: draft.promotion_offer_idea,
            post_type,
            promotion_status,
            promo_code_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The embedded promotion request, if this post carries one
    pub fn promotion_request(&self) -> Option<PromotionRequest> {
        if !self.is_promotion_request {
            return None;
        }
        let restaurant_id = self.restaurant_tagged_id.clone()?;
        Some(PromotionRequest {
            post_id: self.id.clone(),
            promoter_user_id: self.user_id.clone(),
            restaurant_id,
            dish_id: self.dish_id.clone(),
            promotion_status: self.promotion_status,
        })
    }
}

/// Identity tuple and status of a promotion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromotionRequest {
    pub post_id: String,
    pub promoter_user_id: String,
    pub restaurant_id: String,
    pub dish_id: Option<String>,
    pub promotion_status: PromotionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationStatus {
    Confirmed,
}

/// One use of a promo code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub redeemer_user_id: String,
    pub redeemed_at: DateTime<Utc>,
    pub confirmation_status: ConfirmationStatus,
}

/// A minted promo code; one per approved promotion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoCode {
    pub id: String,
    pub code_encrypted: String,
    pub promoter_id: String,
    pub restaurant_id: String,
    pub post_id: String,
    pub offer_description: String,
    pub expiry_date: Option<DateTime<Utc>>,
    pub redemptions: Vec<Redemption>,
    pub created_at: DateTime<Utc>,
}

impl PromoCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.is_some_and(|expiry| now > expiry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Earned,
    Spent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyTransaction {
    pub amount: u64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub source_promo_code_id: String,
    pub date: DateTime<Utc>,
}

/// Points a foodie holds at one restaurant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltyLedger {
    pub restaurant_id: String,
    pub foodie_id: String,
    pub points: u64,
    pub transactions: Vec<LoyaltyTransaction>,
    pub last_updated: DateTime<Utc>,
}

impl LoyaltyLedger {
    /// Empty ledger for a (restaurant, foodie) pair
    pub fn open(restaurant_id: &str, foodie_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            restaurant_id: restaurant_id.to_string(),
            foodie_id: foodie_id.to_string(),
            points: 0,
            transactions: Vec::new(),
            last_updated: now,
        }
    }

    /// Apply an earned transaction
    pub fn credit(&mut self, transaction: LoyaltyTransaction) {
        self.points = self.points.saturating_add(transaction.amount);
        self.last_updated = transaction.date;
        self.transactions.push(transaction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_status_transitions() {
        use PromotionStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(!Approved.can_transition_to(Approved));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!NotApplicable.can_transition_to(Pending));
        assert!(NotApplicable.is_terminal());
        assert!(!Pending.is_terminal());
    }

    #[test]
    fn test_status_serializes_like_documents() {
        assert_eq!(
            serde_json::to_string(&PromotionStatus::NotApplicable).unwrap(),
            "\"N/A\""
        );
        assert_eq!(
            serde_json::from_str::<PromotionStatus>("\"Pending\"").unwrap(),
            PromotionStatus::Pending
        );
    }

    #[test]
    fn test_draft_sets_initial_status() {
        let now = Utc::now();
        let normal = Post::from_draft("f1", PostDraft::default(), now);
        assert_eq!(normal.promotion_status, PromotionStatus::NotApplicable);
        assert_eq!(normal.post_type, PostType::Normal);
        assert!(normal.promotion_request().is_none());

        let promo = Post::from_draft(
            "f1",
            PostDraft {
                restaurant_tagged_id: Some("r1".to_string()),
                is_promotion_request: true,
                ..Default::default()
            },
            now,
        );
        assert_eq!(promo.promotion_status, PromotionStatus::Pending);
        let request = promo.promotion_request().unwrap();
        assert_eq!(request.promoter_user_id, "f1");
        assert_eq!(request.restaurant_id, "r1");
    }

    #[test]
    fn test_expiry_check() {
        let now = Utc::now();
        let mut code = PromoCode {
            id: "c1".to_string(),
            code_encrypted: String::new(),
            promoter_id: "f1".to_string(),
            restaurant_id: "r1".to_string(),
            post_id: "p1".to_string(),
            offer_description: "10% off".to_string(),
            expiry_date: None,
            redemptions: Vec::new(),
            created_at: now,
        };
        assert!(!code.is_expired_at(now));

        code.expiry_date = Some(now - Duration::minutes(1));
        assert!(code.is_expired_at(now));

        code.expiry_date = Some(now + Duration::minutes(1));
        assert!(!code.is_expired_at(now));
    }

    #[test]
    fn test_ledger_credit() {
        let now = Utc::now();
        let mut ledger = LoyaltyLedger::open("r1", "f1", now);
        ledger.credit(LoyaltyTransaction {
            amount: 10,
            kind: TransactionType::Earned,
            source_promo_code_id: "c1".to_string(),
            date: now,
        });

        assert_eq!(ledger.points, 10);
        assert_eq!(ledger.transactions.len(), 1);

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["transactions"][0]["type"], "Earned");
    }
}
