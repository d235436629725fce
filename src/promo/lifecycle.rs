//! # Promotion Lifecycle Manager
//!
//! ```text
//! submit ──► N/A (terminal)
//!    └─────► Pending ──approve──► Approved (terminal, code minted)
//!                    └─reject───► Rejected (terminal)
//! ```
//!
//! Approve and reject are compare-and-swap transitions out of `Pending`,
//! so a request is decided at most once. Redemption validates everything
//! up front and only then records the redemption and credits the ledger.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::{PromoError, PromoResult};
use super::model::{
    ConfirmationStatus, LoyaltyLedger, LoyaltyTransaction, Post, PostDraft, PromoCode,
    PromotionStatus, Redemption, TransactionType,
};
use crate::auth::{Principal, UserType};
use crate::codec::{CodecError, PromoCodec, PromoFields};
use crate::observability::{log_event_with_fields, log_rejection, Event, Logger, MetricsRegistry};
use crate::store::{PromoStore, StatusSwap, StoreError};

/// Points credited per redemption unless configured otherwise
pub const DEFAULT_POINTS_PER_REDEMPTION: u64 = 10;

/// Approval body
#[derive(Debug, Clone, Deserialize)]
pub struct ApproveRequest {
    pub promo_code_plain_text: String,
    pub offer_description: String,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Result of an approval; the code is a bearer secret relayed out of band
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovedPromo {
    pub promo_code_id: String,
    pub encrypted_code: String,
}

/// Redemption body
#[derive(Debug, Clone, Deserialize)]
pub struct RedeemRequest {
    pub promo_code_encrypted: String,
    pub redeemer_user_id: String,
}

/// Result of a redemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedeemOutcome {
    pub points_awarded: u64,
    pub promo_code_id: String,
    pub promoter_id: String,
    /// Ledger balance after this redemption
    pub total_points: u64,
}

/// Decoded code for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromoDisplay {
    #[serde(flatten)]
    pub fields: PromoFields,
    pub offer_description: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub redemption_count: Option<usize>,
}

/// Drives promotion requests from submission to point settlement
pub struct PromotionManager<S: PromoStore> {
    store: S,
    codec: PromoCodec,
    points_per_redemption: u64,
    metrics: Arc<MetricsRegistry>,
}

impl<S: PromoStore> PromotionManager<S> {
    /// Create a manager over a store and an injected codec
    pub fn new(store: S, codec: PromoCodec) -> Self {
        Self {
            store,
            codec,
            points_per_redemption: DEFAULT_POINTS_PER_REDEMPTION,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    pub fn with_points_per_redemption(mut self, points: u64) -> Self {
        self.points_per_redemption = points;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn codec(&self) -> &PromoCodec {
        &self.codec
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Shared handle to the counters, for exposing them elsewhere
    pub fn metrics_handle(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }

    pub fn points_per_redemption(&self) -> u64 {
        self.points_per_redemption
    }

    // ==================
    // Submission
    // ==================

    /// Create a post; promotion requests start `Pending`, others `N/A`
    pub fn submit(&self, actor: &Principal, draft: PostDraft) -> PromoResult<Post> {
        if let Some(stars) = draft.stars {
            if !(1..=5).contains(&stars) {
                return Err(PromoError::InvalidRequest(
                    "stars must be between 1 and 5".to_string(),
                ));
            }
        }

        if draft.is_promotion_request {
            if actor.user_type != UserType::Foodie {
                return Err(PromoError::InvalidRequest(
                    "only foodies can request promotions".to_string(),
                ));
            }
            match draft.restaurant_tagged_id.as_deref() {
                None | Some("") => {
                    return Err(PromoError::InvalidRequest(
                        "promotion requests must tag a restaurant".to_string(),
                    ))
                }
                Some(restaurant) if restaurant == actor.user_id => {
                    return Err(PromoError::InvalidRequest(
                        "cannot request a promotion from yourself".to_string(),
                    ))
                }
                Some(_) => {}
            }
        }

        let post = Post::from_draft(&actor.user_id, draft, Utc::now());
        self.store.insert_post(&post).map_err(store_failure)?;

        self.metrics.increment_posts_submitted();
        if post.is_promotion_request {
            self.metrics.increment_promo_requests();
            log_event_with_fields(
                Event::PromoRequested,
                &[
                    ("post_id", post.id.as_str()),
                    ("promoter_id", post.user_id.as_str()),
                    (
                        "restaurant_id",
                        post.restaurant_tagged_id.as_deref().unwrap_or_default(),
                    ),
                ],
            );
        } else {
            log_event_with_fields(Event::PostSubmitted, &[("post_id", post.id.as_str())]);
        }

        Ok(post)
    }

    // ==================
    // Decision
    // ==================

    /// Approve a pending request and mint its promo code
    pub fn approve(
        &self,
        post_id: &str,
        actor: &Principal,
        request: ApproveRequest,
    ) -> PromoResult<ApprovedPromo> {
        let post = self.owned_post(post_id, actor)?;

        if post.promotion_status != PromotionStatus::Pending {
            return Err(self.transition_denied(&post.id, post.promotion_status));
        }
        if request.promo_code_plain_text.trim().is_empty() {
            return Err(PromoError::InvalidRequest(
                "promo code text must not be empty".to_string(),
            ));
        }

        let fields = PromoFields::new(
            request.promo_code_plain_text,
            post.user_id.as_str(),
            actor.user_id.as_str(),
            post.id.as_str(),
        )
        .with_dish(post.dish_id.clone().unwrap_or_default());

        let encrypted_code = self.codec.encode(&fields).map_err(|e| match e {
            CodecError::FieldTooLong(field) => {
                PromoError::InvalidRequest(format!("{} is too long", field))
            }
            other => PromoError::Internal(other.to_string()),
        })?;

        let now = Utc::now();
        let promo_code_id = Uuid::new_v4().to_string();

        // Decide first: losing the swap must leave no promo code behind
        match self
            .store
            .swap_promotion_status(
                &post.id,
                PromotionStatus::Pending,
                PromotionStatus::Approved,
                Some(&promo_code_id),
                now,
            )
            .map_err(store_failure)?
        {
            StatusSwap::Swapped(_) => {}
            StatusSwap::Missing => return Err(PromoError::NotFound("Post")),
            StatusSwap::Conflict(current) => return Err(self.transition_denied(&post.id, current)),
        }

        let promo = PromoCode {
            id: promo_code_id.clone(),
            code_encrypted: encrypted_code.clone(),
            promoter_id: post.user_id.clone(),
            restaurant_id: actor.user_id.clone(),
            post_id: post.id.clone(),
            offer_description: request.offer_description,
            expiry_date: request.expiry_date,
            redemptions: Vec::new(),
            created_at: now,
        };
        self.store.insert_promo_code(&promo).map_err(store_failure)?;

        self.metrics.increment_codes_minted();
        log_event_with_fields(
            Event::PromoApproved,
            &[
                ("key_id", self.codec.keyring().active().id_hex().as_str()),
                ("post_id", post.id.as_str()),
                ("promo_code_id", promo_code_id.as_str()),
                ("restaurant_id", actor.user_id.as_str()),
            ],
        );

        Ok(ApprovedPromo {
            promo_code_id,
            encrypted_code,
        })
    }

    /// Reject a pending request; no code is minted
    pub fn reject(&self, post_id: &str, actor: &Principal) -> PromoResult<Post> {
        let post = self.owned_post(post_id, actor)?;

        let swap = self
            .store
            .swap_promotion_status(
                &post.id,
                PromotionStatus::Pending,
                PromotionStatus::Rejected,
                None,
                Utc::now(),
            )
            .map_err(store_failure)?;

        match swap {
            StatusSwap::Swapped(updated) => {
                self.metrics.increment_requests_rejected();
                log_event_with_fields(
                    Event::PromoRejected,
                    &[
                        ("post_id", updated.id.as_str()),
                        ("restaurant_id", actor.user_id.as_str()),
                    ],
                );
                Ok(updated)
            }
            StatusSwap::Missing => Err(PromoError::NotFound("Post")),
            StatusSwap::Conflict(current) => Err(self.transition_denied(&post.id, current)),
        }
    }

    // ==================
    // Redemption
    // ==================

    /// Redeem a code at a restaurant and credit the promoter's ledger
    pub fn redeem(
        &self,
        restaurant_id: &str,
        actor: &Principal,
        request: RedeemRequest,
    ) -> PromoResult<RedeemOutcome> {
        let result = self.try_redeem(restaurant_id, actor, request);
        if let Err(e) = &result {
            if e.is_client_error() {
                self.metrics.increment_redemptions_rejected();
                log_rejection(
                    Event::RedemptionRejected,
                    e.reason(),
                    &[("restaurant_id", restaurant_id)],
                );
            }
        }
        result
    }

    fn try_redeem(
        &self,
        restaurant_id: &str,
        actor: &Principal,
        request: RedeemRequest,
    ) -> PromoResult<RedeemOutcome> {
        if !actor.is_restaurant(restaurant_id) {
            return Err(PromoError::Forbidden);
        }
        if request.redeemer_user_id.trim().is_empty() {
            return Err(PromoError::InvalidRequest(
                "redeemer_user_id must not be empty".to_string(),
            ));
        }

        let fields = self.decode_code(&request.promo_code_encrypted)?;

        if fields.restaurant_id != restaurant_id {
            return Err(PromoError::RestaurantMismatch);
        }

        let promo = self
            .store
            .find_promo_code_by_post(&fields.post_id)
            .map_err(store_failure)?
            .ok_or(PromoError::NotFound("Promo code"))?;

        if promo.promoter_id != fields.promoter_id || promo.restaurant_id != fields.restaurant_id {
            return Err(PromoError::InvalidCode);
        }

        let now = Utc::now();
        if promo.is_expired_at(now) {
            return Err(PromoError::Expired);
        }

        let appended = self
            .store
            .append_redemption(
                &promo.id,
                Redemption {
                    redeemer_user_id: request.redeemer_user_id.clone(),
                    redeemed_at: now,
                    confirmation_status: ConfirmationStatus::Confirmed,
                },
            )
            .map_err(store_failure)?;
        if !appended {
            return Err(PromoError::NotFound("Promo code"));
        }

        let points = self.points_per_redemption;
        let ledger = self
            .store
            .accrue_points(
                restaurant_id,
                &fields.promoter_id,
                LoyaltyTransaction {
                    amount: points,
                    kind: TransactionType::Earned,
                    source_promo_code_id: promo.id.clone(),
                    date: now,
                },
            )
            .map_err(store_failure)?;

        self.metrics.increment_redemptions();
        self.metrics.add_points_awarded(points);
        log_event_with_fields(
            Event::PromoRedeemed,
            &[
                ("promo_code_id", promo.id.as_str()),
                ("redeemer_user_id", request.redeemer_user_id.as_str()),
                ("restaurant_id", restaurant_id),
            ],
        );
        log_event_with_fields(
            Event::PointsAccrued,
            &[
                ("foodie_id", ledger.foodie_id.as_str()),
                ("points", points.to_string().as_str()),
                ("restaurant_id", ledger.restaurant_id.as_str()),
                ("total", ledger.points.to_string().as_str()),
            ],
        );

        Ok(RedeemOutcome {
            points_awarded: points,
            promo_code_id: promo.id,
            promoter_id: fields.promoter_id,
            total_points: ledger.points,
        })
    }

    /// Decode a code for display, enriched with its record when present
    pub fn decode_for_display(&self, _actor: &Principal, code: &str) -> PromoResult<PromoDisplay> {
        let fields = self.decode_code(code)?;
        let promo = self
            .store
            .find_promo_code_by_post(&fields.post_id)
            .map_err(store_failure)?
            .filter(|p| p.restaurant_id == fields.restaurant_id);

        Ok(PromoDisplay {
            offer_description: promo.as_ref().map(|p| p.offer_description.clone()),
            expiry_date: promo.as_ref().and_then(|p| p.expiry_date),
            redemption_count: promo.as_ref().map(|p| p.redemptions.len()),
            fields,
        })
    }

    // ==================
    // Read side
    // ==================

    /// Pending requests awaiting a restaurant's decision
    pub fn pending_requests(
        &self,
        actor: &Principal,
        restaurant_id: &str,
    ) -> PromoResult<Vec<Post>> {
        if !actor.is_restaurant(restaurant_id) {
            return Err(PromoError::Forbidden);
        }
        self.store
            .pending_requests_for(restaurant_id)
            .map_err(store_failure)
    }

    /// Every ledger a foodie holds
    pub fn foodie_ledgers(
        &self,
        actor: &Principal,
        foodie_id: &str,
    ) -> PromoResult<Vec<LoyaltyLedger>> {
        if !actor.is(foodie_id) {
            return Err(PromoError::Forbidden);
        }
        self.store.ledgers_for_foodie(foodie_id).map_err(store_failure)
    }

    /// Every ledger a restaurant keeps
    pub fn restaurant_ledgers(
        &self,
        actor: &Principal,
        restaurant_id: &str,
    ) -> PromoResult<Vec<LoyaltyLedger>> {
        if !actor.is_restaurant(restaurant_id) {
            return Err(PromoError::Forbidden);
        }
        self.store
            .ledgers_for_restaurant(restaurant_id)
            .map_err(store_failure)
    }

    // ==================
    // Helpers
    // ==================

    /// Load a post and check the actor is the restaurant it tags
    fn owned_post(&self, post_id: &str, actor: &Principal) -> PromoResult<Post> {
        let post = self
            .store
            .get_post(post_id)
            .map_err(store_failure)?
            .ok_or(PromoError::NotFound("Post"))?;

        let owner = post.restaurant_tagged_id.as_deref().unwrap_or_default();
        if owner.is_empty() || !actor.is_restaurant(owner) {
            log_rejection(
                Event::AccessDenied,
                "not_tagged_restaurant",
                &[("post_id", post_id), ("user_id", actor.user_id.as_str())],
            );
            return Err(PromoError::Forbidden);
        }

        Ok(post)
    }

    fn decode_code(&self, code: &str) -> PromoResult<PromoFields> {
        self.codec.decode(code).map_err(|_| PromoError::InvalidCode)
    }

    fn transition_denied(&self, post_id: &str, current: PromotionStatus) -> PromoError {
        self.metrics.increment_transitions_denied();
        log_rejection(
            Event::PromoTransitionDenied,
            current.as_str(),
            &[("post_id", post_id)],
        );
        PromoError::InvalidTransition(current)
    }
}

fn store_failure(e: StoreError) -> PromoError {
    Logger::error(
        Event::StoreFailure.as_str(),
        &[("cause", e.to_string().as_str())],
    );
    PromoError::Store(e)
}

impl<S: PromoStore + std::fmt::Debug> std::fmt::Debug for PromotionManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromotionManager")
            .field("store", &self.store)
            .field("codec", &self.codec)
            .field("points_per_redemption", &self.points_per_redemption)
            .finish()
    }
}
