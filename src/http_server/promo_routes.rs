//! Promotion HTTP Routes
//!
//! Bearer-authenticated endpoints over the promotion lifecycle. Every
//! handler resolves the caller to a `Principal` before touching the
//! manager; authorization itself lives in the manager.

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, JwtManager, Principal};
use crate::observability::{log_rejection, Event};
use crate::promo::{
    ApproveRequest, ApprovedPromo, LoyaltyLedger, Post, PostDraft, PromoDisplay, PromoError,
    PromotionManager, PromotionStatus, RedeemOutcome, RedeemRequest,
};
use crate::store::InMemoryPromoStore;

/// Shared promotion state
pub struct PromoState {
    pub manager: PromotionManager<InMemoryPromoStore>,
    pub jwt: JwtManager,
}

impl PromoState {
    pub fn new(manager: PromotionManager<InMemoryPromoStore>, jwt: JwtManager) -> Self {
        Self { manager, jwt }
    }
}

/// Promotion routes with shared state
pub fn promo_routes(state: Arc<PromoState>) -> Router {
    Router::new()
        .route("/posts", post(submit_post_handler))
        .route(
            "/restaurants/:restaurant_id/promo_requests",
            get(pending_requests_handler),
        )
        .route(
            "/restaurants/:restaurant_id/promo_requests/:post_id/approve",
            post(approve_handler),
        )
        .route(
            "/restaurants/:restaurant_id/promo_requests/:post_id/reject",
            post(reject_handler),
        )
        .route(
            "/restaurants/:restaurant_id/redeem_promo",
            post(redeem_handler),
        )
        .route(
            "/restaurants/:restaurant_id/loyalty_points",
            get(restaurant_ledgers_handler),
        )
        .route("/users/:foodie_id/loyalty_points", get(foodie_ledgers_handler))
        .route("/promo_codes/decode", post(decode_handler))
        .with_state(state)
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<PromoError> for ErrorResponse {
    fn from(err: PromoError) -> Self {
        Self {
            code: err.status_code(),
            error: err.to_string(),
        }
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        Self {
            code: err.status_code(),
            error: err.to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: impl Into<ErrorResponse>) -> ApiError {
    let body = err.into();
    let status = StatusCode::from_u16(body.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body))
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub post_id: String,
    pub post: Post,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub post_id: String,
    pub promotion_status: PromotionStatus,
}

#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub promo_code_encrypted: String,
}

// ==================
// Helpers
// ==================

/// Resolve the bearer token to a principal
fn authenticate(state: &PromoState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| api_error(AuthError::AuthenticationRequired))?;

    state.jwt.authenticate(token).map_err(|e| {
        log_rejection(Event::AccessDenied, "invalid_token", &[]);
        api_error(e)
    })
}

/// Approve and reject are scoped to the restaurant in the path
fn require_restaurant(actor: &Principal, restaurant_id: &str) -> Result<(), ApiError> {
    if actor.is_restaurant(restaurant_id) {
        Ok(())
    } else {
        Err(api_error(PromoError::Forbidden))
    }
}

// ==================
// Handlers
// ==================

async fn submit_post_handler(
    State(state): State<Arc<PromoState>>,
    headers: HeaderMap,
    Json(draft): Json<PostDraft>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let actor = authenticate(&state, &headers)?;
    let post = state.manager.submit(&actor, draft).map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            post_id: post.id.clone(),
            post,
        }),
    ))
}

async fn pending_requests_handler(
    State(state): State<Arc<PromoState>>,
    headers: HeaderMap,
    Path(restaurant_id): Path<String>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let actor = authenticate(&state, &headers)?;
    state
        .manager
        .pending_requests(&actor, &restaurant_id)
        .map(Json)
        .map_err(api_error)
}

async fn approve_handler(
    State(state): State<Arc<PromoState>>,
    headers: HeaderMap,
    Path((restaurant_id, post_id)): Path<(String, String)>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<ApprovedPromo>, ApiError> {
    let actor = authenticate(&state, &headers)?;
    require_restaurant(&actor, &restaurant_id)?;

    state
        .manager
        .approve(&post_id, &actor, request)
        .map(Json)
        .map_err(api_error)
}

async fn reject_handler(
    State(state): State<Arc<PromoState>>,
    headers: HeaderMap,
    Path((restaurant_id, post_id)): Path<(String, String)>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let actor = authenticate(&state, &headers)?;
    require_restaurant(&actor, &restaurant_id)?;

    let post = state.manager.reject(&post_id, &actor).map_err(api_error)?;
    Ok(Json(DecisionResponse {
        post_id: post.id,
        promotion_status: post.promotion_status,
    }))
}

async fn redeem_handler(
    State(state): State<Arc<PromoState>>,
    headers: HeaderMap,
    Path(restaurant_id): Path<String>,
    Json(request): Json<RedeemRequest>,
) -> Result<Json<RedeemOutcome>, ApiError> {
    let actor = authenticate(&state, &headers)?;
    state
        .manager
        .redeem(&restaurant_id, &actor, request)
        .map(Json)
        .map_err(api_error)
}

async fn decode_handler(
    State(state): State<Arc<PromoState>>,
    headers: HeaderMap,
    Json(request): Json<DecodeRequest>,
) -> Result<Json<PromoDisplay>, ApiError> {
    let actor = authenticate(&state, &headers)?;
    state
        .manager
        .decode_for_display(&actor, &request.promo_code_encrypted)
        .map(Json)
        .map_err(api_error)
}

async fn foodie_ledgers_handler(
    State(state): State<Arc<PromoState>>,
    headers: HeaderMap,
    Path(foodie_id): Path<String>,
) -> Result<Json<Vec<LoyaltyLedger>>, ApiError> {
    let actor = authenticate(&state, &headers)?;
    state
        .manager
        .foodie_ledgers(&actor, &foodie_id)
        .map(Json)
        .map_err(api_error)
}

async fn restaurant_ledgers_handler(
    State(state): State<Arc<PromoState>>,
    headers: HeaderMap,
    Path(restaurant_id): Path<String>,
) -> Result<Json<Vec<LoyaltyLedger>>, ApiError> {
    let actor = authenticate(&state, &headers)?;
    state
        .manager
        .restaurant_ledgers(&actor, &restaurant_id)
        .map(Json)
        .map_err(api_error)
}
