//! Loyalty Concurrency Tests
//!
//! Redemptions racing on the same ledger key must never lose an update,
//! and racing decisions on one request must produce exactly one winner.

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::Utc;

use foodcircle::auth::Principal;
use foodcircle::codec::{PromoCodec, PromoKey, KEY_LEN};
use foodcircle::promo::{
    ApproveRequest, Post, PostDraft, PromoError, PromotionManager, RedeemRequest,
};
use foodcircle::store::{InMemoryPromoStore, PromoStore};

const THREADS: usize = 8;
const REDEMPTIONS_PER_THREAD: usize = 25;

fn shared_manager() -> Arc<PromotionManager<InMemoryPromoStore>> {
    Arc::new(PromotionManager::new(
        InMemoryPromoStore::new(),
        PromoCodec::with_key(PromoKey::from_bytes([3u8; KEY_LEN])),
    ))
}

fn seed_request(m: &PromotionManager<InMemoryPromoStore>, post_id: &str) {
    let mut post = Post::from_draft(
        "f1",
        PostDraft {
            caption: "katsu".to_string(),
            restaurant_tagged_id: Some("r1".to_string()),
            is_promotion_request: true,
            ..Default::default()
        },
        Utc::now(),
    );
    post.id = post_id.to_string();
    m.store().insert_post(&post).unwrap();
}

fn approval(text: &str) -> ApproveRequest {
    ApproveRequest {
        promo_code_plain_text: text.to_string(),
        offer_description: "free drink".to_string(),
        expiry_date: None,
    }
}

/// Test: N concurrent redemptions on one ledger yield exactly 10 * N points.
#[test]
fn test_concurrent_redemptions_never_lose_points() {
    let m = shared_manager();
    seed_request(&m, "p1");
    let code = m
        .approve("p1", &Principal::restaurant("r1"), approval("SAVE10"))
        .unwrap()
        .encrypted_code;

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let m = Arc::clone(&m);
            let barrier = Arc::clone(&barrier);
            let code = code.clone();
            thread::spawn(move || {
                let r1 = Principal::restaurant("r1");
                barrier.wait();
                for _ in 0..REDEMPTIONS_PER_THREAD {
                    m.redeem(
                        "r1",
                        &r1,
                        RedeemRequest {
                            promo_code_encrypted: code.clone(),
                            redeemer_user_id: format!("u{}", t),
                        },
                    )
                    .unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let total = THREADS * REDEMPTIONS_PER_THREAD;
    let ledger = m.store().get_ledger("r1", "f1").unwrap().unwrap();
    assert_eq!(ledger.points, 10 * total as u64);
    assert_eq!(ledger.transactions.len(), total);

    let promo = m.store().find_promo_code_by_post("p1").unwrap().unwrap();
    assert_eq!(promo.redemptions.len(), total);

    // Exactly one ledger exists for the pair
    assert_eq!(m.store().ledgers_for_foodie("f1").unwrap().len(), 1);
}

/// Test: Racing approvals of one request mint exactly one code.
#[test]
fn test_racing_approvals_have_one_winner() {
    let m = shared_manager();
    seed_request(&m, "p1");

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let m = Arc::clone(&m);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let actor = Principal::restaurant("r1");
                if t % 2 == 0 {
                    m.approve("p1", &actor, approval(&format!("CODE{}", t)))
                        .map(|_| ())
                } else {
                    m.reject("p1", &actor).map(|_| ())
                }
            })
        })
        .collect();

    let results: Vec<Result<(), PromoError>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, PromoError::InvalidTransition(_))));

    let post = m.store().get_post("p1").unwrap().unwrap();
    let minted = m.store().find_promo_code_by_post("p1").unwrap();
    match post.promo_code_id {
        Some(id) => assert_eq!(minted.map(|p| p.id), Some(id)),
        None => assert!(minted.is_none()),
    }
}
