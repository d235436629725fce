//! Promotion counters
//!
//! Counters only, monotonic, reset on process start.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for the promotion engine.
///
/// Relaxed ordering is enough: counters are observed, never branched on.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    posts_submitted: AtomicU64,
    promo_requests: AtomicU64,
    codes_minted: AtomicU64,
    requests_rejected: AtomicU64,
    transitions_denied: AtomicU64,
    redemptions: AtomicU64,
    redemptions_rejected: AtomicU64,
    points_awarded: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_posts_submitted(&self) {
        self.posts_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_promo_requests(&self) {
        self.promo_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_codes_minted(&self) {
        self.codes_minted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_requests_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transitions_denied(&self) {
        self.transitions_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_redemptions(&self) {
        self.redemptions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_redemptions_rejected(&self) {
        self.redemptions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Add to the total of loyalty points handed out
    pub fn add_points_awarded(&self, points: u64) {
        self.points_awarded.fetch_add(points, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            posts_submitted: self.posts_submitted.load(Ordering::Relaxed),
            promo_requests: self.promo_requests.load(Ordering::Relaxed),
            codes_minted: self.codes_minted.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            transitions_denied: self.transitions_denied.load(Ordering::Relaxed),
            redemptions: self.redemptions.load(Ordering::Relaxed),
            redemptions_rejected: self.redemptions_rejected.load(Ordering::Relaxed),
            points_awarded: self.points_awarded.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`MetricsRegistry`], serialized by the `/metrics` route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub posts_submitted: u64,
    pub promo_requests: u64,
    pub codes_minted: u64,
    pub requests_rejected: u64,
    pub transitions_denied: u64,
    pub redemptions: u64,
    pub redemptions_rejected: u64,
    pub points_awarded: u64,
}
