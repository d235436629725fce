//! Observable events
//!
//! Every log line emitted by the service names one of these events.

use std::fmt;

/// Observable events in foodcircle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & lifecycle
    /// Startup begins
    BootStart,
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Promo keyring resolved
    KeyringLoaded,
    /// Server bound and serving
    Serving,
    /// Startup failed (FATAL)
    BootFailed,

    // Promotion lifecycle
    /// Post submitted (promotion or not)
    PostSubmitted,
    /// Post submitted with a promotion request
    PromoRequested,
    /// Restaurant approved a request and a code was minted
    PromoApproved,
    /// Restaurant rejected a request
    PromoRejected,
    /// Approve/reject lost the status compare-and-swap
    PromoTransitionDenied,

    // Redemption
    /// Code redeemed and redemption recorded
    PromoRedeemed,
    /// Redemption refused (invalid, mismatched, expired)
    RedemptionRejected,
    /// Loyalty points accrued on a ledger
    PointsAccrued,

    // Access
    /// Principal acted on a resource it does not own
    AccessDenied,
    /// Store call failed
    StoreFailure,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "FOODCIRCLE_STARTUP_BEGIN",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::KeyringLoaded => "PROMO_KEYRING_LOADED",
            Event::Serving => "FOODCIRCLE_SERVING",
            Event::BootFailed => "FOODCIRCLE_STARTUP_FAILED",

            Event::PostSubmitted => "POST_SUBMITTED",
            Event::PromoRequested => "PROMO_REQUESTED",
            Event::PromoApproved => "PROMO_APPROVED",
            Event::PromoRejected => "PROMO_REJECTED",
            Event::PromoTransitionDenied => "PROMO_TRANSITION_DENIED",

            Event::PromoRedeemed => "PROMO_REDEEMED",
            Event::RedemptionRejected => "REDEMPTION_REJECTED",
            Event::PointsAccrued => "LOYALTY_POINTS_ACCRUED",

            Event::AccessDenied => "ACCESS_DENIED",
            Event::StoreFailure => "STORE_FAILURE",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::BootFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
