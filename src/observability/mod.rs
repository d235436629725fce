//! Observability for the promotion engine
//!
//! - Structured logging (JSON, one line per event)
//! - Typed lifecycle events
//! - Monotonic counters
//!
//! Observability is read-only: nothing here feeds back into control flow.
//!
//! ```ignore
//! use foodcircle::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::PromoApproved, &[("post_id", "p1")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}

/// Log a caller-side rejection at WARN
pub fn log_rejection(event: Event, reason: &str, fields: &[(&str, &str)]) {
    let mut all: Vec<(&str, &str)> = Vec::with_capacity(fields.len() + 1);
    all.push(("reason", reason));
    all.extend_from_slice(fields);
    Logger::warn(event.as_str(), &all);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // Verifies no panic
        log_event(Event::BootStart);
        log_event(Event::Serving);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::ConfigLoaded, &[("port", "8001")]);
        log_rejection(Event::RedemptionRejected, "expired", &[("post_id", "p1")]);
    }
}
