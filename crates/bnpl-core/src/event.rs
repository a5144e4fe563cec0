//! # Payment Events
//!
//! Typed events raised by the reconciler, consumed by an injected observer
//! instead of a global event bus. The surrounding system hooks confirmation
//! email dispatch onto `OrderPaid`.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Raised exactly once per order, when the Paid transition happens
#[derive(Debug, Clone)]
pub struct OrderPaid {
    pub order_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl OrderPaid {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Observer for downstream consumers (confirmation email, fulfilment, ...)
pub trait PaymentObserver: Send + Sync {
    fn order_paid(&self, event: &OrderPaid);
}

/// Type alias for a shared observer (dynamic dispatch)
pub type SharedObserver = Arc<dyn PaymentObserver>;

/// Default observer: logs the event for the mail dispatcher to pick up
pub struct LoggingObserver;

impl PaymentObserver for LoggingObserver {
    fn order_paid(&self, event: &OrderPaid) {
        info!(
            order_id = %event.order_id,
            "order paid, dispatching confirmation email"
        );
    }
}

/// Observer that ignores everything (tests)
pub struct NullObserver;

impl PaymentObserver for NullObserver {
    fn order_paid(&self, _event: &OrderPaid) {}
}
