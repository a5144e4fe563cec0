//! # Payment Error Types
//!
//! Typed error handling for the checkout bridge.
//! All payment operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all payment operations.
///
/// Rejection, denial and not-found are expected outcomes of the
/// reconciliation protocol and are modeled here rather than as panics or
/// generic faults. Variants carry the order reference when one was resolved,
/// so callers can decide between an order-specific and a generic failure
/// page.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing access key, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The asynchronous callback arrived without a correlation token
    #[error("Payment token missing from callback")]
    MissingToken,

    /// No order matches the callback's correlation token
    #[error("No order found for the payment token")]
    OrderNotFound,

    /// The provider signaled failure in the return itself (no capture made)
    #[error("Payment was not completed")]
    PaymentRejected { order_id: String },

    /// Capture returned a non-approved status; the order has been cancelled
    #[error("Payment denied: {reason}")]
    PaymentDenied { order_id: String, reason: String },

    /// Transport or protocol error talking to the payment provider
    #[error("Gateway error: {message}")]
    Gateway {
        order_id: Option<String>,
        message: String,
    },

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// The order this failure refers to, when one could be resolved.
    ///
    /// `MissingToken` and `OrderNotFound` are anonymous: no order state was
    /// touched and the caller must fall back to a generic failure page.
    pub fn order_id(&self) -> Option<&str> {
        match self {
            PaymentError::PaymentRejected { order_id }
            | PaymentError::PaymentDenied { order_id, .. } => Some(order_id),
            PaymentError::Gateway { order_id, .. } => order_id.as_deref(),
            _ => None,
        }
    }

    /// Attach an order reference to a gateway error resolved later.
    pub fn with_order_id(self, id: impl Into<String>) -> Self {
        match self {
            PaymentError::Gateway { message, .. } => PaymentError::Gateway {
                order_id: Some(id.into()),
                message,
            },
            other => other,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Configuration(_) => 500,
            PaymentError::MissingToken => 400,
            PaymentError::OrderNotFound => 404,
            PaymentError::PaymentRejected { .. } => 402,
            PaymentError::PaymentDenied { .. } => 402,
            PaymentError::Gateway { .. } => 502,
            PaymentError::Internal(_) => 500,
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_presence() {
        assert_eq!(PaymentError::MissingToken.order_id(), None);
        assert_eq!(PaymentError::OrderNotFound.order_id(), None);

        let denied = PaymentError::PaymentDenied {
            order_id: "ord-1".into(),
            reason: "DECLINED".into(),
        };
        assert_eq!(denied.order_id(), Some("ord-1"));

        let gateway = PaymentError::Gateway {
            order_id: None,
            message: "timeout".into(),
        };
        assert_eq!(gateway.order_id(), None);
        assert_eq!(gateway.with_order_id("ord-2").order_id(), Some("ord-2"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PaymentError::MissingToken.status_code(), 400);
        assert_eq!(PaymentError::OrderNotFound.status_code(), 404);
        assert_eq!(
            PaymentError::PaymentDenied {
                order_id: "x".into(),
                reason: "DECLINED".into()
            }
            .status_code(),
            402
        );
        assert_eq!(
            PaymentError::Gateway {
                order_id: None,
                message: "boom".into()
            }
            .status_code(),
            502
        );
    }

    #[test]
    fn test_with_order_id_leaves_other_variants_alone() {
        let err = PaymentError::OrderNotFound.with_order_id("ord-9");
        assert!(matches!(err, PaymentError::OrderNotFound));
    }
}
