//! # Checkout Initiation
//!
//! Builds the remote session request from an order, calls the gateway and
//! persists the correlation token. The order is mutated only after the
//! gateway succeeds; a failed call leaves no partial state behind.

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::{SessionRequest, SharedGateway};
use crate::repository::SharedOrderRepository;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Where to send the customer next
#[derive(Debug, Clone, Serialize)]
pub struct RedirectTarget {
    pub order_id: String,
    /// The provider's hosted checkout page
    pub checkout_url: String,
}

/// Runs during checkout submission; produces the redirect to the provider's
/// hosted page.
pub struct CheckoutInitiator {
    orders: SharedOrderRepository,
    gateway: SharedGateway,
}

impl CheckoutInitiator {
    pub fn new(orders: SharedOrderRepository, gateway: SharedGateway) -> Self {
        Self { orders, gateway }
    }

    /// Create a remote payment session for the order.
    ///
    /// Fails fast with a configuration error when the access credential is
    /// empty; no remote call is attempted in that case. On gateway failure
    /// the error message is sanitized before being surfaced, and the order
    /// keeps whatever token it had. The failure is not retried here.
    #[instrument(skip(self, access_key, confirm_url, cancel_url), fields(order_id = %order_id))]
    pub async fn initiate(
        &self,
        order_id: &str,
        access_key: &str,
        confirm_url: &str,
        cancel_url: &str,
    ) -> PaymentResult<RedirectTarget> {
        if access_key.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "payment method access key is not set".into(),
            ));
        }

        let order = self
            .orders
            .get(order_id)
            .await
            .ok_or(PaymentError::OrderNotFound)?;

        let request = SessionRequest::from_order(&order, confirm_url, cancel_url);

        let session = match self.gateway.create_session(&request).await {
            Ok(session) => session,
            Err(err) => {
                warn!(order_id = %order.id, error = %err, "session creation failed");
                return Err(self.sanitized(err, &order.id));
            }
        };

        // Token write happens only on gateway success
        self.orders.store_token(&order.id, &session.token).await?;

        info!(
            order_id = %order.id,
            provider = self.gateway.provider_name(),
            "checkout session created"
        );

        Ok(RedirectTarget {
            order_id: order.id,
            checkout_url: session.checkout_url,
        })
    }

    fn sanitized(&self, err: PaymentError, order_id: &str) -> PaymentError {
        match err {
            PaymentError::Gateway { message, .. } => PaymentError::Gateway {
                order_id: Some(order_id.to_string()),
                message: self.gateway.sanitize_error(&message),
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{CheckoutSession, PaymentGateway};
    use crate::order::fixtures::order_with_total;
    use crate::repository::{MemoryOrderStore, OrderRepository};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StubGateway {
        fail: bool,
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn create_session(
            &self,
            _request: &SessionRequest,
        ) -> PaymentResult<CheckoutSession> {
            if self.fail {
                Err(PaymentError::Gateway {
                    order_id: None,
                    message: "HTTP/1.1 401 Unauthorized".into(),
                })
            } else {
                Ok(CheckoutSession {
                    token: "tok-1".into(),
                    checkout_url: "https://portal.example.com/checkout/tok-1".into(),
                })
            }
        }

        async fn capture_session(&self, _token: &str) -> PaymentResult<String> {
            unreachable!("initiation never captures")
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }

        fn sanitize_error(&self, message: &str) -> String {
            if message.contains("HTTP") {
                "technical error".into()
            } else {
                message.into()
            }
        }
    }

    fn initiator(fail: bool) -> (Arc<MemoryOrderStore>, CheckoutInitiator) {
        let store = Arc::new(MemoryOrderStore::new());
        let gateway = Arc::new(StubGateway { fail });
        let initiator = CheckoutInitiator::new(store.clone(), gateway);
        (store, initiator)
    }

    #[tokio::test]
    async fn test_empty_access_key_fails_without_remote_call() {
        let (_, initiator) = initiator(false);

        let err = initiator
            .initiate("any", "  ", "https://c", "https://x")
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_success_persists_token_and_returns_redirect() {
        let (store, initiator) = initiator(false);
        let order = order_with_total(5000);
        let id = order.id.clone();
        store.insert(order).await.unwrap();

        let target = initiator
            .initiate(&id, "qwerty", "https://c", "https://x")
            .await
            .unwrap();

        assert_eq!(target.order_id, id);
        assert_eq!(target.checkout_url, "https://portal.example.com/checkout/tok-1");
        assert_eq!(
            store.get(&id).await.unwrap().gateway_token.as_deref(),
            Some("tok-1")
        );
    }

    #[tokio::test]
    async fn test_failure_sanitizes_message_and_leaves_order_untouched() {
        let (store, initiator) = initiator(true);
        let order = order_with_total(5000);
        let id = order.id.clone();
        store.insert(order).await.unwrap();

        let err = initiator
            .initiate(&id, "qwerty", "https://c", "https://x")
            .await
            .unwrap_err();

        match err {
            PaymentError::Gateway { order_id, message } => {
                assert_eq!(order_id.as_deref(), Some(id.as_str()));
                assert_eq!(message, "technical error");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(store.get(&id).await.unwrap().gateway_token.is_none());
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let (_, initiator) = initiator(false);
        let err = initiator
            .initiate("missing", "qwerty", "https://c", "https://x")
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::OrderNotFound));
    }
}
