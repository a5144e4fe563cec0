//! # Return Reconciliation
//!
//! Processes the asynchronous return from the provider: validates the
//! callback, captures the session for its authoritative status and drives
//! the order to a terminal state. Reconciliation is idempotent: an order
//! reaches Paid at most once through this flow, and re-delivered callbacks
//! for a paid order are a no-op success.

use crate::error::{PaymentError, PaymentResult};
use crate::event::{OrderPaid, SharedObserver};
use crate::gateway::SharedGateway;
use crate::repository::SharedOrderRepository;
use tracing::{info, instrument, warn};

/// Value of the callback's status hint when the provider reports success
pub const STATUS_HINT_SUCCESS: &str = "SUCCESS";

/// Capture status meaning the payment is confirmed
pub const CAPTURE_APPROVED: &str = "APPROVED";

/// The state machine behind the provider's return/notification callback.
pub struct ReturnReconciler {
    orders: SharedOrderRepository,
    gateway: SharedGateway,
    observer: SharedObserver,
}

impl ReturnReconciler {
    pub fn new(
        orders: SharedOrderRepository,
        gateway: SharedGateway,
        observer: SharedObserver,
    ) -> Self {
        Self {
            orders,
            gateway,
            observer,
        }
    }

    /// Reconcile one callback. Returns the order id on success.
    ///
    /// Failure semantics: `MissingToken` and `OrderNotFound` touch no order
    /// state; `PaymentRejected` and `PaymentDenied` finalize the order to
    /// Cancelled before surfacing; a gateway failure leaves the order as
    /// last observed. No retry happens here; re-delivery of the callback
    /// is the provider's business.
    #[instrument(skip(self), fields(provider = self.gateway.provider_name()))]
    pub async fn reconcile(
        &self,
        token: Option<&str>,
        status_hint: Option<&str>,
    ) -> PaymentResult<String> {
        let token = match token.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => {
                warn!("provider callback received without a token");
                return Err(PaymentError::MissingToken);
            }
        };

        let order = self.orders.find_by_token(token).await.ok_or_else(|| {
            warn!(token, "no order matches the callback token");
            PaymentError::OrderNotFound
        })?;

        // Idempotence guard: a paid order is done, no capture, no side
        // effects. Runs before the hint check so a stale or re-delivered
        // failure callback cannot touch an order that already reached Paid.
        if order.is_paid() {
            info!(order_id = %order.id, "order already paid, callback ignored");
            return Ok(order.id);
        }

        // The provider already signaled failure in the redirect itself:
        // finalize without contacting the gateway.
        if let Some(hint) = status_hint {
            if hint != STATUS_HINT_SUCCESS {
                info!(order_id = %order.id, hint, "payment rejected by provider redirect");
                self.orders.mark_cancelled(&order.id).await?;
                return Err(PaymentError::PaymentRejected { order_id: order.id });
            }
        }

        let status = match self.gateway.capture_session(token).await {
            Ok(status) => status,
            Err(err) => {
                // The order may have been paid through another channel while
                // the capture was in flight; re-read before failing.
                if let Some(current) = self.orders.get(&order.id).await {
                    if current.is_paid() {
                        return Ok(order.id);
                    }
                }
                return Err(err.with_order_id(order.id));
            }
        };

        if status == CAPTURE_APPROVED {
            let transitioned = self.orders.mark_paid(&order.id).await?;
            if transitioned {
                info!(order_id = %order.id, reference = %order.reference, "payment confirmed");
                self.observer.order_paid(&OrderPaid::new(&order.id));
            }
            Ok(order.id)
        } else {
            info!(order_id = %order.id, status, "payment denied by capture");
            self.orders.mark_cancelled(&order.id).await?;
            Err(PaymentError::PaymentDenied {
                order_id: order.id,
                reason: format!("Your payment was refused (reason: {status})"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{NullObserver, PaymentObserver};
    use crate::gateway::{CheckoutSession, PaymentGateway, SessionRequest};
    use crate::order::fixtures::order_with_total;
    use crate::order::PaymentStatus;
    use crate::repository::{MemoryOrderStore, OrderRepository};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    enum Capture {
        Status(&'static str),
        Fail,
    }

    struct StubGateway {
        capture: Capture,
        captures: AtomicUsize,
    }

    impl StubGateway {
        fn approving() -> Self {
            Self {
                capture: Capture::Status(CAPTURE_APPROVED),
                captures: AtomicUsize::new(0),
            }
        }

        fn with(capture: Capture) -> Self {
            Self {
                capture,
                captures: AtomicUsize::new(0),
            }
        }

        fn capture_calls(&self) -> usize {
            self.captures.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentGateway for StubGateway {
        async fn create_session(
            &self,
            _request: &SessionRequest,
        ) -> PaymentResult<CheckoutSession> {
            unreachable!("reconciliation never creates sessions")
        }

        async fn capture_session(&self, _token: &str) -> PaymentResult<String> {
            self.captures.fetch_add(1, Ordering::SeqCst);
            match self.capture {
                Capture::Status(s) => Ok(s.to_string()),
                Capture::Fail => Err(PaymentError::Gateway {
                    order_id: None,
                    message: "connection timed out".into(),
                }),
            }
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }
    }

    struct Recorder(AtomicUsize);

    impl PaymentObserver for Recorder {
        fn order_paid(&self, _event: &OrderPaid) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn store_with_order(token: Option<&str>) -> (Arc<MemoryOrderStore>, String) {
        let store = Arc::new(MemoryOrderStore::new());
        let order = order_with_total(5000);
        let id = order.id.clone();
        store.insert(order).await.unwrap();
        if let Some(token) = token {
            store.store_token(&id, token).await.unwrap();
        }
        (store, id)
    }

    fn reconciler(
        store: Arc<MemoryOrderStore>,
        gateway: Arc<StubGateway>,
    ) -> ReturnReconciler {
        ReturnReconciler::new(store, gateway, Arc::new(NullObserver))
    }

    #[tokio::test]
    async fn test_missing_token() {
        let (store, _) = store_with_order(None).await;
        let reconciler = reconciler(store, Arc::new(StubGateway::approving()));

        for token in [None, Some(""), Some("   ")] {
            let err = reconciler.reconcile(token, None).await.unwrap_err();
            assert!(matches!(err, PaymentError::MissingToken));
        }
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (store, _) = store_with_order(Some("tok-real")).await;
        let reconciler = reconciler(store, Arc::new(StubGateway::approving()));

        let err = reconciler.reconcile(Some("tok-1"), None).await.unwrap_err();
        assert!(matches!(err, PaymentError::OrderNotFound));
        assert_eq!(err.order_id(), None);
    }

    #[tokio::test]
    async fn test_approved_capture_marks_paid_and_notifies() {
        let (store, id) = store_with_order(Some("tok-2")).await;
        let gateway = Arc::new(StubGateway::approving());
        let observer = Arc::new(Recorder(AtomicUsize::new(0)));
        let reconciler =
            ReturnReconciler::new(store.clone(), gateway.clone(), observer.clone());

        let result = reconciler
            .reconcile(Some("tok-2"), Some(STATUS_HINT_SUCCESS))
            .await
            .unwrap();

        assert_eq!(result, id);
        assert!(store.get(&id).await.unwrap().is_paid());
        assert_eq!(gateway.capture_calls(), 1);
        assert_eq!(observer.0.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_paid_is_noop_success_without_capture() {
        let (store, id) = store_with_order(Some("tok-3")).await;
        store.mark_paid(&id).await.unwrap();

        let gateway = Arc::new(StubGateway::approving());
        let observer = Arc::new(Recorder(AtomicUsize::new(0)));
        let reconciler =
            ReturnReconciler::new(store.clone(), gateway.clone(), observer.clone());

        let result = reconciler.reconcile(Some("tok-3"), None).await.unwrap();

        assert_eq!(result, id);
        assert_eq!(gateway.capture_calls(), 0);
        assert_eq!(observer.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_declined_capture_cancels_and_denies() {
        let (store, id) = store_with_order(Some("tok-4")).await;
        let reconciler = reconciler(
            store.clone(),
            Arc::new(StubGateway::with(Capture::Status("DECLINED"))),
        );

        let err = reconciler.reconcile(Some("tok-4"), None).await.unwrap_err();

        match &err {
            PaymentError::PaymentDenied { order_id, reason } => {
                assert_eq!(order_id, &id);
                assert!(reason.contains("DECLINED"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(
            store.get(&id).await.unwrap().payment_status,
            PaymentStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_failure_hint_rejects_without_capture() {
        let (store, id) = store_with_order(Some("tok-5")).await;
        let gateway = Arc::new(StubGateway::approving());
        let reconciler = reconciler(store.clone(), gateway.clone());

        let err = reconciler
            .reconcile(Some("tok-5"), Some("FAILURE"))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::PaymentRejected { .. }));
        assert_eq!(err.order_id(), Some(id.as_str()));
        assert_eq!(gateway.capture_calls(), 0);
        assert_eq!(
            store.get(&id).await.unwrap().payment_status,
            PaymentStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn test_failure_hint_on_paid_order_is_noop_success() {
        // A stale or re-delivered callback may carry a failure hint for an
        // order that already reached Paid; Paid is terminal and stays.
        let (store, id) = store_with_order(Some("tok-8")).await;
        store.mark_paid(&id).await.unwrap();

        let gateway = Arc::new(StubGateway::approving());
        let reconciler = reconciler(store.clone(), gateway.clone());

        let result = reconciler
            .reconcile(Some("tok-8"), Some("FAILURE"))
            .await
            .unwrap();

        assert_eq!(result, id);
        assert_eq!(gateway.capture_calls(), 0);
        assert!(store.get(&id).await.unwrap().is_paid());
    }

    #[tokio::test]
    async fn test_gateway_failure_carries_order_reference() {
        let (store, id) = store_with_order(Some("tok-6")).await;
        let reconciler = reconciler(store.clone(), Arc::new(StubGateway::with(Capture::Fail)));

        let err = reconciler.reconcile(Some("tok-6"), None).await.unwrap_err();

        assert!(matches!(err, PaymentError::Gateway { .. }));
        assert_eq!(err.order_id(), Some(id.as_str()));
        // Order state is left as last observed
        assert_eq!(
            store.get(&id).await.unwrap().payment_status,
            PaymentStatus::NotPaid
        );
    }

    #[tokio::test]
    async fn test_capture_failure_after_out_of_band_payment_is_success() {
        // The order gets paid through another channel while capture fails:
        // the reconciler reports success instead of surfacing the error.
        struct PayThenFail {
            store: Arc<MemoryOrderStore>,
            order_id: String,
        }

        #[async_trait]
        impl PaymentGateway for PayThenFail {
            async fn create_session(
                &self,
                _request: &SessionRequest,
            ) -> PaymentResult<CheckoutSession> {
                unreachable!()
            }

            async fn capture_session(&self, _token: &str) -> PaymentResult<String> {
                self.store.mark_paid(&self.order_id).await.unwrap();
                Err(PaymentError::Gateway {
                    order_id: None,
                    message: "connection reset".into(),
                })
            }

            fn provider_name(&self) -> &'static str {
                "stub"
            }
        }

        let (store, id) = store_with_order(Some("tok-7")).await;
        let gateway = Arc::new(PayThenFail {
            store: store.clone(),
            order_id: id.clone(),
        });
        let reconciler = ReturnReconciler::new(store, gateway, Arc::new(NullObserver));

        let result = reconciler.reconcile(Some("tok-7"), None).await.unwrap();
        assert_eq!(result, id);
    }
}
