//! # Order Repository Seam
//!
//! Lookup and mutation of platform orders. The host platform owns order
//! storage; this trait is the narrow surface the payment flow needs. The
//! in-memory store doubles as the reference implementation and the test
//! double.

use crate::error::{PaymentError, PaymentResult};
use crate::order::{Order, PaymentStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Order lookup and status transitions.
///
/// `store_token` and the status transitions are each atomic single-field
/// updates. `mark_paid` is a compare-and-set: concurrent callbacks for the
/// same token cannot both perform the Paid transition.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fetch an order by its identifier.
    async fn get(&self, order_id: &str) -> Option<Order>;

    /// Resolve the order whose stored correlation token matches.
    async fn find_by_token(&self, token: &str) -> Option<Order>;

    /// Store a new order.
    async fn insert(&self, order: Order) -> PaymentResult<()>;

    /// Store the correlation token on the order, overwriting any prior
    /// token (a new checkout attempt replaces the previous session).
    async fn store_token(&self, order_id: &str, token: &str) -> PaymentResult<()>;

    /// Transition the order to Paid. Returns `false` without touching the
    /// order when it is already paid.
    async fn mark_paid(&self, order_id: &str) -> PaymentResult<bool>;

    /// Transition the order to Cancelled. Paid is terminal: a paid order is
    /// left untouched.
    async fn mark_cancelled(&self, order_id: &str) -> PaymentResult<()>;
}

/// Type alias for a shared repository (dynamic dispatch)
pub type SharedOrderRepository = Arc<dyn OrderRepository>;

/// In-memory order store.
///
/// A single `RwLock` over the map serializes status transitions, giving the
/// per-order single-writer guarantee without per-order locks.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_order<T>(
        &self,
        order_id: &str,
        f: impl FnOnce(&mut Order) -> T,
    ) -> PaymentResult<T> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| PaymentError::Internal("order store lock poisoned".into()))?;

        match orders.get_mut(order_id) {
            Some(order) => Ok(f(order)),
            None => Err(PaymentError::OrderNotFound),
        }
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderStore {
    async fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.read().ok()?.get(order_id).cloned()
    }

    async fn find_by_token(&self, token: &str) -> Option<Order> {
        self.orders
            .read()
            .ok()?
            .values()
            .find(|o| o.gateway_token.as_deref() == Some(token))
            .cloned()
    }

    async fn insert(&self, order: Order) -> PaymentResult<()> {
        let mut orders = self
            .orders
            .write()
            .map_err(|_| PaymentError::Internal("order store lock poisoned".into()))?;
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    async fn store_token(&self, order_id: &str, token: &str) -> PaymentResult<()> {
        self.with_order(order_id, |order| {
            order.gateway_token = Some(token.to_string());
        })
    }

    async fn mark_paid(&self, order_id: &str) -> PaymentResult<bool> {
        self.with_order(order_id, |order| {
            if order.payment_status.is_paid() {
                false
            } else {
                order.payment_status = PaymentStatus::Paid;
                true
            }
        })
    }

    async fn mark_cancelled(&self, order_id: &str) -> PaymentResult<()> {
        self.with_order(order_id, |order| {
            if !order.payment_status.is_paid() {
                order.payment_status = PaymentStatus::Cancelled;
            }
        })
    }
}
