//! # bnpl-core
//!
//! Core types and protocol components for a redirect-based "buy now, pay
//! later" checkout integration.
//!
//! This crate provides:
//! - `Order`, `LineItem`, `Money` for the platform order data this flow reads
//! - `PaymentGateway` and `OrderRepository` trait seams toward the provider
//!   and the host platform
//! - `CheckoutInitiator` for opening a hosted-checkout session
//! - `ReturnReconciler`, the state machine behind the asynchronous return
//! - `is_eligible` for offering (or hiding) the payment method per order
//! - `PaymentError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use bnpl_core::{CheckoutInitiator, ReturnReconciler, MemoryOrderStore};
//!
//! let initiator = CheckoutInitiator::new(orders.clone(), gateway.clone());
//! let target = initiator
//!     .initiate(&order_id, &access_key, &confirm_url, &cancel_url)
//!     .await?;
//! // Redirect the customer to target.checkout_url.
//!
//! // Later, when the provider redirects back:
//! let reconciler = ReturnReconciler::new(orders, gateway, observer);
//! let order_id = reconciler.reconcile(token.as_deref(), hint.as_deref()).await?;
//! ```

pub mod checkout;
pub mod eligibility;
pub mod error;
pub mod event;
pub mod gateway;
pub mod money;
pub mod order;
pub mod reconcile;
pub mod repository;

// Re-exports for convenience
pub use checkout::{CheckoutInitiator, RedirectTarget};
pub use eligibility::{is_eligible, parse_allowed_ips, Mode};
pub use error::{PaymentError, PaymentResult};
pub use event::{LoggingObserver, NullObserver, OrderPaid, PaymentObserver, SharedObserver};
pub use gateway::{
    CheckoutSession, Consumer, Contact, PaymentGateway, SessionItem, SessionRequest,
    SharedGateway,
};
pub use money::{Currency, Money};
pub use order::{Address, Customer, LineItem, Order, PaymentStatus};
pub use reconcile::{ReturnReconciler, CAPTURE_APPROVED, STATUS_HINT_SUCCESS};
pub use repository::{MemoryOrderStore, OrderRepository, SharedOrderRepository};
