//! # bnpl-scalapay
//!
//! Scalapay gateway for the checkout bridge.
//!
//! Scalapay is a "buy now, pay later" provider with a hosted checkout page:
//! the merchant creates an order session, redirects the customer, and the
//! provider redirects back with a token that must be captured to learn the
//! authoritative payment status.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bnpl_scalapay::{ScalapayConfig, ScalapayGateway};
//! use bnpl_core::{PaymentGateway, SessionRequest};
//!
//! let gateway = ScalapayGateway::from_env()?;
//!
//! let session = gateway.create_session(&request).await?;
//! // Redirect the customer to session.checkout_url; keep session.token.
//!
//! // After the provider redirects back:
//! let status = gateway.capture_session(&session.token).await?;
//! assert_eq!(status, "APPROVED");
//! ```

pub mod client;
pub mod config;
pub mod sanitize;

// Re-exports
pub use client::ScalapayGateway;
pub use config::{ScalapayConfig, PRODUCTION_URI, SANDBOX_URI};
pub use sanitize::{sanitize_api_error, GENERIC_TECHNICAL_ERROR};
