//! # bnpl-api
//!
//! HTTP API layer for the Scalapay checkout bridge.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for order intake, eligibility and checkout
//! - The notification endpoint Scalapay redirects customers back to
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/orders` | Register a platform order |
//! | GET | `/api/v1/orders/:id` | Get order |
//! | GET | `/api/v1/orders/:id/eligibility` | Eligibility probe |
//! | POST | `/api/v1/orders/:id/checkout` | Open a checkout session |
//! | GET | `/scalapay/notification` | Provider return redirect |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
