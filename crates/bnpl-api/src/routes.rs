//! # Routes
//!
//! Axum router configuration for the checkout bridge.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Orders:
///   - POST /api/v1/orders - Register a platform order
///   - GET  /api/v1/orders/{order_id} - Get order by ID
///   - GET  /api/v1/orders/{order_id}/eligibility - Can this order pay with Scalapay?
///   - POST /api/v1/orders/{order_id}/checkout - Open a Scalapay checkout session
///
/// - Provider return:
///   - GET /scalapay/notification - Redirect target Scalapay sends the customer back to
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - allow all origins for now
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let order_routes = Router::new()
        .route("/orders", post(handlers::create_order))
        .route("/orders/{order_id}", get(handlers::get_order))
        .route(
            "/orders/{order_id}/eligibility",
            get(handlers::check_eligibility),
        )
        .route(
            "/orders/{order_id}/checkout",
            post(handlers::create_checkout),
        );

    // The provider return lives outside /api/v1: Scalapay redirects the
    // customer's browser here after the hosted flow
    let provider_routes = Router::new().route("/notification", get(handlers::notification));

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // API v1
        .nest("/api/v1", order_routes)
        // Provider return
        .nest("/scalapay", provider_routes)
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
