//! # Scalapay Bridge
//!
//! Payment bridge exposing Scalapay "pay in instalments" checkout to a
//! storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export SCALAPAY_MODE=TEST
//! export SCALAPAY_ACCESS_KEY=qwerty...
//! export FRONT_BASE_URL=https://shop.example.com
//!
//! # Run the server
//! scalapay-bridge
//! ```

use bnpl_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Scalapay mode: {}", state.scalapay.mode);
    info!("Scalapay API: {}", state.scalapay.api_base_url);

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Scalapay bridge starting on http://{}", addr);

    if !is_prod {
        info!("Health: GET http://{}/health", addr);
        info!("Checkout: POST http://{}/api/v1/orders/{{id}}/checkout", addr);
        info!("Return: GET http://{}/scalapay/notification", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
