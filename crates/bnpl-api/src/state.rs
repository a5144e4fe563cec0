//! # Application State
//!
//! Shared state for the Axum application: the order store, the Scalapay
//! gateway, the payment-method configuration and the paid-order observer.

use bnpl_core::{
    CheckoutInitiator, LoggingObserver, MemoryOrderStore, ReturnReconciler, SharedGateway,
    SharedObserver, SharedOrderRepository,
};
use bnpl_scalapay::{ScalapayConfig, ScalapayGateway};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Base URL of this service, for the provider's return redirect
    pub base_url: String,
    /// Base URL of the storefront, for customer-facing redirects
    pub front_base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            front_base_url: std::env::var("FRONT_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Platform orders
    pub orders: SharedOrderRepository,
    /// Scalapay gateway
    pub gateway: SharedGateway,
    /// Payment-method configuration (mode, bounds, allowlist)
    pub scalapay: ScalapayConfig,
    /// Consumer of OrderPaid events
    pub observer: SharedObserver,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Wire the state from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let scalapay = ScalapayConfig::from_env()
            .map_err(|e| anyhow::anyhow!("failed to load Scalapay config: {e}"))?;
        let gateway = ScalapayGateway::new(scalapay.clone())
            .map_err(|e| anyhow::anyhow!("failed to initialize Scalapay gateway: {e}"))?;

        Ok(Self {
            orders: Arc::new(MemoryOrderStore::new()),
            gateway: Arc::new(gateway),
            scalapay,
            observer: Arc::new(LoggingObserver),
            config,
        })
    }

    /// Build the state from explicit collaborators (tests)
    pub fn with_collaborators(
        orders: SharedOrderRepository,
        gateway: SharedGateway,
        scalapay: ScalapayConfig,
        observer: SharedObserver,
        config: AppConfig,
    ) -> Self {
        Self {
            orders,
            gateway,
            scalapay,
            observer,
            config,
        }
    }

    pub fn initiator(&self) -> CheckoutInitiator {
        CheckoutInitiator::new(self.orders.clone(), self.gateway.clone())
    }

    pub fn reconciler(&self) -> ReturnReconciler {
        ReturnReconciler::new(
            self.orders.clone(),
            self.gateway.clone(),
            self.observer.clone(),
        )
    }

    /// Where the provider sends the customer back after the hosted flow
    pub fn confirm_url(&self) -> String {
        format!("{}/scalapay/notification", self.config.base_url)
    }

    /// Storefront page for a placed order
    pub fn order_placed_url(&self, order_id: &str) -> String {
        format!("{}/order/placed/{}", self.config.front_base_url, order_id)
    }

    /// Storefront failure page. `order_id` is `None` when no order could be
    /// resolved; the sentinel `0` tells the front to render a generic page.
    pub fn order_failed_url(&self, order_id: Option<&str>, message: &str) -> String {
        let base = format!(
            "{}/order/failed/{}",
            self.config.front_base_url,
            order_id.unwrap_or("0")
        );

        match url::Url::parse(&base) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("message", message);
                url.to_string()
            }
            // Front base URL is malformed; degrade to the unparameterized page
            Err(_) => base,
        }
    }
}
