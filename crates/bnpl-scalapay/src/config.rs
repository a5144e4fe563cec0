//! # Scalapay Configuration
//!
//! Configuration for the Scalapay integration. Secrets are loaded from
//! environment variables; the API base URI follows the run mode.

use bnpl_core::{parse_allowed_ips, Mode, PaymentError};
use std::env;

/// Scalapay production API
pub const PRODUCTION_URI: &str = "https://api.scalapay.com";

/// Scalapay integration/sandbox API
pub const SANDBOX_URI: &str = "https://integration.api.scalapay.com";

/// Scalapay API configuration
#[derive(Debug, Clone)]
pub struct ScalapayConfig {
    /// Run mode; test mode targets the sandbox API and enables IP filtering
    pub mode: Mode,

    /// Merchant access key (bearer credential)
    pub access_key: String,

    /// IPs allowed to use the method in test mode (`*` = everyone)
    pub allowed_ips: Vec<String>,

    /// Minimum order total in minor units (0 = no minimum)
    pub min_amount: i64,

    /// Maximum order total in minor units (0 = no maximum)
    pub max_amount: i64,

    /// API base URL (overridable for testing/mocking)
    pub api_base_url: String,

    /// Request timeout for gateway calls
    pub timeout_secs: u64,
}

impl ScalapayConfig {
    /// Create a config with explicit mode and key; the base URI is derived
    /// from the mode.
    pub fn new(mode: Mode, access_key: impl Into<String>) -> Self {
        let api_base_url = match mode {
            Mode::Test => SANDBOX_URI,
            Mode::Production => PRODUCTION_URI,
        };

        Self {
            mode,
            access_key: access_key.into(),
            allowed_ips: Vec::new(),
            min_amount: 0,
            max_amount: 0,
            api_base_url: api_base_url.to_string(),
            timeout_secs: 30,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `SCALAPAY_MODE` (`TEST` or `PRODUCTION`)
    /// - `SCALAPAY_ACCESS_KEY`
    ///
    /// Optional:
    /// - `SCALAPAY_ALLOWED_IPS` (newline-separated, test mode only)
    /// - `SCALAPAY_MIN_AMOUNT` / `SCALAPAY_MAX_AMOUNT` (minor units, 0 = unbounded)
    pub fn from_env() -> Result<Self, PaymentError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mode: Mode = env::var("SCALAPAY_MODE")
            .map_err(|_| PaymentError::Configuration("SCALAPAY_MODE not set".to_string()))?
            .parse()
            .map_err(PaymentError::Configuration)?;

        let access_key = env::var("SCALAPAY_ACCESS_KEY").map_err(|_| {
            PaymentError::Configuration("SCALAPAY_ACCESS_KEY not set".to_string())
        })?;

        if access_key.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "SCALAPAY_ACCESS_KEY must not be empty".to_string(),
            ));
        }

        let allowed_ips = env::var("SCALAPAY_ALLOWED_IPS")
            .map(|raw| parse_allowed_ips(&raw))
            .unwrap_or_default();

        let min_amount = parse_amount_var("SCALAPAY_MIN_AMOUNT")?;
        let max_amount = parse_amount_var("SCALAPAY_MAX_AMOUNT")?;

        let mut config = Self::new(mode, access_key);
        config.allowed_ips = allowed_ips;
        config.min_amount = min_amount;
        config.max_amount = max_amount;
        Ok(config)
    }

    /// Check if targeting the sandbox
    pub fn is_test_mode(&self) -> bool {
        self.mode.is_test()
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set the test-mode IP allowlist
    pub fn with_allowed_ips(mut self, ips: Vec<String>) -> Self {
        self.allowed_ips = ips;
        self
    }

    /// Builder: set amount bounds in minor units
    pub fn with_amount_bounds(mut self, min: i64, max: i64) -> Self {
        self.min_amount = min;
        self.max_amount = max;
        self
    }
}

fn parse_amount_var(name: &str) -> Result<i64, PaymentError> {
    match env::var(name) {
        Err(_) => Ok(0),
        Ok(raw) => raw.trim().parse().map_err(|_| {
            PaymentError::Configuration(format!("{name} must be an integer amount in minor units"))
        }),
    }
}
