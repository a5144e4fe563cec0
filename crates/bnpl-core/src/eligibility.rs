//! # Eligibility Policy
//!
//! Decides whether this payment method is offered for a given order. Pure
//! functions, no side effects: the caller supplies the mode, amount bounds
//! and test-mode IP allowlist from its configuration.

use crate::order::Order;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Run mode of the payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Test,
    Production,
}

impl Mode {
    pub fn is_test(&self) -> bool {
        matches!(self, Mode::Test)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Test => write!(f, "TEST"),
            Mode::Production => write!(f, "PRODUCTION"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TEST" => Ok(Mode::Test),
            "PRODUCTION" => Ok(Mode::Production),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Parse the newline-separated allowed-IP list from configuration.
/// Entries are trimmed; blank lines are dropped.
pub fn parse_allowed_ips(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Whether the payment method may be offered for this order.
///
/// In test mode the caller's IP must appear in the allowlist (exact match,
/// or a `*` wildcard entry). The order total must be strictly positive and
/// inside the configured bounds; a zero bound means no bound on that side.
/// Amounts are minor units in the order's currency.
pub fn is_eligible(
    order: &Order,
    client_ip: &str,
    mode: Mode,
    min_amount: i64,
    max_amount: i64,
    allowed_ips: &[String],
) -> bool {
    if mode.is_test() {
        let allowed = allowed_ips
            .iter()
            .any(|ip| ip == client_ip || ip == "*");
        if !allowed {
            return false;
        }
    }

    let total = order.total.amount;

    total > 0
        && (min_amount <= 0 || total >= min_amount)
        && (max_amount <= 0 || total <= max_amount)
}
