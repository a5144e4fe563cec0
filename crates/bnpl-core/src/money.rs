//! # Money Types
//!
//! Monetary amounts for the checkout bridge. Amounts are stored in the
//! smallest currency unit; every amount carries its currency code explicitly.

use serde::{Deserialize, Serialize};

/// Supported currencies (ISO 4217), limited to the markets Scalapay serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    EUR,
    USD,
    GBP,
    CHF,
}

impl Currency {
    /// Returns the ISO 4217 currency code
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::EUR => "EUR",
            Currency::USD => "USD",
            Currency::GBP => "GBP",
            Currency::CHF => "CHF",
        }
    }

    /// Number of decimal places for this currency
    pub fn decimal_places(&self) -> u8 {
        2
    }

    /// Convert a decimal amount to the smallest currency unit
    pub fn to_minor_unit(&self, amount: f64) -> i64 {
        let multiplier = 10_f64.powi(self.decimal_places() as i32);
        (amount * multiplier).round() as i64
    }

    /// Convert from smallest unit back to decimal
    pub fn from_minor_unit(&self, amount: i64) -> f64 {
        let divisor = 10_f64.powi(self.decimal_places() as i32);
        amount as f64 / divisor
    }
}

impl Default for Currency {
    fn default() -> Self {
        Currency::EUR
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A monetary amount in the smallest currency unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in smallest currency unit (cents for EUR)
    pub amount: i64,
    /// Currency
    pub currency: Currency,
}

impl Money {
    /// Create a new amount from a decimal value
    pub fn new(amount: f64, currency: Currency) -> Self {
        Self {
            amount: currency.to_minor_unit(amount),
            currency,
        }
    }

    /// Create an amount from the smallest unit (cents)
    pub fn from_minor(amount: i64, currency: Currency) -> Self {
        Self { amount, currency }
    }

    /// Zero in the given currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: 0,
            currency,
        }
    }

    /// Get the decimal amount
    pub fn as_decimal(&self) -> f64 {
        self.currency.from_minor_unit(self.amount)
    }

    /// Decimal string as the provider's wire format expects ("12.34")
    pub fn wire_amount(&self) -> String {
        format!("{:.1$}", self.as_decimal(), self.currency.decimal_places() as usize)
    }

    /// Format for display (e.g., "12.34 EUR")
    pub fn display(&self) -> String {
        format!("{} {}", self.wire_amount(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_unit_conversion() {
        let eur = Currency::EUR;
        assert_eq!(eur.to_minor_unit(10.99), 1099);
        assert_eq!(eur.from_minor_unit(1099), 10.99);
    }

    #[test]
    fn test_wire_amount() {
        let price = Money::new(29.9, Currency::EUR);
        assert_eq!(price.wire_amount(), "29.90");

        let whole = Money::from_minor(5000, Currency::EUR);
        assert_eq!(whole.wire_amount(), "50.00");
    }

    #[test]
    fn test_display() {
        let price = Money::new(12.34, Currency::EUR);
        assert_eq!(price.display(), "12.34 EUR");
    }

    #[test]
    fn test_zero() {
        let z = Money::zero(Currency::EUR);
        assert_eq!(z.amount, 0);
        assert_eq!(z.wire_amount(), "0.00");
    }
}
