//! # Order Types
//!
//! The platform order as seen by this payment method. Orders are owned by
//! the host e-commerce platform; this subsystem reads their customer,
//! address and amount data, and writes back only the correlation token and
//! the payment status.

use crate::money::{Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting payment
    NotPaid,
    /// Payment confirmed
    Paid,
    /// Payment refused or abandoned
    Cancelled,
    /// Paid, then refunded (terminal)
    Refunded,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::NotPaid
    }
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::NotPaid)
    }
}

/// The customer placing the order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Mobile number preferred; falls back to the landline on the address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A billing or delivery address on the order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub postcode: String,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Address {
    /// Full contact name as the provider expects it
    pub fn contact_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A line item in an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name (denormalized for display)
    pub name: String,

    /// Product sale element reference
    pub sku: String,

    /// Quantity
    pub quantity: u32,

    /// Unit price
    pub unit_price: Money,
}

impl LineItem {
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        Self {
            name: name.into(),
            sku: sku.into(),
            quantity,
            unit_price,
        }
    }

    /// Total price for this line item
    pub fn total(&self) -> Money {
        Money {
            amount: self.unit_price.amount * self.quantity as i64,
            currency: self.unit_price.currency,
        }
    }
}

/// An order to be paid through the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID (generated)
    pub id: String,

    /// Merchant reference shown to the provider and in logs
    pub reference: String,

    /// Customer placing the order
    pub customer: Customer,

    /// Invoice address
    pub billing_address: Address,

    /// Delivery address
    pub shipping_address: Address,

    /// Line items
    pub line_items: Vec<LineItem>,

    /// Order total, taxes included
    pub total: Money,

    /// Tax part of the total
    pub tax: Money,

    /// Shipping cost
    pub shipping: Money,

    /// Discount applied to the order
    pub discount: Money,

    /// Payment status
    #[serde(default)]
    pub payment_status: PaymentStatus,

    /// Correlation token issued by the gateway when a checkout session is
    /// created; used to re-find the order when the provider calls back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_token: Option<String>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with a generated ID and zero amounts
    pub fn new(
        reference: impl Into<String>,
        customer: Customer,
        billing_address: Address,
        shipping_address: Address,
        currency: Currency,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            reference: reference.into(),
            customer,
            billing_address,
            shipping_address,
            line_items: Vec::new(),
            total: Money::zero(currency),
            tax: Money::zero(currency),
            shipping: Money::zero(currency),
            discount: Money::zero(currency),
            payment_status: PaymentStatus::NotPaid,
            gateway_token: None,
            created_at: Utc::now(),
        }
    }

    /// Add a line item, keeping the total in sync
    pub fn add_item(&mut self, item: LineItem) {
        self.total.amount += item.total().amount;
        self.line_items.push(item);
    }

    /// Builder: set tax amount
    pub fn with_tax(mut self, tax: Money) -> Self {
        self.tax = tax;
        self
    }

    /// Builder: set shipping amount (added to the total)
    pub fn with_shipping(mut self, shipping: Money) -> Self {
        self.total.amount += shipping.amount;
        self.shipping = shipping;
        self
    }

    /// Builder: set discount amount (subtracted from the total)
    pub fn with_discount(mut self, discount: Money) -> Self {
        self.total.amount -= discount.amount;
        self.discount = discount;
        self
    }

    pub fn currency(&self) -> Currency {
        self.total.currency
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.is_paid()
    }

    /// Check if order is empty
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Get item count
    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|i| i.quantity).sum()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn customer() -> Customer {
        Customer {
            email: "jane.doe@example.com".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            phone: Some("+33600000000".into()),
        }
    }

    pub fn address() -> Address {
        Address {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            line1: "1 rue de la Paix".into(),
            line2: None,
            city: "Paris".into(),
            postcode: "75002".into(),
            country_code: "FR".into(),
            phone: Some("+33100000000".into()),
        }
    }

    pub fn order_with_total(total_minor: i64) -> Order {
        let mut order = Order::new(
            "REF-0001",
            customer(),
            address(),
            address(),
            Currency::EUR,
        );
        order.add_item(LineItem::new(
            "Widget",
            "WID-1",
            1,
            Money::from_minor(total_minor, Currency::EUR),
        ));
        order
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_line_item_total() {
        let item = LineItem::new("Widget", "WID-1", 3, Money::new(10.0, Currency::EUR));
        assert_eq!(item.total().amount, 3000);
    }

    #[test]
    fn test_order_totals() {
        let mut order = Order::new("REF-1", customer(), address(), address(), Currency::EUR);

        order.add_item(LineItem::new("A", "SKU-A", 2, Money::new(10.0, Currency::EUR)));
        order.add_item(LineItem::new("B", "SKU-B", 1, Money::new(25.0, Currency::EUR)));

        assert_eq!(order.total.amount, 4500);
        assert_eq!(order.item_count(), 3);

        let order = order
            .with_shipping(Money::new(5.0, Currency::EUR))
            .with_discount(Money::new(10.0, Currency::EUR));

        assert_eq!(order.total.amount, 4000);
    }

    #[test]
    fn test_payment_status() {
        let mut order = order_with_total(5000);
        assert!(!order.is_paid());
        assert!(!order.payment_status.is_terminal());

        order.payment_status = PaymentStatus::Paid;
        assert!(order.is_paid());
        assert!(order.payment_status.is_terminal());
    }

    #[test]
    fn test_contact_name() {
        assert_eq!(address().contact_name(), "Jane Doe");
    }
}
