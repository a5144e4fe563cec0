//! # Payment Gateway Seam
//!
//! The trait every provider implementation fulfils, plus the
//! provider-neutral session request assembled from an order. The concrete
//! Scalapay client lives in the `bnpl-scalapay` crate.

use crate::error::PaymentResult;
use crate::money::Money;
use crate::order::Order;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The consumer paying through the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumer {
    pub email: String,
    pub given_names: String,
    pub surname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// A billing or shipping contact as the provider expects it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    /// Locality ("suburb" in the provider's vocabulary)
    pub suburb: String,
    pub postcode: String,
    /// ISO 3166-1 alpha-2
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl Contact {
    fn from_address(address: &crate::order::Address) -> Self {
        Self {
            name: address.contact_name(),
            line1: address.line1.clone(),
            line2: address.line2.clone(),
            suburb: address.city.clone(),
            postcode: address.postcode.clone(),
            country_code: address.country_code.clone(),
            phone_number: address.phone.clone(),
        }
    }
}

/// A line item in the session request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionItem {
    pub name: String,
    pub sku: String,
    pub quantity: u32,
    pub price: Money,
}

/// The full remote-session payload sent to the provider.
///
/// Every monetary field carries the order's currency; nothing is inferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub consumer: Consumer,
    pub billing: Contact,
    pub shipping: Contact,
    pub items: Vec<SessionItem>,
    pub total_amount: Money,
    pub tax_amount: Money,
    pub shipping_amount: Money,
    pub discount_amount: Money,
    pub merchant_reference: String,
    /// Where the provider redirects the customer after the hosted flow
    pub redirect_confirm_url: String,
    /// Where the provider redirects on customer cancellation
    pub redirect_cancel_url: String,
}

impl SessionRequest {
    /// Assemble the request from an order.
    ///
    /// The consumer phone falls back from the customer record to the billing
    /// address, matching what the storefront collects.
    pub fn from_order(order: &Order, confirm_url: &str, cancel_url: &str) -> Self {
        let phone = order
            .customer
            .phone
            .clone()
            .or_else(|| order.billing_address.phone.clone());

        Self {
            consumer: Consumer {
                email: order.customer.email.clone(),
                given_names: order.customer.first_name.clone(),
                surname: order.customer.last_name.clone(),
                phone_number: phone,
            },
            billing: Contact::from_address(&order.billing_address),
            shipping: Contact::from_address(&order.shipping_address),
            items: order
                .line_items
                .iter()
                .map(|item| SessionItem {
                    name: item.name.clone(),
                    sku: item.sku.clone(),
                    quantity: item.quantity,
                    price: item.unit_price,
                })
                .collect(),
            total_amount: order.total,
            tax_amount: order.tax,
            shipping_amount: order.shipping,
            discount_amount: order.discount,
            merchant_reference: order.reference.clone(),
            redirect_confirm_url: confirm_url.to_string(),
            redirect_cancel_url: cancel_url.to_string(),
        }
    }
}

/// A checkout session created by the provider.
///
/// Ephemeral: consumed once to redirect the customer; only the token
/// survives, stored on the order as the correlation token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Opaque token issued by the gateway
    pub token: String,

    /// URL to redirect the customer to for payment
    pub checkout_url: String,
}

/// Core trait for payment provider implementations.
///
/// `create_session` opens a hosted-checkout session for an order;
/// `capture_session` later asks for the authoritative final status of that
/// session. Both are bounded network calls; timeouts surface as gateway
/// errors, never as partial order state.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a remote payment session and return its token and redirect URL.
    async fn create_session(&self, request: &SessionRequest) -> PaymentResult<CheckoutSession>;

    /// Fetch the authoritative status of a previously created session.
    ///
    /// Returns the provider's status string (e.g. "APPROVED").
    async fn capture_session(&self, token: &str) -> PaymentResult<String>;

    /// Provider name (for logging)
    fn provider_name(&self) -> &'static str;

    /// Rewrite a provider error message before it is shown to the customer.
    ///
    /// Providers whose errors may contain raw transport dumps override this;
    /// the default passes the message through verbatim.
    fn sanitize_error(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type SharedGateway = Arc<dyn PaymentGateway>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Currency, Money};
    use crate::order::fixtures::*;
    use crate::order::LineItem;

    #[test]
    fn test_session_request_from_order() {
        let mut order = order_with_total(5000);
        order.add_item(LineItem::new(
            "Gadget",
            "GAD-1",
            2,
            Money::from_minor(1500, Currency::EUR),
        ));

        let request = SessionRequest::from_order(
            &order,
            "https://shop.example.com/scalapay/notification",
            "https://shop.example.com/order/failed/1",
        );

        assert_eq!(request.consumer.email, "jane.doe@example.com");
        assert_eq!(request.consumer.given_names, "Jane");
        assert_eq!(request.billing.name, "Jane Doe");
        assert_eq!(request.billing.suburb, "Paris");
        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[1].quantity, 2);
        assert_eq!(request.total_amount.amount, 8000);
        assert_eq!(request.total_amount.currency, Currency::EUR);
        assert_eq!(request.merchant_reference, "REF-0001");
    }

    #[test]
    fn test_consumer_phone_falls_back_to_billing() {
        let mut order = order_with_total(1000);
        order.customer.phone = None;

        let request = SessionRequest::from_order(&order, "https://c", "https://x");
        assert_eq!(request.consumer.phone_number.as_deref(), Some("+33100000000"));
    }

    #[test]
    fn test_every_amount_carries_the_order_currency() {
        let order = order_with_total(2500);
        let request = SessionRequest::from_order(&order, "https://c", "https://x");

        for money in [
            request.total_amount,
            request.tax_amount,
            request.shipping_amount,
            request.discount_amount,
        ] {
            assert_eq!(money.currency, order.currency());
        }
    }
}
