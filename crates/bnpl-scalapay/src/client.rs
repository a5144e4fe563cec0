//! # Scalapay API Client
//!
//! Implementation of the Scalapay v2 merchant API: order (session) creation
//! and payment capture. The customer pays on Scalapay's hosted page; this
//! client only opens the session and later asks for its final status.

use crate::config::ScalapayConfig;
use crate::sanitize::sanitize_api_error;
use async_trait::async_trait;
use bnpl_core::{
    CheckoutSession, Money, PaymentError, PaymentGateway, PaymentResult, SessionRequest,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Scalapay gateway
///
/// Holds the merchant credentials and a pooled HTTP client with a bounded
/// timeout; a timed-out call surfaces as a gateway error, never as partial
/// order state.
pub struct ScalapayGateway {
    config: ScalapayConfig,
    client: Client,
}

impl ScalapayGateway {
    /// Create a new gateway from a config
    pub fn new(config: ScalapayConfig) -> PaymentResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaymentError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PaymentResult<Self> {
        Self::new(ScalapayConfig::from_env()?)
    }

    pub fn config(&self) -> &ScalapayConfig {
        &self.config
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> PaymentResult<String> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .json(body)
            .send()
            .await
            .map_err(|e| PaymentError::Gateway {
                order_id: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| PaymentError::Gateway {
            order_id: None,
            message: e.to_string(),
        })?;

        if !status.is_success() {
            error!("Scalapay API error: status={}, body={}", status, text);

            // Prefer the provider's own message when the body is structured
            if let Ok(err) = serde_json::from_str::<ScalapayErrorResponse>(&text) {
                if let Some(message) = err.message {
                    return Err(PaymentError::Gateway {
                        order_id: None,
                        message,
                    });
                }
            }

            return Err(PaymentError::Gateway {
                order_id: None,
                message: format!("HTTP {status}: {text}"),
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl PaymentGateway for ScalapayGateway {
    #[instrument(skip(self, request), fields(reference = %request.merchant_reference))]
    async fn create_session(&self, request: &SessionRequest) -> PaymentResult<CheckoutSession> {
        let payload = OrderPayload::from_request(request);

        debug!(
            "Creating Scalapay order: {} items, total={}",
            payload.items.len(),
            request.total_amount.display()
        );

        let body = self.post_json("/v2/orders", &payload).await?;

        let created: CreateOrderResponse =
            serde_json::from_str(&body).map_err(|e| PaymentError::Gateway {
                order_id: None,
                message: format!("unparseable create-order response: {e}"),
            })?;

        info!(
            "Created Scalapay order: token={}, url={}",
            created.token, created.checkout_url
        );

        Ok(CheckoutSession {
            token: created.token,
            checkout_url: created.checkout_url,
        })
    }

    #[instrument(skip(self, token))]
    async fn capture_session(&self, token: &str) -> PaymentResult<String> {
        let body = self
            .post_json("/v2/payments/capture", &CaptureRequest { token })
            .await?;

        let captured: CaptureResponse =
            serde_json::from_str(&body).map_err(|e| PaymentError::Gateway {
                order_id: None,
                message: format!("unparseable capture response: {e}"),
            })?;

        debug!("Scalapay capture status: {}", captured.status);

        Ok(captured.status)
    }

    fn provider_name(&self) -> &'static str {
        "scalapay"
    }

    fn sanitize_error(&self, message: &str) -> String {
        sanitize_api_error(message)
    }
}

// =============================================================================
// Scalapay API Types
// =============================================================================

#[derive(Debug, Serialize)]
struct WireMoney {
    amount: String,
    currency: String,
}

impl WireMoney {
    fn from_money(money: Money) -> Self {
        Self {
            amount: money.wire_amount(),
            currency: money.currency.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireConsumer {
    email: String,
    given_names: String,
    surname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireContact {
    name: String,
    line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    line2: Option<String>,
    suburb: String,
    postcode: String,
    country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
struct WireItem {
    name: String,
    sku: String,
    quantity: u32,
    price: WireMoney,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDiscount {
    display_name: String,
    amount: WireMoney,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireMerchantOptions {
    redirect_confirm_url: String,
    redirect_cancel_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderPayload {
    total_amount: WireMoney,
    consumer: WireConsumer,
    billing: WireContact,
    shipping: WireContact,
    items: Vec<WireItem>,
    discounts: Vec<WireDiscount>,
    shipping_amount: WireMoney,
    tax_amount: WireMoney,
    merchant: WireMerchantOptions,
    merchant_reference: String,
}

impl OrderPayload {
    fn from_request(request: &SessionRequest) -> Self {
        Self {
            total_amount: WireMoney::from_money(request.total_amount),
            consumer: WireConsumer {
                email: request.consumer.email.clone(),
                given_names: request.consumer.given_names.clone(),
                surname: request.consumer.surname.clone(),
                phone_number: request.consumer.phone_number.clone(),
            },
            billing: WireContact::from_contact(&request.billing),
            shipping: WireContact::from_contact(&request.shipping),
            items: request
                .items
                .iter()
                .map(|item| WireItem {
                    name: item.name.clone(),
                    sku: item.sku.clone(),
                    quantity: item.quantity,
                    price: WireMoney::from_money(item.price),
                })
                .collect(),
            discounts: vec![WireDiscount {
                display_name: "Discount".to_string(),
                amount: WireMoney::from_money(request.discount_amount),
            }],
            shipping_amount: WireMoney::from_money(request.shipping_amount),
            tax_amount: WireMoney::from_money(request.tax_amount),
            merchant: WireMerchantOptions {
                redirect_confirm_url: request.redirect_confirm_url.clone(),
                redirect_cancel_url: request.redirect_cancel_url.clone(),
            },
            merchant_reference: request.merchant_reference.clone(),
        }
    }
}

impl WireContact {
    fn from_contact(contact: &bnpl_core::Contact) -> Self {
        Self {
            name: contact.name.clone(),
            line1: contact.line1.clone(),
            line2: contact.line2.clone(),
            suburb: contact.suburb.clone(),
            postcode: contact.postcode.clone(),
            country_code: contact.country_code.clone(),
            phone_number: contact.phone_number.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderResponse {
    token: String,
    checkout_url: String,
    #[serde(default)]
    #[allow(dead_code)]
    expires: Option<String>,
}

#[derive(Debug, Serialize)]
struct CaptureRequest<'a> {
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    #[serde(default)]
    #[allow(dead_code)]
    token: Option<String>,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ScalapayErrorResponse {
    #[serde(default)]
    message: Option<String>,
}
