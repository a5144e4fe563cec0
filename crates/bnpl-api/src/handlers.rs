//! # Request Handlers
//!
//! Axum request handlers: order intake from the host platform, the
//! eligibility probe, checkout initiation, and the Scalapay return
//! notification that drives the reconciler.

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use bnpl_core::{
    is_eligible, Address, Currency, Customer, LineItem, Money, Order, PaymentError,
    RedirectTarget,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Order intake request from the host platform
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Merchant order reference
    pub reference: String,
    /// Currency for every amount in this request
    pub currency: Currency,
    pub customer: Customer,
    pub billing_address: Address,
    /// Defaults to the billing address
    #[serde(default)]
    pub shipping_address: Option<Address>,
    pub items: Vec<OrderItemRequest>,
    /// Tax part of the total, minor units
    #[serde(default)]
    pub tax: i64,
    /// Shipping cost, minor units
    #[serde(default)]
    pub shipping: i64,
    /// Discount, minor units
    #[serde(default)]
    pub discount: i64,
}

/// Item in the order intake request
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    pub name: String,
    pub sku: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Unit price, minor units
    pub unit_price: i64,
}

fn default_quantity() -> u32 {
    1
}

/// Eligibility probe response
#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub eligible: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

fn payment_error_to_response(err: PaymentError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// First hop of X-Forwarded-For, or "unknown" when absent
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "scalapay-bridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Register a platform order with the bridge
#[instrument(skip(state, request), fields(reference = %request.reference, items = request.items.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), (StatusCode, Json<ErrorResponse>)> {
    if request.items.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Order has no items", 400)),
        ));
    }

    let currency = request.currency;
    let shipping_address = request
        .shipping_address
        .unwrap_or_else(|| request.billing_address.clone());

    let mut order = Order::new(
        request.reference,
        request.customer,
        request.billing_address,
        shipping_address,
        currency,
    );

    for item in request.items {
        order.add_item(LineItem::new(
            item.name,
            item.sku,
            item.quantity,
            Money::from_minor(item.unit_price, currency),
        ));
    }

    let order = order
        .with_tax(Money::from_minor(request.tax, currency))
        .with_shipping(Money::from_minor(request.shipping, currency))
        .with_discount(Money::from_minor(request.discount, currency));

    info!(order_id = %order.id, total = %order.total.display(), "order registered");

    state.orders.insert(order.clone()).await.map_err(payment_error_to_response)?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// Read an order back
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, (StatusCode, Json<ErrorResponse>)> {
    let order = state.orders.get(&order_id).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("Order not found: {order_id}"),
                404,
            )),
        )
    })?;

    Ok(Json(order))
}

/// Should the payment method be offered for this order?
#[instrument(skip(state, headers), fields(order_id = %order_id))]
pub async fn check_eligibility(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<EligibilityResponse>, (StatusCode, Json<ErrorResponse>)> {
    let order = state.orders.get(&order_id).await.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                format!("Order not found: {order_id}"),
                404,
            )),
        )
    })?;

    let eligible = is_eligible(
        &order,
        &client_ip(&headers),
        state.scalapay.mode,
        state.scalapay.min_amount,
        state.scalapay.max_amount,
        &state.scalapay.allowed_ips,
    );

    Ok(Json(EligibilityResponse { eligible }))
}

/// Open a Scalapay checkout session for the order
#[instrument(skip(state), fields(order_id = %order_id))]
pub async fn create_checkout(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<RedirectTarget>, (StatusCode, Json<ErrorResponse>)> {
    let cancel_url = state.order_failed_url(Some(&order_id), "You cancelled the payment");

    let target = state
        .initiator()
        .initiate(
            &order_id,
            &state.scalapay.access_key,
            &state.confirm_url(),
            &cancel_url,
        )
        .await
        .map_err(|e| {
            error!("failed to create checkout: {}", e);
            payment_error_to_response(e)
        })?;

    Ok(Json(target))
}

/// Query parameters of the provider's return redirect
#[derive(Debug, Deserialize)]
pub struct NotificationParams {
    #[serde(rename = "orderToken")]
    pub order_token: Option<String>,
    pub status: Option<String>,
}

/// Process the asynchronous return from Scalapay.
///
/// Always exits with a redirect: to the order-placed page on success, to the
/// order-failed page (order id or the `0` sentinel) with a sanitized message
/// otherwise.
#[instrument(skip(state, params))]
pub async fn notification(
    State(state): State<AppState>,
    Query(params): Query<NotificationParams>,
) -> Redirect {
    let result = state
        .reconciler()
        .reconcile(params.order_token.as_deref(), params.status.as_deref())
        .await;

    match result {
        Ok(order_id) => {
            info!(order_id = %order_id, "payment reconciled, sending customer to order-placed");
            Redirect::to(&state.order_placed_url(&order_id))
        }
        Err(err) => {
            error!("payment reconciliation failed: {}", err);
            let message = state.gateway.sanitize_error(&err.to_string());
            Redirect::to(&state.order_failed_url(err.order_id(), &message))
        }
    }
}
