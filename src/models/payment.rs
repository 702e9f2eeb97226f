//! Checkout session and payment confirmation payloads.

use serde::{Deserialize, Serialize};

/// Request body for `/create-checkout-session`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub product_id: String,
    pub product_name: String,
    pub buyer_email: String,
    pub quantity: u32,
    pub order_price: f64,
}

/// Hosted checkout the buyer is sent to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Result of `/payment-success` once the provider redirected back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub transaction_id: String,
    #[serde(default)]
    pub tracking_id: String,
}
