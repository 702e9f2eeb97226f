use reqwest::Method;
use tracing::{debug, instrument};

use super::{ApiClient, ClientError};
use crate::models::{CheckoutRequest, CheckoutSession, PaymentConfirmation};

impl ApiClient {
    /// Open a hosted checkout for a pay-first booking
    #[instrument(skip(self, request), fields(product = %request.product_id))]
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ClientError> {
        self.post(&["create-checkout-session"], request).await
    }

    /// Confirm a payment once the provider redirected back with its session id
    #[instrument(skip(self))]
    pub async fn confirm_payment(&self, session_id: &str) -> Result<PaymentConfirmation, ClientError> {
        debug!(path = "/payment-success", "PATCH");
        self.execute_json(
            self.request(Method::PATCH, &["payment-success"])
                .query(&[("session_id", session_id)]),
        )
        .await
    }
}
