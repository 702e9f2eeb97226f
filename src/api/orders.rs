use tracing::instrument;

use super::{ApiClient, ClientError};
use crate::forms;
use crate::models::{Order, OrderInput, OrderStatus, OrderStatusUpdate, TrackingEvent};

impl ApiClient {
    /// Place a booking
    #[instrument(skip(self, input), fields(product = %input.product_id, quantity = input.quantity))]
    pub async fn create_order(&self, input: &OrderInput) -> Result<Order, ClientError> {
        self.post(&["orders"], input).await
    }

    /// Orders placed by one buyer
    #[instrument(skip(self))]
    pub async fn my_orders(&self, buyer_email: &str) -> Result<Vec<Order>, ClientError> {
        self.get(&["orders"], &[("buyerEmail", buyer_email.to_string())])
            .await
    }

    /// Every order, optionally narrowed to one status
    #[instrument(skip(self))]
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, ClientError> {
        let query: Vec<(&str, String)> = status
            .map(|s| vec![("status", s.to_string())])
            .unwrap_or_default();
        self.get(&["orders"], &query).await
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: &str) -> Result<Order, ClientError> {
        self.get(&["orders", id], &[]).await
    }

    #[instrument(skip(self))]
    pub async fn approve_order(&self, id: &str) -> Result<(), ClientError> {
        self.set_order_status(id, OrderStatus::Approved).await
    }

    #[instrument(skip(self))]
    pub async fn reject_order(&self, id: &str) -> Result<(), ClientError> {
        self.set_order_status(id, OrderStatus::Rejected).await
    }

    async fn set_order_status(&self, id: &str, status: OrderStatus) -> Result<(), ClientError> {
        self.patch_ack(
            &["orders", id, "status"],
            &OrderStatusUpdate { status },
        )
        .await
    }

    /// Append a production/carrier tracking event
    #[instrument(skip(self, event), fields(status = %event.status))]
    pub async fn add_tracking(&self, id: &str, event: &TrackingEvent) -> Result<(), ClientError> {
        forms::validate_tracking_update(&event.status, event.location.as_deref())?;
        self.post_ack(&["orders", id, "tracking"], event)
            .await
    }

    /// Cancel an order. The server refuses once it left the pending state.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&["orders", id]).await
    }
}
