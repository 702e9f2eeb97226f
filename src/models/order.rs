//! Orders, their status history and carrier tracking events.

use serde::{Deserialize, Serialize};

use super::PaymentOption;

/// Approval state of an order as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Delivered,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "approved" => Ok(OrderStatus::Approved),
            "rejected" => Ok(OrderStatus::Rejected),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            "delivered" => Ok(OrderStatus::Delivered),
            other => Err(format!("Unknown order status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    #[serde(other)]
    Unknown,
}

/// Entry of the server-recorded status history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Production / carrier tracking event added by a manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Production stages a manager picks from when adding a tracking event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingStage {
    CuttingCompleted,
    SewingStarted,
    Finishing,
    QcChecked,
    Packed,
    Shipped,
    OutForDelivery,
}

impl TrackingStage {
    pub fn label(&self) -> &'static str {
        match self {
            TrackingStage::CuttingCompleted => "Cutting Completed",
            TrackingStage::SewingStarted => "Sewing Started",
            TrackingStage::Finishing => "Finishing",
            TrackingStage::QcChecked => "QC Checked",
            TrackingStage::Packed => "Packed",
            TrackingStage::Shipped => "Shipped",
            TrackingStage::OutForDelivery => "Out for Delivery",
        }
    }

    pub fn all() -> [TrackingStage; 7] {
        [
            TrackingStage::CuttingCompleted,
            TrackingStage::SewingStarted,
            TrackingStage::Finishing,
            TrackingStage::QcChecked,
            TrackingStage::Packed,
            TrackingStage::Shipped,
            TrackingStage::OutForDelivery,
        ]
    }
}

/// A product line within a multi-product order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub product_name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub tracking_id: String,
    pub buyer_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<OrderLine>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub order_price: f64,
    pub payment_option: PaymentOption,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
    #[serde(default)]
    pub tracking: Vec<TrackingEvent>,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub additional_notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Order {
    /// Line items, whether the server sent a single product or a list
    pub fn line_items(&self) -> Vec<OrderLine> {
        if !self.products.is_empty() {
            return self.products.clone();
        }
        match &self.product_name {
            Some(name) => vec![OrderLine {
                product_id: self.product_id.clone(),
                product_name: name.clone(),
                quantity: self.quantity,
                price: None,
            }],
            None => Vec::new(),
        }
    }

    /// Short product label for tables
    pub fn product_label(&self) -> String {
        let lines = self.line_items();
        match lines.len() {
            0 => "-".to_string(),
            1 => lines[0].product_name.clone(),
            n => format!("{} (+{} more)", lines[0].product_name, n - 1),
        }
    }

    /// Buyers may only cancel orders nobody has acted on yet
    pub fn is_cancellable(&self) -> bool {
        self.status == OrderStatus::Pending
    }
}

/// Booking payload sent when a buyer places an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub product_id: String,
    pub product_name: String,
    pub buyer_email: String,
    pub first_name: String,
    pub last_name: String,
    pub quantity: u32,
    pub order_price: f64,
    pub payment_option: PaymentOption,
    pub contact_number: String,
    pub delivery_address: String,
    pub additional_notes: String,
}

/// Status change sent by a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_json(extra: &str) -> String {
        format!(
            r#"{{"_id":"o1","trackingId":"TRK-1","buyerEmail":"b@example.com",
                "paymentOption":"Cash on Delivery"{}}}"#,
            extra
        )
    }

    #[test]
    fn test_single_product_order_line_items() {
        let order: Order =
            serde_json::from_str(&order_json(r#","productName":"Polo Shirt","quantity":120"#))
                .unwrap();
        let lines = order.line_items();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 120);
        assert_eq!(order.product_label(), "Polo Shirt");
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.is_cancellable());
    }

    #[test]
    fn test_multi_product_order_label() {
        let order: Order = serde_json::from_str(&order_json(
            r#","products":[{"productName":"Cap","quantity":10},{"productName":"Hoodie","quantity":5}]"#,
        ))
        .unwrap();
        assert_eq!(order.line_items().len(), 2);
        assert_eq!(order.product_label(), "Cap (+1 more)");
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let order: Order =
            serde_json::from_str(&order_json(r#","status":"on-hold""#)).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert!(!order.is_cancellable());
    }
}
