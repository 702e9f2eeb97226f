//! Per-role dashboard statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single point of a dashboard chart series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Counters returned by `/dashboard/{role}/stats`.
///
/// Each role sees a different subset, so every counter is optional and any
/// counter this client does not know about is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_products: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_orders: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_orders: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_orders: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivered_orders: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_users: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,
    #[serde(default)]
    pub chart: Vec<ChartPoint>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DashboardStats {
    /// Known counters as label/value rows, in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        let counters = [
            ("Products", self.total_products),
            ("Orders", self.total_orders),
            ("Pending", self.pending_orders),
            ("Approved", self.approved_orders),
            ("Delivered", self.delivered_orders),
            ("Users", self.total_users),
        ];
        for (label, value) in counters {
            if let Some(v) = value {
                rows.push((label, v.to_string()));
            }
        }
        if let Some(revenue) = self.total_revenue {
            rows.push(("Revenue", format!("{:.2}", revenue)));
        }
        rows
    }
}
