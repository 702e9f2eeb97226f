//! Wire records exchanged with the order platform's REST API.
//!
//! These are plain data carriers. The server is authoritative for every field;
//! the client never reconciles or re-validates what it receives.

pub mod dashboard;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use dashboard::*;
pub use order::*;
pub use payment::*;
pub use product::*;
pub use user::*;

use serde::{Deserialize, Serialize};

/// How a buyer settles an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentOption {
    /// Cash / pay on delivery
    #[serde(rename = "Cash on Delivery", alias = "cod", alias = "pay-on-delivery")]
    PayOnDelivery,
    /// Upfront online payment before fulfillment
    #[serde(rename = "PayFirst", alias = "pay-first", alias = "stripe")]
    PayFirst,
}

impl PaymentOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentOption::PayOnDelivery => "Cash on Delivery",
            PaymentOption::PayFirst => "PayFirst",
        }
    }

    /// Whether a checkout session has to be opened before the order is placed
    pub fn requires_checkout(&self) -> bool {
        matches!(self, PaymentOption::PayFirst)
    }
}

impl std::fmt::Display for PaymentOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}
