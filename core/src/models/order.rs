// marketplace/core/src/models/order.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType}; // Renamed Type to SqlxType to avoid conflict
use uuid::Uuid;

use super::cart::CartItem;

// Matches the `fulfillment_status` enum type in the initial migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "fulfillment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
  Pending,
  Shipped,
  Delivered,
  Cancelled,
}

impl FulfillmentStatus {
  pub const ALL: [FulfillmentStatus; 4] = [
    FulfillmentStatus::Pending,
    FulfillmentStatus::Shipped,
    FulfillmentStatus::Delivered,
    FulfillmentStatus::Cancelled,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      FulfillmentStatus::Pending => "pending",
      FulfillmentStatus::Shipped => "shipped",
      FulfillmentStatus::Delivered => "delivered",
      FulfillmentStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for FulfillmentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "invalid status '{}', it should be one of: pending, shipped, delivered, cancelled",
      self.0
    )
  }
}

impl FromStr for FulfillmentStatus {
  type Err = UnknownStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    FulfillmentStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| UnknownStatus(s.to_string()))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub total_amount_cents: i64,
  pub ordered_date: DateTime<Utc>,
  // Set at placement and independent of the per-line-item status.
  pub status: FulfillmentStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Payment {
  pub id: Uuid,
  pub order_id: Uuid,
  pub total_amount_cents: i64,
  pub paid: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ShippingInfo {
  pub id: Uuid,
  pub order_id: Uuid,
  pub address: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// An order together with the records it owns, as returned to callers.
/// Sellers receive `items` filtered to their own products.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<CartItem>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub payment: Option<Payment>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub shipping_info: Option<ShippingInfo>,
}
