// marketplace/core/src/models/cart.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::order::FulfillmentStatus;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Cart {
  pub id: Uuid,
  pub customer_id: Uuid,
  pub is_active: bool,
  /// Cached `sum(quantity * unit price)` over the current line items.
  pub total_price_cents: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn open(customer_id: Uuid) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      customer_id,
      is_active: true,
      total_price_cents: 0,
      created_at: now,
      updated_at: now,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct CartItem {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub status: FulfillmentStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl CartItem {
  pub fn new(cart_id: Uuid, product_id: Uuid, quantity: i32) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      cart_id,
      product_id,
      quantity,
      status: FulfillmentStatus::Pending,
      created_at: now,
      updated_at: now,
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartDetails {
  #[serde(flatten)]
  pub cart: Cart,
  pub items: Vec<CartItem>,
}
