// marketplace/core/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub seller_id: Uuid, // Fixed at creation
  pub name: String,
  pub sku: String,
  pub description: String,
  pub price_cents: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
  pub name: String,
  pub sku: String,
  pub description: String,
  pub price_cents: Option<i64>, // Required, absent only in malformed input
}

#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
  pub name: Option<String>,
  pub sku: Option<String>,
  pub description: Option<String>,
  pub price_cents: Option<i64>,
}
