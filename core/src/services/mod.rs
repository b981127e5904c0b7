// marketplace/core/src/services/mod.rs

//! Domain services. Each public operation runs as a single storage
//! transaction; shared deletion and pricing procedures take the open
//! transaction so callers can compose them.

pub mod cart;
pub mod catalog;
pub mod fulfillment;
pub mod identity;
pub mod orders;
pub mod payments;

use crate::error::{MarketError, MarketResult};

pub use cart::CartService;
pub use catalog::CatalogService;
pub use identity::IdentityService;
pub use orders::OrderService;

/// `quantity × unit price` in cents, refusing to overflow.
pub(crate) fn line_total(quantity: i32, price_cents: i64) -> MarketResult<i64> {
  i64::from(quantity)
    .checked_mul(price_cents)
    .ok_or_else(|| MarketError::BadRequest("Line total is too large".to_string()))
}

pub(crate) fn add_cents(total: i64, amount: i64) -> MarketResult<i64> {
  total
    .checked_add(amount)
    .ok_or_else(|| MarketError::BadRequest("Total is too large".to_string()))
}
