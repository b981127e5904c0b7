// marketplace/core/src/services/payments.rs

//! Admin reads over all orders and the payment flag.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::orders::{full_details, OrderService, ORDER_NOT_FOUND};
use crate::error::{MarketError, MarketResult};
use crate::models::{OrderDetails, Payment, ShippingInfo};

impl OrderService {
  pub async fn all_orders(&self) -> MarketResult<Vec<OrderDetails>> {
    let mut tx = self.store.begin().await?;
    let orders = tx.list_orders().await?;
    if orders.is_empty() {
      return Err(MarketError::not_found("No orders found"));
    }

    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
      details.push(full_details(tx.as_mut(), order).await?);
    }
    Ok(details)
  }

  pub async fn order(&self, order_id: Uuid) -> MarketResult<OrderDetails> {
    let mut tx = self.store.begin().await?;
    let order = tx
      .find_order(order_id)
      .await?
      .ok_or_else(|| MarketError::not_found(ORDER_NOT_FOUND))?;
    full_details(tx.as_mut(), order).await
  }

  pub async fn shipping_info(&self, order_id: Uuid) -> MarketResult<ShippingInfo> {
    let mut tx = self.store.begin().await?;
    if tx.find_order(order_id).await?.is_none() {
      return Err(MarketError::not_found(ORDER_NOT_FOUND));
    }
    let shipping_info = tx.find_shipping_info_for_order(order_id).await?;
    shipping_info.ok_or_else(|| MarketError::not_found("Shipping info not found"))
  }

  pub async fn payment(&self, order_id: Uuid) -> MarketResult<Payment> {
    let mut tx = self.store.begin().await?;
    if tx.find_order(order_id).await?.is_none() {
      return Err(MarketError::not_found(ORDER_NOT_FOUND));
    }
    let payment = tx.find_payment_for_order(order_id).await?;
    payment.ok_or_else(|| MarketError::not_found("Payment not found"))
  }

  /// Unconditionally overwrites the paid flag.
  #[instrument(name = "payments::set_payment_status", skip(self), fields(order_id = %order_id))]
  pub async fn set_payment_status(&self, order_id: Uuid, paid: bool) -> MarketResult<Payment> {
    let mut tx = self.store.begin().await?;
    if tx.find_order(order_id).await?.is_none() {
      return Err(MarketError::not_found(ORDER_NOT_FOUND));
    }
    let mut payment = tx
      .find_payment_for_order(order_id)
      .await?
      .ok_or_else(|| MarketError::not_found("Payment not found"))?;

    payment.paid = paid;
    payment.updated_at = Utc::now();
    tx.update_payment(&payment).await?;
    tx.commit().await?;

    info!(payment_id = %payment.id, "Payment status updated.");
    Ok(payment)
  }
}
