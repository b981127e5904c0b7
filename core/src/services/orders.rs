// marketplace/core/src/services/orders.rs

//! Order placement and the customer's view of their orders. Seller and
//! admin operations on orders live in `fulfillment` and `payments`.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::cart::priced_total;
use crate::auth::Role;
use crate::error::{MarketError, MarketResult};
use crate::models::{FulfillmentStatus, Order, OrderDetails, Payment, ShippingInfo};
use crate::store::{Store, StoreTx};
use crate::validation::FieldErrors;

pub(crate) const ORDER_NOT_FOUND: &str = "Order not found";

#[derive(Clone)]
pub struct OrderService {
  pub(crate) store: Arc<dyn Store>,
}

impl OrderService {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }

  /// Turns the customer's active cart into an order with its shipping and
  /// payment records and closes the cart. All or nothing.
  #[instrument(name = "orders::place_order", skip(self, address), fields(customer_id = %customer_id))]
  pub async fn place_order(&self, customer_id: Uuid, address: String) -> MarketResult<OrderDetails> {
    let mut errors = FieldErrors::new();
    errors.required("address", &address);
    errors.into_result()?;

    let mut tx = self.store.begin().await?;
    if !tx.lock_account(Role::Customer, customer_id).await? {
      return Err(MarketError::not_found("Customer not found"));
    }

    let mut cart = tx
      .find_active_cart(customer_id)
      .await?
      .ok_or_else(|| MarketError::not_found("Active cart not found"))?;
    if tx.find_order_for_cart(cart.id).await?.is_some() {
      warn!(cart_id = %cart.id, "Cart already has an order.");
      return Err(MarketError::conflict("There is an already placed order for this customer's cart"));
    }

    let items = tx.list_cart_items(cart.id).await?;
    if items.is_empty() {
      return Err(MarketError::not_found("No cart items found in the active cart"));
    }
    // Live prices; the cart's cached total is only advisory here.
    let total = priced_total(tx.as_mut(), &items).await?;

    let now = Utc::now();
    let order = Order {
      id: Uuid::new_v4(),
      cart_id: cart.id,
      total_amount_cents: total,
      ordered_date: now,
      status: FulfillmentStatus::Pending,
      created_at: now,
      updated_at: now,
    };
    let shipping_info = ShippingInfo {
      id: Uuid::new_v4(),
      order_id: order.id,
      address,
      created_at: now,
      updated_at: now,
    };
    let payment = Payment {
      id: Uuid::new_v4(),
      order_id: order.id,
      total_amount_cents: total,
      paid: false,
      created_at: now,
      updated_at: now,
    };

    tx.insert_order(&order).await?;
    tx.insert_shipping_info(&shipping_info).await?;
    tx.insert_payment(&payment).await?;

    cart.is_active = false;
    cart.total_price_cents = total;
    cart.updated_at = now;
    tx.update_cart(&cart).await?;
    tx.commit().await?;

    info!(order_id = %order.id, cart_id = %cart.id, total_cents = total, "Order placed.");
    Ok(OrderDetails {
      order,
      items,
      payment: Some(payment),
      shipping_info: Some(shipping_info),
    })
  }

  pub async fn customer_orders(&self, customer_id: Uuid) -> MarketResult<Vec<OrderDetails>> {
    let mut tx = self.store.begin().await?;
    let orders = tx.list_orders_for_customer(customer_id).await?;
    if orders.is_empty() {
      return Err(MarketError::not_found("No orders found for this customer"));
    }

    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
      details.push(full_details(tx.as_mut(), order).await?);
    }
    Ok(details)
  }

  pub async fn customer_order(&self, customer_id: Uuid, order_id: Uuid) -> MarketResult<OrderDetails> {
    let mut tx = self.store.begin().await?;
    let order = tx
      .find_order(order_id)
      .await?
      .ok_or_else(|| MarketError::not_found(ORDER_NOT_FOUND))?;
    let owned = tx
      .find_cart(order.cart_id)
      .await?
      .is_some_and(|cart| cart.customer_id == customer_id);
    if !owned {
      return Err(MarketError::not_found(ORDER_NOT_FOUND));
    }
    full_details(tx.as_mut(), order).await
  }
}

/// The order with every line item, its payment and shipping info.
pub(crate) async fn full_details(tx: &mut dyn StoreTx, order: Order) -> MarketResult<OrderDetails> {
  let items = tx.list_cart_items(order.cart_id).await?;
  let payment = tx.find_payment_for_order(order.id).await?;
  let shipping_info = tx.find_shipping_info_for_order(order.id).await?;
  Ok(OrderDetails {
    order,
    items,
    payment,
    shipping_info,
  })
}

/// Deletes an order with its payment and shipping info. The cart it was
/// placed from is left closed.
pub(crate) async fn remove_order(tx: &mut dyn StoreTx, order_id: Uuid) -> MarketResult<()> {
  tx.delete_payment_for_order(order_id).await?;
  tx.delete_shipping_info_for_order(order_id).await?;
  tx.delete_order(order_id).await
}
