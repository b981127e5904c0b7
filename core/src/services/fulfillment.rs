// marketplace/core/src/services/fulfillment.rs

//! The seller's side of orders. A seller sees an order only through the
//! line items of their own products.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::orders::{remove_order, OrderService, ORDER_NOT_FOUND};
use crate::error::{MarketError, MarketResult};
use crate::models::{CartItem, FulfillmentStatus, Order, OrderDetails, ShippingInfo, UnknownStatus};
use crate::store::StoreTx;

const CART_ITEM_NOT_FOUND: &str = "Cart item not found";

async fn seller_product_ids(tx: &mut dyn StoreTx, seller_id: Uuid) -> MarketResult<HashSet<Uuid>> {
  let products = tx.list_products_by_seller(seller_id).await?;
  Ok(products.into_iter().map(|p| p.id).collect())
}

async fn seller_items(tx: &mut dyn StoreTx, products: &HashSet<Uuid>, cart_id: Uuid) -> MarketResult<Vec<CartItem>> {
  let items = tx.list_cart_items(cart_id).await?;
  Ok(items.into_iter().filter(|i| products.contains(&i.product_id)).collect())
}

// The order and the seller's items in it; 404 when the seller has none.
async fn seller_view(tx: &mut dyn StoreTx, seller_id: Uuid, order_id: Uuid) -> MarketResult<(Order, Vec<CartItem>)> {
  let order = tx
    .find_order(order_id)
    .await?
    .ok_or_else(|| MarketError::not_found(ORDER_NOT_FOUND))?;
  let products = seller_product_ids(tx, seller_id).await?;
  let items = seller_items(tx, &products, order.cart_id).await?;
  if items.is_empty() {
    return Err(MarketError::not_found(ORDER_NOT_FOUND));
  }
  Ok((order, items))
}

impl OrderService {
  /// Orders containing the seller's products, items filtered to those
  /// products. Payment is omitted since its total spans other sellers.
  pub async fn seller_orders(&self, seller_id: Uuid) -> MarketResult<Vec<OrderDetails>> {
    let mut tx = self.store.begin().await?;
    let orders = tx.list_orders_for_seller(seller_id).await?;
    if orders.is_empty() {
      return Err(MarketError::not_found("No orders found for this seller"));
    }

    let products = seller_product_ids(tx.as_mut(), seller_id).await?;
    let mut details = Vec::with_capacity(orders.len());
    for order in orders {
      let items = seller_items(tx.as_mut(), &products, order.cart_id).await?;
      let shipping_info = tx.find_shipping_info_for_order(order.id).await?;
      details.push(OrderDetails {
        order,
        items,
        payment: None,
        shipping_info,
      });
    }
    Ok(details)
  }

  pub async fn seller_order(&self, seller_id: Uuid, order_id: Uuid) -> MarketResult<OrderDetails> {
    let mut tx = self.store.begin().await?;
    let (order, items) = seller_view(tx.as_mut(), seller_id, order_id).await?;
    let shipping_info = tx.find_shipping_info_for_order(order.id).await?;
    Ok(OrderDetails {
      order,
      items,
      payment: None,
      shipping_info,
    })
  }

  pub async fn seller_shipping_info(&self, seller_id: Uuid, order_id: Uuid) -> MarketResult<ShippingInfo> {
    let mut tx = self.store.begin().await?;
    let (order, _) = seller_view(tx.as_mut(), seller_id, order_id).await?;
    let shipping_info = tx.find_shipping_info_for_order(order.id).await?;
    shipping_info.ok_or_else(|| MarketError::not_found("Shipping info not found"))
  }

  /// Seller-initiated removal of an order holding their items, together
  /// with its payment and shipping info.
  #[instrument(name = "fulfillment::delete_order", skip(self), fields(seller_id = %seller_id, order_id = %order_id))]
  pub async fn delete_order(&self, seller_id: Uuid, order_id: Uuid) -> MarketResult<()> {
    let mut tx = self.store.begin().await?;
    seller_view(tx.as_mut(), seller_id, order_id).await?;
    remove_order(tx.as_mut(), order_id).await?;
    tx.commit().await?;

    info!("Order deleted.");
    Ok(())
  }

  /// Sets the fulfillment status of one line item. The item must belong to
  /// the order and to one of the seller's products. Any status may follow
  /// any other.
  #[instrument(
    name = "fulfillment::update_line_item_status",
    skip(self),
    fields(seller_id = %seller_id, order_id = %order_id, item_id = %item_id)
  )]
  pub async fn update_line_item_status(
    &self,
    seller_id: Uuid,
    order_id: Uuid,
    item_id: Uuid,
    status: &str,
  ) -> MarketResult<CartItem> {
    let status: FulfillmentStatus = status
      .parse()
      .map_err(|err: UnknownStatus| MarketError::BadRequest(err.to_string()))?;

    let mut tx = self.store.begin().await?;
    let order = tx
      .find_order(order_id)
      .await?
      .ok_or_else(|| MarketError::not_found(ORDER_NOT_FOUND))?;
    let mut item = match tx.find_cart_item(item_id).await? {
      Some(item) if item.cart_id == order.cart_id => item,
      _ => return Err(MarketError::not_found(CART_ITEM_NOT_FOUND)),
    };
    let owns_product = tx
      .find_product(item.product_id)
      .await?
      .is_some_and(|p| p.seller_id == seller_id);
    if !owns_product {
      return Err(MarketError::not_found(CART_ITEM_NOT_FOUND));
    }

    item.status = status;
    item.updated_at = Utc::now();
    tx.update_cart_item(&item).await?;
    tx.commit().await?;

    info!(status = %status, "Line item status updated.");
    Ok(item)
  }
}
