// marketplace/core/src/services/cart.rs

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{add_cents, line_total};
use crate::auth::Role;
use crate::error::{MarketError, MarketResult};
use crate::models::{Cart, CartDetails, CartItem};
use crate::store::{Store, StoreTx};
use crate::validation::FieldErrors;

const ACTIVE_CART_NOT_FOUND: &str = "Active cart not found";
const CART_ITEM_NOT_FOUND: &str = "Cart item not found";

/// The customer's single active cart. Every mutation locks the customer
/// first, so concurrent requests of one customer apply one after another.
#[derive(Clone)]
pub struct CartService {
  store: Arc<dyn Store>,
}

impl CartService {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }

  /// Adds `quantity` of a product, opening a cart and a line item as needed.
  #[instrument(
    name = "cart::add_item",
    skip(self),
    fields(customer_id = %customer_id, product_id = %product_id)
  )]
  pub async fn add_item(&self, customer_id: Uuid, product_id: Uuid, quantity: i32) -> MarketResult<CartItem> {
    check_quantity(quantity)?;

    let mut tx = self.store.begin().await?;
    lock_customer(tx.as_mut(), customer_id).await?;
    let product = tx
      .find_product(product_id)
      .await?
      .ok_or_else(|| MarketError::not_found("Product not found"))?;

    let mut cart = match tx.find_active_cart(customer_id).await? {
      Some(cart) => cart,
      None => {
        let cart = Cart::open(customer_id);
        tx.insert_cart(&cart).await?;
        debug!(cart_id = %cart.id, "Opened a new cart.");
        cart
      }
    };

    let now = Utc::now();
    let item = match tx.find_cart_item_for_product(cart.id, product.id).await? {
      Some(mut item) => {
        item.quantity = item
          .quantity
          .checked_add(quantity)
          .ok_or_else(|| MarketError::BadRequest("Quantity is too large".to_string()))?;
        item.updated_at = now;
        tx.update_cart_item(&item).await?;
        item
      }
      None => {
        let item = CartItem::new(cart.id, product.id, quantity);
        tx.insert_cart_item(&item).await?;
        item
      }
    };

    cart.total_price_cents = add_cents(cart.total_price_cents, line_total(quantity, product.price_cents)?)?;
    cart.updated_at = now;
    tx.update_cart(&cart).await?;
    tx.commit().await?;

    info!(cart_id = %cart.id, item_id = %item.id, total_cents = cart.total_price_cents, "Item added to cart.");
    Ok(item)
  }

  #[instrument(name = "cart::update_item", skip(self), fields(customer_id = %customer_id, item_id = %item_id))]
  pub async fn update_item(&self, customer_id: Uuid, item_id: Uuid, quantity: i32) -> MarketResult<CartItem> {
    check_quantity(quantity)?;

    let mut tx = self.store.begin().await?;
    lock_customer(tx.as_mut(), customer_id).await?;
    let (mut cart, mut item) = active_cart_item(tx.as_mut(), customer_id, item_id).await?;

    item.quantity = quantity;
    item.updated_at = Utc::now();
    tx.update_cart_item(&item).await?;
    refresh_cart_total(tx.as_mut(), &mut cart).await?;
    tx.commit().await?;

    info!(cart_id = %cart.id, total_cents = cart.total_price_cents, "Cart item updated.");
    Ok(item)
  }

  #[instrument(name = "cart::remove_item", skip(self), fields(customer_id = %customer_id, item_id = %item_id))]
  pub async fn remove_item(&self, customer_id: Uuid, item_id: Uuid) -> MarketResult<()> {
    let mut tx = self.store.begin().await?;
    lock_customer(tx.as_mut(), customer_id).await?;
    let (mut cart, item) = active_cart_item(tx.as_mut(), customer_id, item_id).await?;

    tx.delete_cart_item(item.id).await?;
    refresh_cart_total(tx.as_mut(), &mut cart).await?;
    tx.commit().await?;

    info!(cart_id = %cart.id, total_cents = cart.total_price_cents, "Cart item removed.");
    Ok(())
  }

  pub async fn view_cart(&self, customer_id: Uuid) -> MarketResult<CartDetails> {
    let mut tx = self.store.begin().await?;
    let cart = tx
      .find_active_cart(customer_id)
      .await?
      .ok_or_else(|| MarketError::not_found(ACTIVE_CART_NOT_FOUND))?;
    let items = tx.list_cart_items(cart.id).await?;
    Ok(CartDetails { cart, items })
  }
}

fn check_quantity(quantity: i32) -> MarketResult<()> {
  let mut errors = FieldErrors::new();
  errors.positive("quantity", i64::from(quantity));
  errors.into_result()
}

async fn lock_customer(tx: &mut dyn StoreTx, customer_id: Uuid) -> MarketResult<()> {
  if tx.lock_account(Role::Customer, customer_id).await? {
    Ok(())
  } else {
    Err(MarketError::not_found("Customer not found"))
  }
}

// The line item must sit in the caller's active cart; any other item,
// including one in another customer's cart, does not exist for them.
async fn active_cart_item(tx: &mut dyn StoreTx, customer_id: Uuid, item_id: Uuid) -> MarketResult<(Cart, CartItem)> {
  let cart = tx
    .find_active_cart(customer_id)
    .await?
    .ok_or_else(|| MarketError::not_found(ACTIVE_CART_NOT_FOUND))?;
  match tx.find_cart_item(item_id).await? {
    Some(item) if item.cart_id == cart.id => Ok((cart, item)),
    _ => Err(MarketError::not_found(CART_ITEM_NOT_FOUND)),
  }
}

/// Sum of `quantity × current price` over the given line items.
pub(crate) async fn priced_total(tx: &mut dyn StoreTx, items: &[CartItem]) -> MarketResult<i64> {
  let mut total = 0i64;
  for item in items {
    let product = tx
      .find_product(item.product_id)
      .await?
      .ok_or_else(|| MarketError::not_found(format!("Product {} not found", item.product_id)))?;
    total = add_cents(total, line_total(item.quantity, product.price_cents)?)?;
  }
  Ok(total)
}

/// Recomputes the cached total of `cart` from its line items and stores it.
pub(crate) async fn refresh_cart_total(tx: &mut dyn StoreTx, cart: &mut Cart) -> MarketResult<()> {
  let items = tx.list_cart_items(cart.id).await?;
  cart.total_price_cents = priced_total(tx, &items).await?;
  cart.updated_at = Utc::now();
  tx.set_cart_total(cart.id, cart.total_price_cents, cart.updated_at).await
}
