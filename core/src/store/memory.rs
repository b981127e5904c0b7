// marketplace/core/src/store/memory.rs

//! In-process backend used by tests and the `memory` DSN.
//!
//! A transaction takes the store-wide lock and works on a private copy of
//! the state; `commit` publishes the copy, dropping the handle discards it.
//! Transactions are therefore fully serialized. The unique and reference
//! rules mirror the SQL schema and report the same constraint names.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{
  email_key, phone_key, reference_violation, unique_violation, Store, StoreTx, ADMINS_USERNAME_KEY,
  CARTS_ONE_ACTIVE_PER_CUSTOMER, CART_ITEMS_CART_PRODUCT_KEY, ORDERS_CART_ID_KEY, PAYMENTS_ORDER_ID_KEY,
  PRODUCTS_SKU_KEY, SHIPPING_INFOS_ORDER_ID_KEY,
};
use crate::auth::Role;
use crate::error::MarketResult;
use crate::models::{Account, Cart, CartItem, Order, Payment, Product, Profile, ShippingInfo};

#[derive(Debug, Default, Clone)]
struct MemoryState {
  customers: Vec<Account>,
  sellers: Vec<Account>,
  admins: Vec<Account>,
  products: Vec<Product>,
  carts: Vec<Cart>,
  cart_items: Vec<CartItem>,
  orders: Vec<Order>,
  payments: Vec<Payment>,
  shipping_infos: Vec<ShippingInfo>,
}

impl MemoryState {
  fn accounts(&self, role: Role) -> &Vec<Account> {
    match role {
      Role::Customer => &self.customers,
      Role::Seller => &self.sellers,
      Role::Admin => &self.admins,
    }
  }

  fn accounts_mut(&mut self, role: Role) -> &mut Vec<Account> {
    match role {
      Role::Customer => &mut self.customers,
      Role::Seller => &mut self.sellers,
      Role::Admin => &mut self.admins,
    }
  }

  // Unique email, phone and (for admins) username within the role's table.
  fn check_account_unique(&self, account: &Account) -> MarketResult<()> {
    let role = account.role();
    for other in self.accounts(role).iter().filter(|a| a.id != account.id) {
      if other.email == account.email {
        return Err(unique_violation(email_key(role)));
      }
      if other.phone == account.phone {
        return Err(unique_violation(phone_key(role)));
      }
      if let (Profile::Admin { username }, Profile::Admin { username: taken }) = (&account.profile, &other.profile) {
        if username == taken {
          return Err(unique_violation(ADMINS_USERNAME_KEY));
        }
      }
    }
    Ok(())
  }

  fn check_product_unique(&self, product: &Product) -> MarketResult<()> {
    if self.products.iter().any(|p| p.id != product.id && p.sku == product.sku) {
      return Err(unique_violation(PRODUCTS_SKU_KEY));
    }
    Ok(())
  }

  fn check_cart_unique(&self, cart: &Cart) -> MarketResult<()> {
    if cart.is_active
      && self
        .carts
        .iter()
        .any(|c| c.id != cart.id && c.customer_id == cart.customer_id && c.is_active)
    {
      return Err(unique_violation(CARTS_ONE_ACTIVE_PER_CUSTOMER));
    }
    Ok(())
  }
}

fn replace<T: Clone>(rows: &mut [T], row: &T, same: impl Fn(&T) -> bool) {
  if let Some(slot) = rows.iter_mut().find(|r| same(r)) {
    *slot = row.clone();
  }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
  state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn begin(&self) -> MarketResult<Box<dyn StoreTx>> {
    let guard = self.state.clone().lock_owned().await;
    let working = guard.clone();
    Ok(Box::new(MemoryTx { guard, working }))
  }

  async fn migrate(&self) -> MarketResult<()> {
    Ok(())
  }

  async fn health_check(&self) -> MarketResult<()> {
    Ok(())
  }
}

struct MemoryTx {
  guard: OwnedMutexGuard<MemoryState>,
  working: MemoryState,
}

#[async_trait]
impl StoreTx for MemoryTx {
  // --- Accounts ---

  async fn insert_account(&mut self, account: &Account) -> MarketResult<()> {
    self.working.check_account_unique(account)?;
    self.working.accounts_mut(account.role()).push(account.clone());
    Ok(())
  }

  async fn find_account(&mut self, role: Role, id: Uuid) -> MarketResult<Option<Account>> {
    Ok(self.working.accounts(role).iter().find(|a| a.id == id).cloned())
  }

  async fn find_account_by_email(&mut self, role: Role, email: &str) -> MarketResult<Option<Account>> {
    Ok(self.working.accounts(role).iter().find(|a| a.email == email).cloned())
  }

  async fn list_accounts(&mut self, role: Role) -> MarketResult<Vec<Account>> {
    Ok(self.working.accounts(role).clone())
  }

  async fn update_account(&mut self, account: &Account) -> MarketResult<()> {
    self.working.check_account_unique(account)?;
    replace(self.working.accounts_mut(account.role()), account, |a| a.id == account.id);
    Ok(())
  }

  async fn delete_account(&mut self, role: Role, id: Uuid) -> MarketResult<()> {
    match role {
      Role::Customer if self.working.carts.iter().any(|c| c.customer_id == id) => {
        return Err(reference_violation("carts_customer_id_fkey"));
      }
      Role::Seller if self.working.products.iter().any(|p| p.seller_id == id) => {
        return Err(reference_violation("products_seller_id_fkey"));
      }
      _ => {}
    }
    self.working.accounts_mut(role).retain(|a| a.id != id);
    Ok(())
  }

  async fn lock_account(&mut self, role: Role, id: Uuid) -> MarketResult<bool> {
    // The store-wide lock is already held.
    Ok(self.working.accounts(role).iter().any(|a| a.id == id))
  }

  // --- Products ---

  async fn insert_product(&mut self, product: &Product) -> MarketResult<()> {
    if !self.working.sellers.iter().any(|s| s.id == product.seller_id) {
      return Err(reference_violation("products_seller_id_fkey"));
    }
    self.working.check_product_unique(product)?;
    self.working.products.push(product.clone());
    Ok(())
  }

  async fn find_product(&mut self, id: Uuid) -> MarketResult<Option<Product>> {
    Ok(self.working.products.iter().find(|p| p.id == id).cloned())
  }

  async fn list_products(&mut self) -> MarketResult<Vec<Product>> {
    Ok(self.working.products.clone())
  }

  async fn list_products_by_seller(&mut self, seller_id: Uuid) -> MarketResult<Vec<Product>> {
    Ok(self.working.products.iter().filter(|p| p.seller_id == seller_id).cloned().collect())
  }

  async fn update_product(&mut self, product: &Product) -> MarketResult<()> {
    self.working.check_product_unique(product)?;
    replace(&mut self.working.products, product, |p| p.id == product.id);
    Ok(())
  }

  async fn delete_product(&mut self, id: Uuid) -> MarketResult<()> {
    if self.working.cart_items.iter().any(|i| i.product_id == id) {
      return Err(reference_violation("cart_items_product_id_fkey"));
    }
    self.working.products.retain(|p| p.id != id);
    Ok(())
  }

  // --- Carts ---

  async fn insert_cart(&mut self, cart: &Cart) -> MarketResult<()> {
    if !self.working.customers.iter().any(|c| c.id == cart.customer_id) {
      return Err(reference_violation("carts_customer_id_fkey"));
    }
    self.working.check_cart_unique(cart)?;
    self.working.carts.push(cart.clone());
    Ok(())
  }

  async fn find_cart(&mut self, id: Uuid) -> MarketResult<Option<Cart>> {
    Ok(self.working.carts.iter().find(|c| c.id == id).cloned())
  }

  async fn find_active_cart(&mut self, customer_id: Uuid) -> MarketResult<Option<Cart>> {
    Ok(
      self
        .working
        .carts
        .iter()
        .find(|c| c.customer_id == customer_id && c.is_active)
        .cloned(),
    )
  }

  async fn list_carts_for_customer(&mut self, customer_id: Uuid) -> MarketResult<Vec<Cart>> {
    Ok(self.working.carts.iter().filter(|c| c.customer_id == customer_id).cloned().collect())
  }

  async fn update_cart(&mut self, cart: &Cart) -> MarketResult<()> {
    self.working.check_cart_unique(cart)?;
    replace(&mut self.working.carts, cart, |c| c.id == cart.id);
    Ok(())
  }

  async fn set_cart_total(&mut self, cart_id: Uuid, total_price_cents: i64, updated_at: DateTime<Utc>) -> MarketResult<()> {
    if let Some(cart) = self.working.carts.iter_mut().find(|c| c.id == cart_id) {
      cart.total_price_cents = total_price_cents;
      cart.updated_at = updated_at;
    }
    Ok(())
  }

  async fn delete_cart(&mut self, id: Uuid) -> MarketResult<()> {
    if self.working.cart_items.iter().any(|i| i.cart_id == id) {
      return Err(reference_violation("cart_items_cart_id_fkey"));
    }
    if self.working.orders.iter().any(|o| o.cart_id == id) {
      return Err(reference_violation("orders_cart_id_fkey"));
    }
    self.working.carts.retain(|c| c.id != id);
    Ok(())
  }

  // --- Cart line items ---

  async fn insert_cart_item(&mut self, item: &CartItem) -> MarketResult<()> {
    if !self.working.carts.iter().any(|c| c.id == item.cart_id) {
      return Err(reference_violation("cart_items_cart_id_fkey"));
    }
    if !self.working.products.iter().any(|p| p.id == item.product_id) {
      return Err(reference_violation("cart_items_product_id_fkey"));
    }
    if self
      .working
      .cart_items
      .iter()
      .any(|i| i.cart_id == item.cart_id && i.product_id == item.product_id)
    {
      return Err(unique_violation(CART_ITEMS_CART_PRODUCT_KEY));
    }
    self.working.cart_items.push(item.clone());
    Ok(())
  }

  async fn find_cart_item(&mut self, id: Uuid) -> MarketResult<Option<CartItem>> {
    Ok(self.working.cart_items.iter().find(|i| i.id == id).cloned())
  }

  async fn find_cart_item_for_product(&mut self, cart_id: Uuid, product_id: Uuid) -> MarketResult<Option<CartItem>> {
    Ok(
      self
        .working
        .cart_items
        .iter()
        .find(|i| i.cart_id == cart_id && i.product_id == product_id)
        .cloned(),
    )
  }

  async fn list_cart_items(&mut self, cart_id: Uuid) -> MarketResult<Vec<CartItem>> {
    Ok(self.working.cart_items.iter().filter(|i| i.cart_id == cart_id).cloned().collect())
  }

  async fn list_cart_items_for_product(&mut self, product_id: Uuid) -> MarketResult<Vec<CartItem>> {
    Ok(self.working.cart_items.iter().filter(|i| i.product_id == product_id).cloned().collect())
  }

  async fn update_cart_item(&mut self, item: &CartItem) -> MarketResult<()> {
    replace(&mut self.working.cart_items, item, |i| i.id == item.id);
    Ok(())
  }

  async fn delete_cart_item(&mut self, id: Uuid) -> MarketResult<()> {
    self.working.cart_items.retain(|i| i.id != id);
    Ok(())
  }

  // --- Orders ---

  async fn insert_order(&mut self, order: &Order) -> MarketResult<()> {
    if !self.working.carts.iter().any(|c| c.id == order.cart_id) {
      return Err(reference_violation("orders_cart_id_fkey"));
    }
    if self.working.orders.iter().any(|o| o.cart_id == order.cart_id) {
      return Err(unique_violation(ORDERS_CART_ID_KEY));
    }
    self.working.orders.push(order.clone());
    Ok(())
  }

  async fn find_order(&mut self, id: Uuid) -> MarketResult<Option<Order>> {
    Ok(self.working.orders.iter().find(|o| o.id == id).cloned())
  }

  async fn find_order_for_cart(&mut self, cart_id: Uuid) -> MarketResult<Option<Order>> {
    Ok(self.working.orders.iter().find(|o| o.cart_id == cart_id).cloned())
  }

  async fn list_orders(&mut self) -> MarketResult<Vec<Order>> {
    Ok(self.working.orders.clone())
  }

  async fn list_orders_for_customer(&mut self, customer_id: Uuid) -> MarketResult<Vec<Order>> {
    let state = &self.working;
    Ok(
      state
        .orders
        .iter()
        .filter(|o| state.carts.iter().any(|c| c.id == o.cart_id && c.customer_id == customer_id))
        .cloned()
        .collect(),
    )
  }

  async fn list_orders_for_seller(&mut self, seller_id: Uuid) -> MarketResult<Vec<Order>> {
    let state = &self.working;
    let sells = |product_id: Uuid| state.products.iter().any(|p| p.id == product_id && p.seller_id == seller_id);
    Ok(
      state
        .orders
        .iter()
        .filter(|o| state.cart_items.iter().any(|i| i.cart_id == o.cart_id && sells(i.product_id)))
        .cloned()
        .collect(),
    )
  }

  async fn delete_order(&mut self, id: Uuid) -> MarketResult<()> {
    if self.working.payments.iter().any(|p| p.order_id == id) {
      return Err(reference_violation("payments_order_id_fkey"));
    }
    if self.working.shipping_infos.iter().any(|s| s.order_id == id) {
      return Err(reference_violation("shipping_infos_order_id_fkey"));
    }
    self.working.orders.retain(|o| o.id != id);
    Ok(())
  }

  // --- Payments & shipping ---

  async fn insert_payment(&mut self, payment: &Payment) -> MarketResult<()> {
    if !self.working.orders.iter().any(|o| o.id == payment.order_id) {
      return Err(reference_violation("payments_order_id_fkey"));
    }
    if self.working.payments.iter().any(|p| p.order_id == payment.order_id) {
      return Err(unique_violation(PAYMENTS_ORDER_ID_KEY));
    }
    self.working.payments.push(payment.clone());
    Ok(())
  }

  async fn find_payment_for_order(&mut self, order_id: Uuid) -> MarketResult<Option<Payment>> {
    Ok(self.working.payments.iter().find(|p| p.order_id == order_id).cloned())
  }

  async fn update_payment(&mut self, payment: &Payment) -> MarketResult<()> {
    replace(&mut self.working.payments, payment, |p| p.id == payment.id);
    Ok(())
  }

  async fn delete_payment_for_order(&mut self, order_id: Uuid) -> MarketResult<()> {
    self.working.payments.retain(|p| p.order_id != order_id);
    Ok(())
  }

  async fn insert_shipping_info(&mut self, info: &ShippingInfo) -> MarketResult<()> {
    if !self.working.orders.iter().any(|o| o.id == info.order_id) {
      return Err(reference_violation("shipping_infos_order_id_fkey"));
    }
    if self.working.shipping_infos.iter().any(|s| s.order_id == info.order_id) {
      return Err(unique_violation(SHIPPING_INFOS_ORDER_ID_KEY));
    }
    self.working.shipping_infos.push(info.clone());
    Ok(())
  }

  async fn find_shipping_info_for_order(&mut self, order_id: Uuid) -> MarketResult<Option<ShippingInfo>> {
    Ok(self.working.shipping_infos.iter().find(|s| s.order_id == order_id).cloned())
  }

  async fn delete_shipping_info_for_order(&mut self, order_id: Uuid) -> MarketResult<()> {
    self.working.shipping_infos.retain(|s| s.order_id != order_id);
    Ok(())
  }

  async fn commit(self: Box<Self>) -> MarketResult<()> {
    let MemoryTx { mut guard, working } = *self;
    *guard = working;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::MarketError;

  fn customer(email: &str, phone: &str) -> Account {
    let now = Utc::now();
    Account {
      id: Uuid::new_v4(),
      email: email.to_string(),
      phone: phone.to_string(),
      password_hash: "hash".to_string(),
      name: "Customer".to_string(),
      profile: Profile::Customer {
        address: "1 Main St".to_string(),
      },
      created_at: now,
      updated_at: now,
    }
  }

  #[tokio::test]
  async fn uncommitted_writes_are_discarded() {
    let store = MemoryStore::new();
    let account = customer("a@example.com", "1");

    let mut tx = store.begin().await.unwrap();
    tx.insert_account(&account).await.unwrap();
    drop(tx);

    let mut tx = store.begin().await.unwrap();
    assert!(tx.find_account(Role::Customer, account.id).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn committed_writes_are_visible_to_later_transactions() {
    let store = MemoryStore::new();
    let account = customer("a@example.com", "1");

    let mut tx = store.begin().await.unwrap();
    tx.insert_account(&account).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    assert_eq!(tx.find_account(Role::Customer, account.id).await.unwrap().unwrap().email, "a@example.com");
  }

  #[tokio::test]
  async fn duplicate_email_reports_the_role_constraint() {
    let store = MemoryStore::new();
    let mut tx = store.begin().await.unwrap();
    tx.insert_account(&customer("a@example.com", "1")).await.unwrap();

    match tx.insert_account(&customer("a@example.com", "2")).await {
      Err(MarketError::Conflict(message)) => assert_eq!(message, "Customer already exists with the same email"),
      other => panic!("expected Conflict, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn second_active_cart_is_rejected() {
    let store = MemoryStore::new();
    let account = customer("a@example.com", "1");
    let mut tx = store.begin().await.unwrap();
    tx.insert_account(&account).await.unwrap();
    tx.insert_cart(&Cart::open(account.id)).await.unwrap();

    assert!(matches!(
      tx.insert_cart(&Cart::open(account.id)).await,
      Err(MarketError::Conflict(_))
    ));
  }

  #[tokio::test]
  async fn setting_a_cart_total_keeps_the_cart_closed() {
    let store = MemoryStore::new();
    let account = customer("a@example.com", "1");
    let mut cart = Cart::open(account.id);
    cart.is_active = false;

    let mut tx = store.begin().await.unwrap();
    tx.insert_account(&account).await.unwrap();
    tx.insert_cart(&cart).await.unwrap();
    tx.set_cart_total(cart.id, 300, Utc::now()).await.unwrap();
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    let stored = tx.find_cart(cart.id).await.unwrap().unwrap();
    assert!(!stored.is_active);
    assert_eq!(stored.total_price_cents, 300);
  }

  #[tokio::test]
  async fn deleting_a_referenced_parent_is_rejected() {
    let store = MemoryStore::new();
    let account = customer("a@example.com", "1");
    let mut tx = store.begin().await.unwrap();
    tx.insert_account(&account).await.unwrap();
    tx.insert_cart(&Cart::open(account.id)).await.unwrap();

    assert!(matches!(
      tx.delete_account(Role::Customer, account.id).await,
      Err(MarketError::Conflict(_))
    ));
  }
}
