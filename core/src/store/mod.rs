// marketplace/core/src/store/mod.rs

//! Storage seam. Services run every request as one `StoreTx`; the backend
//! (PostgreSQL or in-memory) provides atomicity and uniqueness.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::Role;
use crate::error::{MarketError, MarketResult};
use crate::models::{Account, Cart, CartItem, Order, Payment, Product, ShippingInfo};

pub use memory::MemoryStore;
pub use postgres::{PgStore, PgStoreOptions};

// --- Constraint names (shared by the SQL schema and the memory backend) ---

pub const CUSTOMERS_EMAIL_KEY: &str = "customers_email_key";
pub const CUSTOMERS_PHONE_KEY: &str = "customers_phone_key";
pub const SELLERS_EMAIL_KEY: &str = "sellers_email_key";
pub const SELLERS_PHONE_KEY: &str = "sellers_phone_key";
pub const ADMINS_EMAIL_KEY: &str = "admins_email_key";
pub const ADMINS_PHONE_KEY: &str = "admins_phone_key";
pub const ADMINS_USERNAME_KEY: &str = "admins_username_key";
pub const PRODUCTS_SKU_KEY: &str = "products_sku_key";
pub const CARTS_ONE_ACTIVE_PER_CUSTOMER: &str = "carts_one_active_per_customer";
pub const CART_ITEMS_CART_PRODUCT_KEY: &str = "cart_items_cart_product_key";
pub const ORDERS_CART_ID_KEY: &str = "orders_cart_id_key";
pub const PAYMENTS_ORDER_ID_KEY: &str = "payments_order_id_key";
pub const SHIPPING_INFOS_ORDER_ID_KEY: &str = "shipping_infos_order_id_key";

pub(crate) fn email_key(role: Role) -> &'static str {
  match role {
    Role::Customer => CUSTOMERS_EMAIL_KEY,
    Role::Seller => SELLERS_EMAIL_KEY,
    Role::Admin => ADMINS_EMAIL_KEY,
  }
}

pub(crate) fn phone_key(role: Role) -> &'static str {
  match role {
    Role::Customer => CUSTOMERS_PHONE_KEY,
    Role::Seller => SELLERS_PHONE_KEY,
    Role::Admin => ADMINS_PHONE_KEY,
  }
}

/// Translates a violated unique constraint into the client-facing conflict.
pub fn unique_violation(constraint: &str) -> MarketError {
  let message = match constraint {
    CUSTOMERS_EMAIL_KEY => "Customer already exists with the same email",
    CUSTOMERS_PHONE_KEY => "Customer already exists with the same phone",
    SELLERS_EMAIL_KEY => "Seller already exists with the same email",
    SELLERS_PHONE_KEY => "Seller already exists with the same phone",
    ADMINS_EMAIL_KEY => "Admin already exists with the same email",
    ADMINS_PHONE_KEY => "Admin already exists with the same phone",
    ADMINS_USERNAME_KEY => "Admin already exists with the same username",
    PRODUCTS_SKU_KEY => "Product already exists with the same sku",
    CARTS_ONE_ACTIVE_PER_CUSTOMER => "Customer already has an active cart",
    CART_ITEMS_CART_PRODUCT_KEY => "Product is already in this cart",
    ORDERS_CART_ID_KEY => "There is an already placed order for this customer's cart",
    PAYMENTS_ORDER_ID_KEY => "Order already has a payment",
    SHIPPING_INFOS_ORDER_ID_KEY => "Order already has shipping info",
    _ => "Resource already exists",
  };
  MarketError::Conflict(message.to_string())
}

/// A delete or insert that would orphan or dangle a reference.
pub fn reference_violation(constraint: &str) -> MarketError {
  MarketError::Conflict(format!(
    "Operation would break a record reference ({})",
    if constraint.is_empty() { "unknown" } else { constraint }
  ))
}

/// A storage backend that hands out transactions.
#[async_trait]
pub trait Store: Send + Sync {
  /// Starts a transaction. Dropping the returned handle without `commit`
  /// discards every write made through it.
  async fn begin(&self) -> MarketResult<Box<dyn StoreTx>>;

  /// Brings the schema up to date.
  async fn migrate(&self) -> MarketResult<()>;

  /// Check storage connectivity.
  async fn health_check(&self) -> MarketResult<()>;
}

/// Opens the backend named by a storage DSN: `memory` (or `memory://…`)
/// selects the in-process store, anything else is a PostgreSQL URL.
pub async fn open(dsn: &str, options: PgStoreOptions) -> MarketResult<Arc<dyn Store>> {
  if dsn == "memory" || dsn.starts_with("memory://") {
    tracing::warn!("Using the in-memory store; all data is lost when the process exits.");
    return Ok(Arc::new(MemoryStore::new()));
  }
  let store = PgStore::connect(dsn, options).await?;
  Ok(Arc::new(store))
}

/// One unit of work. Reads observe the transaction's own writes.
#[async_trait]
pub trait StoreTx: Send {
  // --- Accounts ---
  async fn insert_account(&mut self, account: &Account) -> MarketResult<()>;
  async fn find_account(&mut self, role: Role, id: Uuid) -> MarketResult<Option<Account>>;
  async fn find_account_by_email(&mut self, role: Role, email: &str) -> MarketResult<Option<Account>>;
  async fn list_accounts(&mut self, role: Role) -> MarketResult<Vec<Account>>;
  async fn update_account(&mut self, account: &Account) -> MarketResult<()>;
  async fn delete_account(&mut self, role: Role, id: Uuid) -> MarketResult<()>;
  /// Row-locks the account until the transaction ends, serializing
  /// concurrent requests of the same caller. False if it does not exist.
  async fn lock_account(&mut self, role: Role, id: Uuid) -> MarketResult<bool>;

  // --- Products ---
  async fn insert_product(&mut self, product: &Product) -> MarketResult<()>;
  async fn find_product(&mut self, id: Uuid) -> MarketResult<Option<Product>>;
  async fn list_products(&mut self) -> MarketResult<Vec<Product>>;
  async fn list_products_by_seller(&mut self, seller_id: Uuid) -> MarketResult<Vec<Product>>;
  async fn update_product(&mut self, product: &Product) -> MarketResult<()>;
  async fn delete_product(&mut self, id: Uuid) -> MarketResult<()>;

  // --- Carts ---
  async fn insert_cart(&mut self, cart: &Cart) -> MarketResult<()>;
  async fn find_cart(&mut self, id: Uuid) -> MarketResult<Option<Cart>>;
  async fn find_active_cart(&mut self, customer_id: Uuid) -> MarketResult<Option<Cart>>;
  async fn list_carts_for_customer(&mut self, customer_id: Uuid) -> MarketResult<Vec<Cart>>;
  async fn update_cart(&mut self, cart: &Cart) -> MarketResult<()>;
  /// Writes only the cached total; the cart's other columns stay as stored.
  async fn set_cart_total(&mut self, cart_id: Uuid, total_price_cents: i64, updated_at: DateTime<Utc>) -> MarketResult<()>;
  async fn delete_cart(&mut self, id: Uuid) -> MarketResult<()>;

  // --- Cart line items ---
  async fn insert_cart_item(&mut self, item: &CartItem) -> MarketResult<()>;
  async fn find_cart_item(&mut self, id: Uuid) -> MarketResult<Option<CartItem>>;
  async fn find_cart_item_for_product(&mut self, cart_id: Uuid, product_id: Uuid) -> MarketResult<Option<CartItem>>;
  async fn list_cart_items(&mut self, cart_id: Uuid) -> MarketResult<Vec<CartItem>>;
  async fn list_cart_items_for_product(&mut self, product_id: Uuid) -> MarketResult<Vec<CartItem>>;
  async fn update_cart_item(&mut self, item: &CartItem) -> MarketResult<()>;
  async fn delete_cart_item(&mut self, id: Uuid) -> MarketResult<()>;

  // --- Orders ---
  async fn insert_order(&mut self, order: &Order) -> MarketResult<()>;
  async fn find_order(&mut self, id: Uuid) -> MarketResult<Option<Order>>;
  async fn find_order_for_cart(&mut self, cart_id: Uuid) -> MarketResult<Option<Order>>;
  async fn list_orders(&mut self) -> MarketResult<Vec<Order>>;
  async fn list_orders_for_customer(&mut self, customer_id: Uuid) -> MarketResult<Vec<Order>>;
  /// Orders whose cart holds at least one line item of the seller's products.
  async fn list_orders_for_seller(&mut self, seller_id: Uuid) -> MarketResult<Vec<Order>>;
  async fn delete_order(&mut self, id: Uuid) -> MarketResult<()>;

  // --- Payments & shipping ---
  async fn insert_payment(&mut self, payment: &Payment) -> MarketResult<()>;
  async fn find_payment_for_order(&mut self, order_id: Uuid) -> MarketResult<Option<Payment>>;
  async fn update_payment(&mut self, payment: &Payment) -> MarketResult<()>;
  async fn delete_payment_for_order(&mut self, order_id: Uuid) -> MarketResult<()>;
  async fn insert_shipping_info(&mut self, info: &ShippingInfo) -> MarketResult<()>;
  async fn find_shipping_info_for_order(&mut self, order_id: Uuid) -> MarketResult<Option<ShippingInfo>>;
  async fn delete_shipping_info_for_order(&mut self, order_id: Uuid) -> MarketResult<()>;

  async fn commit(self: Box<Self>) -> MarketResult<()>;
}
