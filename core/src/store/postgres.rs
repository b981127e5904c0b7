// marketplace/core/src/store/postgres.rs

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{FromRow, Postgres, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{Store, StoreTx};
use crate::auth::Role;
use crate::error::MarketResult;
use crate::models::{Account, Cart, CartItem, Order, Payment, Product, Profile, ShippingInfo};

const PRODUCT_COLUMNS: &str = "id, seller_id, name, sku, description, price_cents, created_at, updated_at";
const CART_COLUMNS: &str = "id, customer_id, is_active, total_price_cents, created_at, updated_at";
const CART_ITEM_COLUMNS: &str = "id, cart_id, product_id, quantity, status, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, cart_id, total_amount_cents, ordered_date, status, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, order_id, total_amount_cents, paid, created_at, updated_at";
const SHIPPING_COLUMNS: &str = "id, order_id, address, created_at, updated_at";

/// Pool sizing and the deadlines that bound every request's storage work.
#[derive(Debug, Clone)]
pub struct PgStoreOptions {
  pub max_connections: u32,
  pub acquire_timeout: Duration,
  pub statement_timeout: Duration,
}

impl Default for PgStoreOptions {
  fn default() -> Self {
    Self {
      max_connections: 10,
      acquire_timeout: Duration::from_secs(5),
      statement_timeout: Duration::from_secs(5),
    }
  }
}

pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub async fn connect(dsn: &str, options: PgStoreOptions) -> MarketResult<Self> {
    let timeout_ms = options.statement_timeout.as_millis().to_string();
    let connect_options = PgConnectOptions::from_str(dsn)?.options([
      ("statement_timeout", timeout_ms.as_str()),
      ("idle_in_transaction_session_timeout", timeout_ms.as_str()),
    ]);

    let pool = PgPoolOptions::new()
      .max_connections(options.max_connections)
      .acquire_timeout(options.acquire_timeout)
      .connect_with(connect_options)
      .await?;

    info!(
      max_connections = options.max_connections,
      statement_timeout_ms = %timeout_ms,
      "Successfully connected to the database."
    );
    Ok(Self { pool })
  }

  pub fn from_pool(pool: PgPool) -> Self {
    Self { pool }
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }
}

#[async_trait]
impl Store for PgStore {
  async fn begin(&self) -> MarketResult<Box<dyn StoreTx>> {
    let tx = self.pool.begin().await?;
    Ok(Box::new(PgTx { tx }))
  }

  #[instrument(name = "pg_store::migrate", skip(self))]
  async fn migrate(&self) -> MarketResult<()> {
    sqlx::migrate!("./migrations").run(&self.pool).await?;
    info!("Database migrations applied.");
    Ok(())
  }

  async fn health_check(&self) -> MarketResult<()> {
    sqlx::query("SELECT 1").execute(&self.pool).await?;
    Ok(())
  }
}

struct PgTx {
  tx: Transaction<'static, Postgres>,
}

// Table and role-specific column of each identity kind.
fn account_table(role: Role) -> (&'static str, &'static str) {
  match role {
    Role::Customer => ("customers", "address"),
    Role::Seller => ("sellers", "store_name"),
    Role::Admin => ("admins", "username"),
  }
}

fn account_select(role: Role) -> String {
  let (table, detail) = account_table(role);
  format!(
    "SELECT id, email, phone, password_hash, name, {detail} AS detail, created_at, updated_at FROM {table}"
  )
}

#[derive(FromRow)]
struct AccountRow {
  id: Uuid,
  email: String,
  phone: String,
  password_hash: String,
  name: String,
  detail: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl AccountRow {
  fn into_account(self, role: Role) -> Account {
    Account {
      id: self.id,
      email: self.email,
      phone: self.phone,
      password_hash: self.password_hash,
      name: self.name,
      profile: Profile::for_role(role, self.detail),
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

#[async_trait]
impl StoreTx for PgTx {
  // --- Accounts ---

  async fn insert_account(&mut self, account: &Account) -> MarketResult<()> {
    let (table, detail) = account_table(account.role());
    let sql = format!(
      "INSERT INTO {table} (id, email, phone, password_hash, name, {detail}, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
    );
    sqlx::query(&sql)
      .bind(account.id)
      .bind(&account.email)
      .bind(&account.phone)
      .bind(&account.password_hash)
      .bind(&account.name)
      .bind(account.profile.detail())
      .bind(account.created_at)
      .bind(account.updated_at)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn find_account(&mut self, role: Role, id: Uuid) -> MarketResult<Option<Account>> {
    let sql = format!("{} WHERE id = $1", account_select(role));
    let row: Option<AccountRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&mut *self.tx).await?;
    Ok(row.map(|r| r.into_account(role)))
  }

  async fn find_account_by_email(&mut self, role: Role, email: &str) -> MarketResult<Option<Account>> {
    let sql = format!("{} WHERE email = $1", account_select(role));
    let row: Option<AccountRow> = sqlx::query_as(&sql).bind(email).fetch_optional(&mut *self.tx).await?;
    Ok(row.map(|r| r.into_account(role)))
  }

  async fn list_accounts(&mut self, role: Role) -> MarketResult<Vec<Account>> {
    let sql = format!("{} ORDER BY created_at, id", account_select(role));
    let rows: Vec<AccountRow> = sqlx::query_as(&sql).fetch_all(&mut *self.tx).await?;
    Ok(rows.into_iter().map(|r| r.into_account(role)).collect())
  }

  async fn update_account(&mut self, account: &Account) -> MarketResult<()> {
    let (table, detail) = account_table(account.role());
    let sql = format!(
      "UPDATE {table} SET email = $2, phone = $3, password_hash = $4, name = $5, {detail} = $6, updated_at = $7 \
       WHERE id = $1"
    );
    sqlx::query(&sql)
      .bind(account.id)
      .bind(&account.email)
      .bind(&account.phone)
      .bind(&account.password_hash)
      .bind(&account.name)
      .bind(account.profile.detail())
      .bind(account.updated_at)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn delete_account(&mut self, role: Role, id: Uuid) -> MarketResult<()> {
    let (table, _) = account_table(role);
    let sql = format!("DELETE FROM {table} WHERE id = $1");
    sqlx::query(&sql).bind(id).execute(&mut *self.tx).await?;
    Ok(())
  }

  async fn lock_account(&mut self, role: Role, id: Uuid) -> MarketResult<bool> {
    let (table, _) = account_table(role);
    let sql = format!("SELECT id FROM {table} WHERE id = $1 FOR UPDATE");
    let row: Option<(Uuid,)> = sqlx::query_as(&sql).bind(id).fetch_optional(&mut *self.tx).await?;
    Ok(row.is_some())
  }

  // --- Products ---

  async fn insert_product(&mut self, product: &Product) -> MarketResult<()> {
    sqlx::query(
      "INSERT INTO products (id, seller_id, name, sku, description, price_cents, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(product.id)
    .bind(product.seller_id)
    .bind(&product.name)
    .bind(&product.sku)
    .bind(&product.description)
    .bind(product.price_cents)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn find_product(&mut self, id: Uuid) -> MarketResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&mut *self.tx).await?)
  }

  async fn list_products(&mut self) -> MarketResult<Vec<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, id");
    Ok(sqlx::query_as(&sql).fetch_all(&mut *self.tx).await?)
  }

  async fn list_products_by_seller(&mut self, seller_id: Uuid) -> MarketResult<Vec<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = $1 ORDER BY created_at, id");
    Ok(sqlx::query_as(&sql).bind(seller_id).fetch_all(&mut *self.tx).await?)
  }

  async fn update_product(&mut self, product: &Product) -> MarketResult<()> {
    sqlx::query(
      "UPDATE products SET name = $2, sku = $3, description = $4, price_cents = $5, updated_at = $6 WHERE id = $1",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.sku)
    .bind(&product.description)
    .bind(product.price_cents)
    .bind(product.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn delete_product(&mut self, id: Uuid) -> MarketResult<()> {
    sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  // --- Carts ---

  async fn insert_cart(&mut self, cart: &Cart) -> MarketResult<()> {
    sqlx::query(
      "INSERT INTO carts (id, customer_id, is_active, total_price_cents, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(cart.id)
    .bind(cart.customer_id)
    .bind(cart.is_active)
    .bind(cart.total_price_cents)
    .bind(cart.created_at)
    .bind(cart.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn find_cart(&mut self, id: Uuid) -> MarketResult<Option<Cart>> {
    let sql = format!("SELECT {CART_COLUMNS} FROM carts WHERE id = $1");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&mut *self.tx).await?)
  }

  async fn find_active_cart(&mut self, customer_id: Uuid) -> MarketResult<Option<Cart>> {
    let sql = format!("SELECT {CART_COLUMNS} FROM carts WHERE customer_id = $1 AND is_active");
    Ok(sqlx::query_as(&sql).bind(customer_id).fetch_optional(&mut *self.tx).await?)
  }

  async fn list_carts_for_customer(&mut self, customer_id: Uuid) -> MarketResult<Vec<Cart>> {
    let sql = format!("SELECT {CART_COLUMNS} FROM carts WHERE customer_id = $1 ORDER BY created_at, id");
    Ok(sqlx::query_as(&sql).bind(customer_id).fetch_all(&mut *self.tx).await?)
  }

  async fn update_cart(&mut self, cart: &Cart) -> MarketResult<()> {
    sqlx::query("UPDATE carts SET is_active = $2, total_price_cents = $3, updated_at = $4 WHERE id = $1")
      .bind(cart.id)
      .bind(cart.is_active)
      .bind(cart.total_price_cents)
      .bind(cart.updated_at)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn set_cart_total(&mut self, cart_id: Uuid, total_price_cents: i64, updated_at: DateTime<Utc>) -> MarketResult<()> {
    sqlx::query("UPDATE carts SET total_price_cents = $2, updated_at = $3 WHERE id = $1")
      .bind(cart_id)
      .bind(total_price_cents)
      .bind(updated_at)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn delete_cart(&mut self, id: Uuid) -> MarketResult<()> {
    sqlx::query("DELETE FROM carts WHERE id = $1")
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  // --- Cart line items ---

  async fn insert_cart_item(&mut self, item: &CartItem) -> MarketResult<()> {
    sqlx::query(
      "INSERT INTO cart_items (id, cart_id, product_id, quantity, status, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(item.id)
    .bind(item.cart_id)
    .bind(item.product_id)
    .bind(item.quantity)
    .bind(item.status)
    .bind(item.created_at)
    .bind(item.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn find_cart_item(&mut self, id: Uuid) -> MarketResult<Option<CartItem>> {
    let sql = format!("SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE id = $1");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&mut *self.tx).await?)
  }

  async fn find_cart_item_for_product(&mut self, cart_id: Uuid, product_id: Uuid) -> MarketResult<Option<CartItem>> {
    let sql = format!("SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE cart_id = $1 AND product_id = $2");
    Ok(
      sqlx::query_as(&sql)
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?,
    )
  }

  async fn list_cart_items(&mut self, cart_id: Uuid) -> MarketResult<Vec<CartItem>> {
    let sql = format!("SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE cart_id = $1 ORDER BY created_at, id");
    Ok(sqlx::query_as(&sql).bind(cart_id).fetch_all(&mut *self.tx).await?)
  }

  async fn list_cart_items_for_product(&mut self, product_id: Uuid) -> MarketResult<Vec<CartItem>> {
    let sql = format!("SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE product_id = $1 ORDER BY created_at, id");
    Ok(sqlx::query_as(&sql).bind(product_id).fetch_all(&mut *self.tx).await?)
  }

  async fn update_cart_item(&mut self, item: &CartItem) -> MarketResult<()> {
    sqlx::query("UPDATE cart_items SET quantity = $2, status = $3, updated_at = $4 WHERE id = $1")
      .bind(item.id)
      .bind(item.quantity)
      .bind(item.status)
      .bind(item.updated_at)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn delete_cart_item(&mut self, id: Uuid) -> MarketResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE id = $1")
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  // --- Orders ---

  async fn insert_order(&mut self, order: &Order) -> MarketResult<()> {
    sqlx::query(
      "INSERT INTO orders (id, cart_id, total_amount_cents, ordered_date, status, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(order.id)
    .bind(order.cart_id)
    .bind(order.total_amount_cents)
    .bind(order.ordered_date)
    .bind(order.status)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn find_order(&mut self, id: Uuid) -> MarketResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
    Ok(sqlx::query_as(&sql).bind(id).fetch_optional(&mut *self.tx).await?)
  }

  async fn find_order_for_cart(&mut self, cart_id: Uuid) -> MarketResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE cart_id = $1");
    Ok(sqlx::query_as(&sql).bind(cart_id).fetch_optional(&mut *self.tx).await?)
  }

  async fn list_orders(&mut self) -> MarketResult<Vec<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY ordered_date, id");
    Ok(sqlx::query_as(&sql).fetch_all(&mut *self.tx).await?)
  }

  async fn list_orders_for_customer(&mut self, customer_id: Uuid) -> MarketResult<Vec<Order>> {
    let sql = format!(
      "SELECT {ORDER_COLUMNS} FROM orders \
       WHERE cart_id IN (SELECT id FROM carts WHERE customer_id = $1) \
       ORDER BY ordered_date, id"
    );
    Ok(sqlx::query_as(&sql).bind(customer_id).fetch_all(&mut *self.tx).await?)
  }

  async fn list_orders_for_seller(&mut self, seller_id: Uuid) -> MarketResult<Vec<Order>> {
    let sql = format!(
      "SELECT {ORDER_COLUMNS} FROM orders \
       WHERE cart_id IN ( \
         SELECT ci.cart_id FROM cart_items ci JOIN products p ON p.id = ci.product_id WHERE p.seller_id = $1 \
       ) \
       ORDER BY ordered_date, id"
    );
    Ok(sqlx::query_as(&sql).bind(seller_id).fetch_all(&mut *self.tx).await?)
  }

  async fn delete_order(&mut self, id: Uuid) -> MarketResult<()> {
    sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  // --- Payments & shipping ---

  async fn insert_payment(&mut self, payment: &Payment) -> MarketResult<()> {
    sqlx::query(
      "INSERT INTO payments (id, order_id, total_amount_cents, paid, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(payment.id)
    .bind(payment.order_id)
    .bind(payment.total_amount_cents)
    .bind(payment.paid)
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn find_payment_for_order(&mut self, order_id: Uuid) -> MarketResult<Option<Payment>> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = $1");
    Ok(sqlx::query_as(&sql).bind(order_id).fetch_optional(&mut *self.tx).await?)
  }

  async fn update_payment(&mut self, payment: &Payment) -> MarketResult<()> {
    sqlx::query("UPDATE payments SET paid = $2, updated_at = $3 WHERE id = $1")
      .bind(payment.id)
      .bind(payment.paid)
      .bind(payment.updated_at)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn delete_payment_for_order(&mut self, order_id: Uuid) -> MarketResult<()> {
    sqlx::query("DELETE FROM payments WHERE order_id = $1")
      .bind(order_id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn insert_shipping_info(&mut self, info: &ShippingInfo) -> MarketResult<()> {
    sqlx::query(
      "INSERT INTO shipping_infos (id, order_id, address, created_at, updated_at) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(info.id)
    .bind(info.order_id)
    .bind(&info.address)
    .bind(info.created_at)
    .bind(info.updated_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn find_shipping_info_for_order(&mut self, order_id: Uuid) -> MarketResult<Option<ShippingInfo>> {
    let sql = format!("SELECT {SHIPPING_COLUMNS} FROM shipping_infos WHERE order_id = $1");
    Ok(sqlx::query_as(&sql).bind(order_id).fetch_optional(&mut *self.tx).await?)
  }

  async fn delete_shipping_info_for_order(&mut self, order_id: Uuid) -> MarketResult<()> {
    sqlx::query("DELETE FROM shipping_infos WHERE order_id = $1")
      .bind(order_id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn commit(self: Box<Self>) -> MarketResult<()> {
    self.tx.commit().await?;
    Ok(())
  }
}
