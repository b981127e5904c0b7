// marketplace/core/tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use std::sync::Arc;

use marketplace_core::models::{Account, NewAccount, NewProduct, Product, Profile};
use marketplace_core::{CartService, CatalogService, IdentityService, MemoryStore, OrderService, Store};
use once_cell::sync::Lazy;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const PASSWORD: &str = "s3cret-pass";

/// Every service wired to one store, a fresh in-memory one unless given.
#[derive(Clone)]
pub struct Market {
  pub store: Arc<dyn Store>,
  pub identity: IdentityService,
  pub catalog: CatalogService,
  pub carts: CartService,
  pub orders: OrderService,
}

impl Market {
  pub fn new() -> Self {
    Self::with_store(Arc::new(MemoryStore::new()))
  }

  pub fn with_store(store: Arc<dyn Store>) -> Self {
    setup_tracing();
    Self {
      identity: IdentityService::new(store.clone()),
      catalog: CatalogService::new(store.clone()),
      carts: CartService::new(store.clone()),
      orders: OrderService::new(store.clone()),
      store,
    }
  }

  pub async fn customer(&self) -> Account {
    self.identity.register(new_account(Profile::Customer { address: "1 Main St".to_string() })).await.unwrap()
  }

  pub async fn seller(&self) -> Account {
    let tag = short_tag();
    self
      .identity
      .register(new_account(Profile::Seller { store_name: format!("Store {tag}") }))
      .await
      .unwrap()
  }

  pub async fn product(&self, seller_id: Uuid, price_cents: i64) -> Product {
    self.catalog.create(seller_id, new_product(price_cents)).await.unwrap()
  }
}

pub fn short_tag() -> String {
  Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Registration input with a unique email and phone.
pub fn new_account(profile: Profile) -> NewAccount {
  let tag = short_tag();
  NewAccount {
    email: format!("user-{tag}@example.com"),
    phone: format!("+1-{tag}"),
    password: PASSWORD.to_string(),
    name: "Test User".to_string(),
    profile,
  }
}

pub fn new_product(price_cents: i64) -> NewProduct {
  let tag = short_tag();
  NewProduct {
    name: format!("Widget {tag}"),
    sku: format!("SKU-{tag}"),
    description: "A test widget".to_string(),
    price_cents: Some(price_cents),
  }
}
