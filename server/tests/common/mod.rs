// marketplace/server/tests/common/mod.rs
#![allow(dead_code, unused_macros)] // Not every test binary uses every fixture

use std::sync::Arc;

use marketplace_core::models::{Account, NewAccount, NewProduct, Product, Profile};
use marketplace_core::{MemoryStore, Role, Store, Subject};
use marketplace_server::config::{AppConfig, ServiceRole};
use marketplace_server::state::AppState;
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

pub fn test_config(role: ServiceRole) -> AppConfig {
  AppConfig {
    role,
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: "memory".to_string(),
    signing_key: "test-signing-key".to_string(),
    token_ttl_hours: 1,
    storage_timeout_secs: 5,
    db_max_connections: 1,
    bootstrap_admin: None,
  }
}

pub fn memory_store() -> Arc<dyn Store> {
  setup_tracing();
  Arc::new(MemoryStore::new())
}

/// State of one process variant. Variants built on the same store see the
/// same data, like the deployed processes sharing one database.
pub fn state_for(role: ServiceRole, store: Arc<dyn Store>) -> AppState {
  AppState::new(Arc::new(test_config(role)), store).unwrap()
}

/// Builds the routed service for `$state` the way `main` does.
macro_rules! spawn_app {
  ($state:expr) => {{
    let state: marketplace_server::state::AppState = $state;
    let role = state.role;
    actix_web::test::init_service(
      actix_web::App::new()
        .wrap(actix_web::middleware::NormalizePath::new(
          actix_web::middleware::TrailingSlash::Trim,
        ))
        .app_data(actix_web::web::Data::new(state))
        .configure(move |cfg| marketplace_server::web::configure_app_routes(cfg, role)),
    )
    .await
  }};
}

pub fn bearer(state: &AppState, id: Uuid, role: Role) -> (&'static str, String) {
  let token = state.tokens.issue(Subject { id, role }).unwrap();
  ("Authorization", format!("Bearer {token}"))
}

pub fn short_tag() -> String {
  Uuid::new_v4().simple().to_string()[..12].to_string()
}

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

pub async fn seller_with_product(state: &AppState, price_cents: i64) -> (Account, Product) {
  let tag = short_tag();
  let seller = state
    .identity
    .register(new_account(Profile::Seller { store_name: format!("Store {tag}") }))
    .await
    .unwrap();
  let product = state
    .catalog
    .create(
      seller.id,
      NewProduct {
        name: format!("Widget {tag}"),
        sku: format!("SKU-{tag}"),
        description: "A test widget".to_string(),
        price_cents: Some(price_cents),
      },
    )
    .await
    .unwrap();
  (seller, product)
}

pub async fn customer(state: &AppState) -> Account {
  state
    .identity
    .register(new_account(Profile::Customer { address: "1 Main St".to_string() }))
    .await
    .unwrap()
}
