// marketplace/server/src/state.rs
use std::sync::Arc;

use chrono::Duration;
use marketplace_core::{CartService, CatalogService, IdentityService, OrderService, Role, Store, TokenService};

use crate::config::AppConfig;
use crate::errors::{AppError, Result};

#[derive(Clone)]
pub struct AppState {
  /// The role this process serves; login and every guarded route use it.
  pub role: Role,
  pub store: Arc<dyn Store>,
  pub identity: IdentityService,
  pub catalog: CatalogService,
  pub carts: CartService,
  pub orders: OrderService,
  pub tokens: Arc<TokenService>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  pub fn new(config: Arc<AppConfig>, store: Arc<dyn Store>) -> Result<Self> {
    let role = config
      .role
      .role()
      .ok_or_else(|| AppError::Config("The migration service does not serve HTTP".to_string()))?;
    let tokens = TokenService::new(config.signing_key.as_bytes(), Duration::hours(config.token_ttl_hours))?;

    Ok(Self {
      role,
      identity: IdentityService::new(store.clone()),
      catalog: CatalogService::new(store.clone()),
      carts: CartService::new(store.clone()),
      orders: OrderService::new(store.clone()),
      store,
      tokens: Arc::new(tokens),
      config,
    })
  }
}
