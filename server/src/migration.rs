// marketplace/server/src/migration.rs

//! The `migration` process variant: schema upgrade plus the optional
//! bootstrap admin.

use std::sync::Arc;

use marketplace_core::models::{NewAccount, Profile};
use marketplace_core::{IdentityService, MarketError, Role, Store};
use tracing::{info, instrument};

use crate::config::BootstrapAdmin;
use crate::errors::Result;

#[instrument(name = "migration::run", skip(store, bootstrap_admin))]
pub async fn run(store: Arc<dyn Store>, bootstrap_admin: Option<&BootstrapAdmin>) -> Result<()> {
  store.migrate().await?;
  info!("Database schema is up to date.");

  if let Some(admin) = bootstrap_admin {
    seed_admin(store, admin).await?;
  }
  Ok(())
}

// Re-running the migration keeps the admin that is already there.
async fn seed_admin(store: Arc<dyn Store>, admin: &BootstrapAdmin) -> Result<()> {
  let identity = IdentityService::new(store);
  let new_admin = NewAccount {
    email: admin.email.clone(),
    phone: admin.phone.clone(),
    password: admin.password.clone(),
    name: admin.name.clone(),
    profile: Profile::for_role(Role::Admin, admin.username.clone()),
  };

  match identity.register(new_admin).await {
    Ok(account) => {
      info!(admin_id = %account.id, "Bootstrap admin created.");
      Ok(())
    }
    Err(MarketError::Conflict(reason)) => {
      info!(%reason, "Bootstrap admin already present, skipping.");
      Ok(())
    }
    Err(e) => Err(e.into()),
  }
}
