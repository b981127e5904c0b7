// marketplace/core/src/services/identity.rs

//! Customers, sellers and admins: registration, login, profile management
//! and account deletion.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{catalog, orders};
use crate::auth::{hash_password, verify_password, Role};
use crate::error::{MarketError, MarketResult};
use crate::models::{Account, AccountUpdate, NewAccount, Profile};
use crate::store::{Store, StoreTx};
use crate::validation::FieldErrors;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn label(role: Role) -> &'static str {
  match role {
    Role::Customer => "Customer",
    Role::Seller => "Seller",
    Role::Admin => "Admin",
  }
}

#[derive(Clone)]
pub struct IdentityService {
  store: Arc<dyn Store>,
}

impl IdentityService {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }

  #[instrument(
    name = "identity::register",
    skip(self, input),
    fields(role = %input.profile.role(), email = %input.email)
  )]
  pub async fn register(&self, input: NewAccount) -> MarketResult<Account> {
    let role = input.profile.role();
    let mut errors = FieldErrors::new();
    errors.email("email", &input.email);
    errors.required("phone", &input.phone);
    errors.password("password", &input.password);
    errors.required("name", &input.name);
    errors.required(Profile::detail_field(role), input.profile.detail());
    errors.into_result()?;

    // Hash outside the transaction, argon2 is deliberately slow.
    let password_hash = hash_password(&input.password)?;
    let now = Utc::now();
    let account = Account {
      id: Uuid::new_v4(),
      email: input.email,
      phone: input.phone,
      password_hash,
      name: input.name,
      profile: input.profile,
      created_at: now,
      updated_at: now,
    };

    let mut tx = self.store.begin().await?;
    tx.insert_account(&account).await?;
    tx.commit().await?;

    info!(account_id = %account.id, "Account registered.");
    Ok(account)
  }

  /// Resolves an account from credentials. Unknown email and wrong password
  /// are indistinguishable to the caller.
  #[instrument(name = "identity::authenticate", skip(self, password), fields(role = %role, email = %email))]
  pub async fn authenticate(&self, role: Role, email: &str, password: &str) -> MarketResult<Account> {
    let mut errors = FieldErrors::new();
    errors.required("email", email);
    errors.required("password", password);
    errors.into_result()?;

    let found = {
      let mut tx = self.store.begin().await?;
      tx.find_account_by_email(role, email).await?
    };

    let Some(account) = found else {
      warn!("Login attempt for unknown email.");
      return Err(MarketError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    };
    if !verify_password(&account.password_hash, password)? {
      warn!(account_id = %account.id, "Login attempt with wrong password.");
      return Err(MarketError::Unauthenticated(INVALID_CREDENTIALS.to_string()));
    }

    info!(account_id = %account.id, "Login succeeded.");
    Ok(account)
  }

  pub async fn get(&self, role: Role, id: Uuid) -> MarketResult<Account> {
    let mut tx = self.store.begin().await?;
    let account = tx.find_account(role, id).await?;
    account.ok_or_else(|| MarketError::not_found(format!("{} not found", label(role))))
  }

  pub async fn list(&self, role: Role) -> MarketResult<Vec<Account>> {
    let mut tx = self.store.begin().await?;
    let accounts = tx.list_accounts(role).await?;
    if accounts.is_empty() {
      return Err(MarketError::not_found(format!("No {}s found", role)));
    }
    Ok(accounts)
  }

  /// Applies the fields present in `update`. A field set to its current
  /// value is not a uniqueness conflict.
  #[instrument(name = "identity::update", skip(self, update), fields(role = %role, account_id = %id))]
  pub async fn update(&self, role: Role, id: Uuid, update: AccountUpdate) -> MarketResult<Account> {
    let mut errors = FieldErrors::new();
    if let Some(email) = &update.email {
      errors.email("email", email);
    }
    if let Some(phone) = &update.phone {
      errors.required("phone", phone);
    }
    if let Some(password) = &update.password {
      errors.password("password", password);
    }
    if let Some(name) = &update.name {
      errors.required("name", name);
    }
    if let Some(detail) = &update.detail {
      errors.required(Profile::detail_field(role), detail);
    }
    errors.into_result()?;

    let password_hash = match &update.password {
      Some(password) => Some(hash_password(password)?),
      None => None,
    };

    let mut tx = self.store.begin().await?;
    let mut account = tx
      .find_account(role, id)
      .await?
      .ok_or_else(|| MarketError::not_found(format!("{} not found", label(role))))?;
    if update.is_empty() {
      return Ok(account);
    }

    if let Some(email) = update.email {
      account.email = email;
    }
    if let Some(phone) = update.phone {
      account.phone = phone;
    }
    if let Some(hash) = password_hash {
      account.password_hash = hash;
    }
    if let Some(name) = update.name {
      account.name = name;
    }
    if let Some(detail) = update.detail {
      account.profile = Profile::for_role(role, detail);
    }
    account.updated_at = Utc::now();

    tx.update_account(&account).await?;
    tx.commit().await?;

    info!("Account updated.");
    Ok(account)
  }

  /// Deletes the account and everything it owns in one transaction.
  #[instrument(name = "identity::delete", skip(self), fields(role = %role, account_id = %id))]
  pub async fn delete(&self, role: Role, id: Uuid) -> MarketResult<()> {
    let mut tx = self.store.begin().await?;
    if !tx.lock_account(role, id).await? {
      return Err(MarketError::not_found(format!("{} not found", label(role))));
    }

    match role {
      Role::Customer => remove_customer_records(tx.as_mut(), id).await?,
      Role::Seller => {
        for product in tx.list_products_by_seller(id).await? {
          catalog::remove_product(tx.as_mut(), &product).await?;
        }
      }
      Role::Admin => {}
    }
    tx.delete_account(role, id).await?;
    tx.commit().await?;

    info!("Account deleted.");
    Ok(())
  }
}

// Orders (with payment and shipping), line items and carts of a customer.
async fn remove_customer_records(tx: &mut dyn StoreTx, customer_id: Uuid) -> MarketResult<()> {
  for cart in tx.list_carts_for_customer(customer_id).await? {
    if let Some(order) = tx.find_order_for_cart(cart.id).await? {
      orders::remove_order(tx, order.id).await?;
    }
    for item in tx.list_cart_items(cart.id).await? {
      tx.delete_cart_item(item.id).await?;
    }
    tx.delete_cart(cart.id).await?;
  }
  Ok(())
}
