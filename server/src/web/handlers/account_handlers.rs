// marketplace/server/src/web/handlers/account_handlers.rs

//! Registration, the caller's own profile, and admin management of
//! customer and seller accounts.

use actix_web::{web, HttpResponse};
use marketplace_core::models::{AccountUpdate, NewAccount, Profile};
use marketplace_core::Role;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::{AdminUser, AuthenticatedUser};

// --- Request DTOs ---

// Absent fields deserialize empty and are reported by validation.
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterPayload {
  pub email: String,
  pub phone: String,
  pub password: String,
  pub name: String,
  pub address: String,
  pub store_name: String,
  pub username: String,
}

impl RegisterPayload {
  fn into_new_account(self, role: Role) -> NewAccount {
    let detail = match role {
      Role::Customer => self.address,
      Role::Seller => self.store_name,
      Role::Admin => self.username,
    };
    NewAccount {
      email: self.email,
      phone: self.phone,
      password: self.password,
      name: self.name,
      profile: Profile::for_role(role, detail),
    }
  }
}

#[derive(Deserialize, Default)]
pub struct UpdateAccountPayload {
  pub email: Option<String>,
  pub phone: Option<String>,
  pub password: Option<String>,
  pub name: Option<String>,
  pub address: Option<String>,
  pub store_name: Option<String>,
  pub username: Option<String>,
}

impl UpdateAccountPayload {
  fn into_update(self, role: Role) -> AccountUpdate {
    let detail = match role {
      Role::Customer => self.address,
      Role::Seller => self.store_name,
      Role::Admin => self.username,
    };
    AccountUpdate {
      email: self.email,
      phone: self.phone,
      password: self.password,
      name: self.name,
      detail,
    }
  }
}

// --- Registration ---

async fn register(app_state: &AppState, role: Role, payload: RegisterPayload) -> Result<HttpResponse, AppError> {
  let account = app_state.identity.register(payload.into_new_account(role)).await?;
  info!(account_id = %account.id, role = %role, "Registration successful.");
  Ok(HttpResponse::Created().json(account))
}

#[instrument(name = "handler::register_customer", skip(app_state, payload))]
pub async fn register_customer_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  register(&app_state, Role::Customer, payload.into_inner()).await
}

#[instrument(name = "handler::register_seller", skip(app_state, payload))]
pub async fn register_seller_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  register(&app_state, Role::Seller, payload.into_inner()).await
}

/// Only an existing admin may create another admin.
#[instrument(name = "handler::register_admin", skip(app_state, admin, payload), fields(admin_id = %admin.0))]
pub async fn register_admin_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  register(&app_state, Role::Admin, payload.into_inner()).await
}

// --- Own profile ---

#[instrument(name = "handler::get_profile", skip(app_state, user), fields(account_id = %user.id, role = %user.role))]
pub async fn get_profile_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let account = app_state.identity.get(user.role, user.id).await?;
  Ok(HttpResponse::Ok().json(account))
}

#[instrument(
  name = "handler::update_profile",
  skip(app_state, user, payload),
  fields(account_id = %user.id, role = %user.role)
)]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  payload: web::Json<UpdateAccountPayload>,
) -> Result<HttpResponse, AppError> {
  let update = payload.into_inner().into_update(user.role);
  let account = app_state.identity.update(user.role, user.id, update).await?;
  Ok(HttpResponse::Ok().json(account))
}

// --- Admin management of customers and sellers ---

async fn list_accounts(app_state: &AppState, role: Role) -> Result<HttpResponse, AppError> {
  let accounts = app_state.identity.list(role).await?;
  Ok(HttpResponse::Ok().json(accounts))
}

async fn get_account(app_state: &AppState, role: Role, id: Uuid) -> Result<HttpResponse, AppError> {
  let account = app_state.identity.get(role, id).await?;
  Ok(HttpResponse::Ok().json(account))
}

async fn update_account(
  app_state: &AppState,
  role: Role,
  id: Uuid,
  payload: UpdateAccountPayload,
) -> Result<HttpResponse, AppError> {
  let account = app_state.identity.update(role, id, payload.into_update(role)).await?;
  Ok(HttpResponse::Ok().json(account))
}

async fn delete_account(app_state: &AppState, role: Role, id: Uuid) -> Result<HttpResponse, AppError> {
  app_state.identity.delete(role, id).await?;
  let message = match role {
    Role::Customer => "Customer deleted successfully",
    Role::Seller => "Seller deleted successfully",
    Role::Admin => "Admin deleted successfully",
  };
  Ok(HttpResponse::Ok().json(json!({ "message": message })))
}

#[instrument(name = "handler::list_customers", skip(app_state, admin), fields(admin_id = %admin.0))]
pub async fn list_customers_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
) -> Result<HttpResponse, AppError> {
  list_accounts(&app_state, Role::Customer).await
}

#[instrument(name = "handler::get_customer", skip(app_state, admin, path), fields(admin_id = %admin.0, customer_id = %path.as_ref()))]
pub async fn get_customer_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  get_account(&app_state, Role::Customer, path.into_inner()).await
}

#[instrument(name = "handler::update_customer", skip(app_state, admin, path, payload), fields(admin_id = %admin.0, customer_id = %path.as_ref()))]
pub async fn update_customer_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateAccountPayload>,
) -> Result<HttpResponse, AppError> {
  update_account(&app_state, Role::Customer, path.into_inner(), payload.into_inner()).await
}

#[instrument(name = "handler::delete_customer", skip(app_state, admin, path), fields(admin_id = %admin.0, customer_id = %path.as_ref()))]
pub async fn delete_customer_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  delete_account(&app_state, Role::Customer, path.into_inner()).await
}

#[instrument(name = "handler::list_sellers", skip(app_state, admin), fields(admin_id = %admin.0))]
pub async fn list_sellers_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  list_accounts(&app_state, Role::Seller).await
}

#[instrument(name = "handler::get_seller", skip(app_state, admin, path), fields(admin_id = %admin.0, seller_id = %path.as_ref()))]
pub async fn get_seller_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  get_account(&app_state, Role::Seller, path.into_inner()).await
}

#[instrument(name = "handler::update_seller", skip(app_state, admin, path, payload), fields(admin_id = %admin.0, seller_id = %path.as_ref()))]
pub async fn update_seller_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateAccountPayload>,
) -> Result<HttpResponse, AppError> {
  update_account(&app_state, Role::Seller, path.into_inner(), payload.into_inner()).await
}

#[instrument(name = "handler::delete_seller", skip(app_state, admin, path), fields(admin_id = %admin.0, seller_id = %path.as_ref()))]
pub async fn delete_seller_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  delete_account(&app_state, Role::Seller, path.into_inner()).await
}
