// marketplace/server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use marketplace_core::models::{NewProduct, ProductUpdate};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::{AuthenticatedUser, SellerUser};

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CreateProductPayload {
  pub name: String,
  pub sku: String,
  pub description: String,
  pub price_cents: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct UpdateProductPayload {
  pub name: Option<String>,
  pub sku: Option<String>,
  pub description: Option<String>,
  pub price_cents: Option<i64>,
}

// --- Catalog reads (customers and admins) ---

#[instrument(name = "handler::list_products", skip(app_state, user), fields(caller_id = %user.id))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.list().await?;
  info!("Successfully fetched {} products.", products.len());
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(name = "handler::get_product", skip(app_state, path, _user), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  _user: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.get(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(product))
}

// --- Seller catalog ---

#[instrument(
  name = "handler::create_product",
  skip(app_state, seller, payload),
  fields(seller_id = %seller.0, sku = %payload.sku)
)]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
  payload: web::Json<CreateProductPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let input = NewProduct {
    name: payload.name,
    sku: payload.sku,
    description: payload.description,
    price_cents: payload.price_cents,
  };
  let product = app_state.catalog.create(seller.0, input).await?;
  Ok(HttpResponse::Created().json(product))
}

#[instrument(name = "handler::seller_products", skip(app_state, seller), fields(seller_id = %seller.0))]
pub async fn seller_products_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.seller_products(seller.0).await?;
  Ok(HttpResponse::Ok().json(products))
}

#[instrument(
  name = "handler::seller_product",
  skip(app_state, seller, path),
  fields(seller_id = %seller.0, product_id = %path.as_ref())
)]
pub async fn seller_product_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.catalog.seller_product(seller.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(
  name = "handler::update_product",
  skip(app_state, seller, path, payload),
  fields(seller_id = %seller.0, product_id = %path.as_ref())
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateProductPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let update = ProductUpdate {
    name: payload.name,
    sku: payload.sku,
    description: payload.description,
    price_cents: payload.price_cents,
  };
  let product = app_state.catalog.update(seller.0, path.into_inner(), update).await?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(
  name = "handler::delete_product",
  skip(app_state, seller, path),
  fields(seller_id = %seller.0, product_id = %path.as_ref())
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.catalog.delete(seller.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted successfully" })))
}
