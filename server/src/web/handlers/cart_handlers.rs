// marketplace/server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use marketplace_core::validation::FieldErrors;
use marketplace_core::MarketResult;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::CustomerUser;

// --- Request DTOs ---
// Absent fields are a 422, not a body parse failure.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct AddToCartRequestPayload {
  pub product_id: Option<Uuid>,
  pub quantity: Option<i32>,
}

impl AddToCartRequestPayload {
  fn required(&self) -> MarketResult<(Uuid, i32)> {
    let mut errors = FieldErrors::new();
    let product_id = errors.present("product_id", self.product_id);
    let quantity = errors.present("quantity", self.quantity);
    errors.into_result()?;
    Ok((product_id.unwrap_or_default(), quantity.unwrap_or_default()))
  }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct UpdateCartItemPayload {
  pub quantity: Option<i32>,
}

impl UpdateCartItemPayload {
  fn required(&self) -> MarketResult<i32> {
    let mut errors = FieldErrors::new();
    let quantity = errors.present("quantity", self.quantity);
    errors.into_result()?;
    Ok(quantity.unwrap_or_default())
  }
}

// --- Handler Implementations ---

#[instrument(name = "handler::view_cart", skip(app_state, customer), fields(customer_id = %customer.0))]
pub async fn view_cart_handler(
  app_state: web::Data<AppState>,
  customer: CustomerUser,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.carts.view_cart(customer.0).await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, customer),
    fields(customer_id = %customer.0, product_id = ?req_payload.product_id, quantity = ?req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  customer: CustomerUser,
  req_payload: web::Json<AddToCartRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let (product_id, quantity) = req_payload.required()?;
  let item = app_state.carts.add_item(customer.0, product_id, quantity).await?;

  info!(item_id = %item.id, quantity = item.quantity, "Add to cart successful.");
  Ok(HttpResponse::Created().json(json!({ "message": "Product successfully added to cart" })))
}

#[instrument(
    name = "handler::update_cart_item",
    skip(app_state, path, req_payload, customer),
    fields(customer_id = %customer.0, item_id = %path.as_ref(), quantity = ?req_payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  customer: CustomerUser,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateCartItemPayload>,
) -> Result<HttpResponse, AppError> {
  let quantity = req_payload.required()?;
  let item = app_state.carts.update_item(customer.0, path.into_inner(), quantity).await?;
  Ok(HttpResponse::Ok().json(item))
}

#[instrument(
    name = "handler::remove_cart_item",
    skip(app_state, path, customer),
    fields(customer_id = %customer.0, item_id = %path.as_ref())
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  customer: CustomerUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.carts.remove_item(customer.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Cart item deleted successfully" })))
}
