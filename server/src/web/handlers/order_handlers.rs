// marketplace/server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::{CustomerUser, SellerUser};

// --- Request DTOs ---

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct PlaceOrderPayload {
  pub address: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LineItemStatusPayload {
  pub status: String,
}

// --- Customer orders ---

#[instrument(name = "handler::place_order", skip(app_state, customer, payload), fields(customer_id = %customer.0))]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  customer: CustomerUser,
  payload: web::Json<PlaceOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let details = app_state
    .orders
    .place_order(customer.0, payload.into_inner().address)
    .await?;

  info!(
    order_id = %details.order.id,
    total_cents = details.order.total_amount_cents,
    "Order placement successful."
  );
  Ok(HttpResponse::Ok().json(details))
}

#[instrument(name = "handler::customer_orders", skip(app_state, customer), fields(customer_id = %customer.0))]
pub async fn customer_orders_handler(
  app_state: web::Data<AppState>,
  customer: CustomerUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.orders.customer_orders(customer.0).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(
  name = "handler::customer_order",
  skip(app_state, customer, path),
  fields(customer_id = %customer.0, order_id = %path.as_ref())
)]
pub async fn customer_order_handler(
  app_state: web::Data<AppState>,
  customer: CustomerUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.customer_order(customer.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

// --- Seller fulfillment ---

#[instrument(name = "handler::seller_orders", skip(app_state, seller), fields(seller_id = %seller.0))]
pub async fn seller_orders_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.orders.seller_orders(seller.0).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(
  name = "handler::seller_order",
  skip(app_state, seller, path),
  fields(seller_id = %seller.0, order_id = %path.as_ref())
)]
pub async fn seller_order_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.seller_order(seller.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(
  name = "handler::seller_shipping_info",
  skip(app_state, seller, path),
  fields(seller_id = %seller.0, order_id = %path.as_ref())
)]
pub async fn seller_shipping_info_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let shipping_info = app_state.orders.seller_shipping_info(seller.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(shipping_info))
}

#[instrument(
  name = "handler::delete_order",
  skip(app_state, seller, path),
  fields(seller_id = %seller.0, order_id = %path.as_ref())
)]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  app_state.orders.delete_order(seller.0, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Order deleted successfully" })))
}

#[instrument(
  name = "handler::update_line_item_status",
  skip(app_state, seller, path, payload),
  fields(seller_id = %seller.0, status = %payload.status)
)]
pub async fn update_line_item_status_handler(
  app_state: web::Data<AppState>,
  seller: SellerUser,
  path: web::Path<(Uuid, Uuid)>,
  payload: web::Json<LineItemStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let (order_id, item_id) = path.into_inner();
  app_state
    .orders
    .update_line_item_status(seller.0, order_id, item_id, &payload.status)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Order item status successfully updated." })))
}
