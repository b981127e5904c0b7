// marketplace/server/src/web/handlers/payment_handlers.rs

//! Admin view of every order, its shipping info and payment.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

#[derive(Deserialize, Debug)]
pub struct PaymentStatusPayload {
  pub paid: bool,
}

#[instrument(name = "handler::all_orders", skip(app_state, admin), fields(admin_id = %admin.0))]
pub async fn all_orders_handler(app_state: web::Data<AppState>, admin: AdminUser) -> Result<HttpResponse, AppError> {
  let orders = app_state.orders.all_orders().await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::order", skip(app_state, admin, path), fields(admin_id = %admin.0, order_id = %path.as_ref()))]
pub async fn order_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = app_state.orders.order(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::shipping_info", skip(app_state, admin, path), fields(admin_id = %admin.0, order_id = %path.as_ref()))]
pub async fn shipping_info_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let shipping_info = app_state.orders.shipping_info(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(shipping_info))
}

#[instrument(name = "handler::payment", skip(app_state, admin, path), fields(admin_id = %admin.0, order_id = %path.as_ref()))]
pub async fn payment_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let payment = app_state.orders.payment(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(payment))
}

#[instrument(
  name = "handler::update_payment_status",
  skip(app_state, admin, path, payload),
  fields(admin_id = %admin.0, order_id = %path.as_ref(), paid = payload.paid)
)]
pub async fn update_payment_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  path: web::Path<Uuid>,
  payload: web::Json<PaymentStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let payment = app_state.orders.set_payment_status(path.into_inner(), payload.paid).await?;
  info!(payment_id = %payment.id, "Payment status updated by admin.");
  Ok(HttpResponse::Ok().json(payment))
}
