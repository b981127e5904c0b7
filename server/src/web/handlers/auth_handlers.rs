// marketplace/server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use marketplace_core::Subject;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

/// Liveness plus a storage round-trip.
pub async fn health_check_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  app_state.store.health_check().await?;
  Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}

/// Logs in against the identity table of the role this process serves.
#[instrument(
    name = "handler::login",
    skip(app_state, req_payload),
    fields(role = %app_state.role, req_email = %req_payload.email)
)]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let account = app_state
    .identity
    .authenticate(app_state.role, &req_payload.email, &req_payload.password)
    .await?;
  let token = app_state.tokens.issue(Subject {
    id: account.id,
    role: app_state.role,
  })?;

  info!(account_id = %account.id, "Signin successful.");
  Ok(HttpResponse::Ok().json(json!({ "token": token })))
}
