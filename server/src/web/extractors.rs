// marketplace/server/src/web/extractors.rs

//! Request guards. Authentication (401) is always decided before the role
//! check (403).

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use marketplace_core::{MarketError, Role, Subject};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

fn authenticate(req: &HttpRequest) -> Result<Subject, AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| MarketError::Internal("Application state is not configured".to_string()))?;

  let token = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|token| !token.is_empty());
  let Some(token) = token else {
    warn!(path = %req.path(), "Missing or malformed Authorization header.");
    return Err(MarketError::Unauthenticated("Authorization header is missing or malformed".to_string()).into());
  };

  Ok(state.tokens.verify(token)?)
}

fn authenticate_as(req: &HttpRequest, role: Role) -> Result<Uuid, AppError> {
  let subject = authenticate(req)?;
  subject.require(role).map_err(|err| {
    warn!(subject_id = %subject.id, caller_role = %subject.role, required_role = %role, "Role check failed.");
    err.into()
  })
}

/// A caller whose role is the one this process serves.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
  pub id: Uuid,
  pub role: Role,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let served = req.app_data::<web::Data<AppState>>().map(|state| state.role);
    let result = match served {
      Some(role) => authenticate_as(req, role).map(|id| AuthenticatedUser { id, role }),
      None => Err(MarketError::Internal("Application state is not configured".to_string()).into()),
    };
    ready(result)
  }
}

#[derive(Debug, Clone, Copy)]
pub struct CustomerUser(pub Uuid);

impl FromRequest for CustomerUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate_as(req, Role::Customer).map(CustomerUser))
  }
}

#[derive(Debug, Clone, Copy)]
pub struct SellerUser(pub Uuid);

impl FromRequest for SellerUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate_as(req, Role::Seller).map(SellerUser))
  }
}

#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub Uuid);

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate_as(req, Role::Admin).map(AdminUser))
  }
}
