// marketplace/server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use marketplace_core::MarketError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Market(#[from] MarketError),

  // Malformed JSON bodies and path parameters.
  #[error("{0}")]
  BadRequest(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("I/O Error: {0}")]
  Io(#[from] std::io::Error),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Market(err) => match err {
        MarketError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MarketError::BadRequest(_) => StatusCode::BAD_REQUEST,
        MarketError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        MarketError::Forbidden(_) => StatusCode::FORBIDDEN,
        MarketError::NotFound(_) => StatusCode::NOT_FOUND,
        MarketError::Conflict(_) => StatusCode::CONFLICT,
        MarketError::Storage(_) | MarketError::Migration(_) | MarketError::Internal(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
      AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
      AppError::Config(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      // Log the full error, the client only learns that something failed.
      tracing::error!(application_error = %self, "Responding with internal error");
      return HttpResponse::build(status).json(json!({
        "error": "internal_error",
        "message": "Internal Server Error",
      }));
    }

    tracing::warn!(status = status.as_u16(), application_error = %self, "Responding with client error");
    match self {
      AppError::Market(MarketError::Validation(fields)) => HttpResponse::build(status).json(json!({
        "message": "Validation failed",
        "errors": fields,
      })),
      other => HttpResponse::build(status).json(json!({ "message": other.to_string() })),
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
