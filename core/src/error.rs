// marketplace/core/src/error.rs

use serde::Serialize;
use thiserror::Error;

/// One rejected input field and the rule it broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field: String,
  pub reason: String,
}

impl FieldError {
  pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      reason: reason.into(),
    }
  }
}

#[derive(Debug, Error)]
pub enum MarketError {
  #[error("Validation failed on {} field(s)", .0.len())]
  Validation(Vec<FieldError>),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unauthenticated(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("Storage error: {0}")]
  Storage(#[source] sqlx::Error),

  #[error("Migration error: {0}")]
  Migration(#[from] sqlx::migrate::MigrateError),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl MarketError {
  pub fn not_found(message: impl Into<String>) -> Self {
    MarketError::NotFound(message.into())
  }

  pub fn conflict(message: impl Into<String>) -> Self {
    MarketError::Conflict(message.into())
  }

  /// True for failures the client cannot fix by changing the request.
  pub fn is_internal(&self) -> bool {
    matches!(
      self,
      MarketError::Storage(_) | MarketError::Migration(_) | MarketError::Internal(_)
    )
  }
}

// Unique and foreign-key violations are user errors, everything else the
// database reports stays opaque.
impl From<sqlx::Error> for MarketError {
  fn from(err: sqlx::Error) -> Self {
    if let Some(db_err) = err.as_database_error() {
      match db_err.code().as_deref() {
        Some("23505") => {
          return crate::store::unique_violation(db_err.constraint().unwrap_or_default());
        }
        Some("23503") => {
          return crate::store::reference_violation(db_err.constraint().unwrap_or_default());
        }
        _ => {}
      }
    }
    MarketError::Storage(err)
  }
}

pub type MarketResult<T, E = MarketError> = std::result::Result<T, E>;
