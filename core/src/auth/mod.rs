// marketplace/core/src/auth/mod.rs

//! Identity primitives shared by every process variant: roles, the resolved
//! caller (`Subject`), password hashing and signed tokens.

pub mod password;
pub mod token;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MarketError, MarketResult};

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenService};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Customer,
  Seller,
  Admin,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Role::Customer => "customer",
      Role::Seller => "seller",
      Role::Admin => "admin",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The authenticated caller resolved from a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
  pub id: Uuid,
  pub role: Role,
}

impl Subject {
  /// Fails with `Forbidden` unless the caller holds `role`.
  pub fn require(self, role: Role) -> MarketResult<Uuid> {
    if self.role == role {
      Ok(self.id)
    } else {
      Err(MarketError::Forbidden(format!("Access forbidden: {}s only", role)))
    }
  }
}
