// marketplace/core/src/models/account.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Role;

/// The role-specific part of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Profile {
  Customer { address: String },
  Seller { store_name: String },
  Admin { username: String },
}

impl Profile {
  /// Builds the profile of `role` around its single extra field.
  pub fn for_role(role: Role, detail: String) -> Self {
    match role {
      Role::Customer => Profile::Customer { address: detail },
      Role::Seller => Profile::Seller { store_name: detail },
      Role::Admin => Profile::Admin { username: detail },
    }
  }

  pub fn role(&self) -> Role {
    match self {
      Profile::Customer { .. } => Role::Customer,
      Profile::Seller { .. } => Role::Seller,
      Profile::Admin { .. } => Role::Admin,
    }
  }

  pub fn detail(&self) -> &str {
    match self {
      Profile::Customer { address } => address,
      Profile::Seller { store_name } => store_name,
      Profile::Admin { username } => username,
    }
  }

  /// JSON field name of the extra field, used in validation reports.
  pub fn detail_field(role: Role) -> &'static str {
    match role {
      Role::Customer => "address",
      Role::Seller => "store_name",
      Role::Admin => "username",
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Account {
  pub id: Uuid,
  pub email: String,
  pub phone: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub name: String,
  #[serde(flatten)]
  pub profile: Profile,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Account {
  pub fn role(&self) -> Role {
    self.profile.role()
  }
}

/// Registration input, password still in plain text.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email: String,
  pub phone: String,
  pub password: String,
  pub name: String,
  pub profile: Profile,
}

/// Partial update. `None` leaves the stored value untouched; `Some` is
/// validated like registration input, so an empty string is rejected
/// rather than treated as "absent".
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
  pub email: Option<String>,
  pub phone: Option<String>,
  pub password: Option<String>,
  pub name: Option<String>,
  pub detail: Option<String>,
}

impl AccountUpdate {
  pub fn is_empty(&self) -> bool {
    self.email.is_none()
      && self.phone.is_none()
      && self.password.is_none()
      && self.name.is_none()
      && self.detail.is_none()
  }
}
