// marketplace/server/src/config.rs

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use marketplace_core::{PgStoreOptions, Role};

use crate::errors::{AppError, Result};

/// Which surface this process serves. `Migration` applies the schema and exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
  Customers,
  Sellers,
  Admins,
  Migration,
}

impl ServiceRole {
  /// The identity role whose routes this process mounts.
  pub fn role(self) -> Option<Role> {
    match self {
      ServiceRole::Customers => Some(Role::Customer),
      ServiceRole::Sellers => Some(Role::Seller),
      ServiceRole::Admins => Some(Role::Admin),
      ServiceRole::Migration => None,
    }
  }
}

impl FromStr for ServiceRole {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "customers" => Ok(ServiceRole::Customers),
      "sellers" => Ok(ServiceRole::Sellers),
      "admins" => Ok(ServiceRole::Admins),
      "migration" => Ok(ServiceRole::Migration),
      other => Err(AppError::Config(format!(
        "Invalid SERVICE '{}', expected one of: customers, sellers, admins, migration",
        other
      ))),
    }
  }
}

/// First admin account, seeded by the migration run.
#[derive(Clone)]
pub struct BootstrapAdmin {
  pub email: String,
  pub phone: String,
  pub password: String,
  pub name: String,
  pub username: String,
}

#[derive(Clone)]
pub struct AppConfig {
  pub role: ServiceRole,
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub signing_key: String,
  pub token_ttl_hours: i64,
  pub storage_timeout_secs: u64,
  pub db_max_connections: u32,
  pub bootstrap_admin: Option<BootstrapAdmin>,
}

// Keys, passwords and connection strings stay out of logs.
impl fmt::Debug for AppConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("AppConfig")
      .field("role", &self.role)
      .field("server_host", &self.server_host)
      .field("server_port", &self.server_port)
      .field("database_url", &"[REDACTED]")
      .field("signing_key", &"[REDACTED]")
      .field("token_ttl_hours", &self.token_ttl_hours)
      .field("storage_timeout_secs", &self.storage_timeout_secs)
      .field("db_max_connections", &self.db_max_connections)
      .field("bootstrap_admin", &self.bootstrap_admin.as_ref().map(|a| &a.email))
      .finish()
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let role = get_env("SERVICE")?.parse::<ServiceRole>()?;
    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    // Only the serving processes sign and verify tokens.
    let signing_key = match role {
      ServiceRole::Migration => get_env("JWT_SIGNING_KEY").unwrap_or_default(),
      _ => get_env("JWT_SIGNING_KEY")?,
    };
    if role != ServiceRole::Migration && signing_key.is_empty() {
      return Err(AppError::Config("JWT_SIGNING_KEY must not be empty".to_string()));
    }

    let token_ttl_hours = get_env("TOKEN_TTL_HOURS")
      .unwrap_or_else(|_| "24".to_string())
      .parse::<i64>()
      .ok()
      .filter(|hours| *hours > 0)
      .ok_or_else(|| AppError::Config("TOKEN_TTL_HOURS must be a positive integer".to_string()))?;
    let storage_timeout_secs = get_env("STORAGE_TIMEOUT_SECS")
      .unwrap_or_else(|_| "5".to_string())
      .parse::<u64>()
      .map_err(|e| AppError::Config(format!("Invalid STORAGE_TIMEOUT_SECS: {}", e)))?;
    let db_max_connections = get_env("DB_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DB_MAX_CONNECTIONS: {}", e)))?;

    let bootstrap_admin = match get_env("BOOTSTRAP_ADMIN_EMAIL") {
      Ok(email) => Some(BootstrapAdmin {
        email,
        phone: get_env("BOOTSTRAP_ADMIN_PHONE")?,
        password: get_env("BOOTSTRAP_ADMIN_PASSWORD")?,
        name: get_env("BOOTSTRAP_ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string()),
        username: get_env("BOOTSTRAP_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
      }),
      Err(_) => None,
    };

    let config = Self {
      role,
      server_host,
      server_port,
      database_url,
      signing_key,
      token_ttl_hours,
      storage_timeout_secs,
      db_max_connections,
      bootstrap_admin,
    };
    tracing::info!(config = ?config, "Application configuration loaded successfully.");
    Ok(config)
  }

  pub fn store_options(&self) -> PgStoreOptions {
    let timeout = Duration::from_secs(self.storage_timeout_secs);
    PgStoreOptions {
      max_connections: self.db_max_connections,
      acquire_timeout: timeout,
      statement_timeout: timeout,
    }
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn service_role_parses_known_values_only() {
    assert_eq!("sellers".parse::<ServiceRole>().unwrap(), ServiceRole::Sellers);
    assert_eq!("migration".parse::<ServiceRole>().unwrap().role(), None);
    assert_eq!(ServiceRole::Admins.role(), Some(Role::Admin));
    assert!("Sellers".parse::<ServiceRole>().is_err());
    assert!("".parse::<ServiceRole>().is_err());
  }
}
