// marketplace/core/src/lib.rs

//! Marketplace domain: accounts for customers, sellers and admins, a
//! seller-owned catalog, per-customer carts and the order workflow that
//! turns a cart into an order with shipping and payment records.
//!
//! Every service operation is one storage transaction against a [`Store`],
//! either PostgreSQL ([`PgStore`]) or the in-process [`MemoryStore`].

pub mod auth;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod validation;

// --- Re-exports for the Public API ---

pub use crate::auth::{Role, Subject, TokenService};
pub use crate::error::{FieldError, MarketError, MarketResult};
pub use crate::services::{CartService, CatalogService, IdentityService, OrderService};
pub use crate::store::{MemoryStore, PgStore, PgStoreOptions, Store, StoreTx};
