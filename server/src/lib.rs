// marketplace/server/src/lib.rs

pub mod config;
pub mod errors;
pub mod migration;
pub mod state;
pub mod web;
