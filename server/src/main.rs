// marketplace/server/src/main.rs

use std::sync::Arc;

use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use marketplace_core::store;
use marketplace_server::config::AppConfig;
use marketplace_server::migration;
use marketplace_server::state::AppState;
use marketplace_server::web::configure_app_routes;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  tracing::info!(service = ?app_config.role, "Starting marketplace process...");

  let store = store::open(&app_config.database_url, app_config.store_options())
    .await
    .context("Failed to open storage")?;

  let Some(role) = app_config.role.role() else {
    migration::run(store, app_config.bootstrap_admin.as_ref())
      .await
      .context("Migration failed")?;
    tracing::info!("Migration finished.");
    return Ok(());
  };

  let app_state = AppState::new(app_config.clone(), store).context("Failed to build application state")?;

  let server_address = app_config.bind_address();
  tracing::info!(%role, "Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .wrap(NormalizePath::new(TrailingSlash::Trim))
      .wrap(tracing_actix_web::TracingLogger::default())
      .app_data(actix_data::Data::new(app_state.clone()))
      .configure(|cfg| configure_app_routes(cfg, role))
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await?;

  Ok(())
}
