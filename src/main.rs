// src/main.rs

use std::sync::Arc;

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use chrono::Duration;
use sqlx::PgPool;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use mercato::cart::engine::CartEngine;
use mercato::config::AppConfig;
use mercato::services::{AdminInviteCodes, TokenService};
use mercato::state::AppState;
use mercato::store::postgres::{PgCartStore, PgCatalogStore, PgCredentialStore};
use mercato::store::{CatalogStore, CredentialStore};
use mercato::web::routes::configure_app_routes;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting mercato server...");

  let app_config = Arc::new(AppConfig::from_env().context("loading configuration")?);

  let db_pool = PgPool::connect(&app_config.database_url)
    .await
    .context("connecting to the database")?;
  tracing::info!("Connected to the database.");

  sqlx::migrate!("./migrations")
    .run(&db_pool)
    .await
    .context("running database migrations")?;

  let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(db_pool.clone()));
  let catalog: Arc<dyn CatalogStore> = Arc::new(PgCatalogStore::new(db_pool.clone()));
  let carts = Arc::new(CartEngine::new(
    Arc::new(PgCartStore::new(db_pool.clone())),
    catalog.clone(),
  ));
  let tokens = Arc::new(TokenService::new(
    app_config.token_secret.as_bytes(),
    Duration::hours(app_config.token_ttl_hours),
  ));
  let admin_invites = Arc::new(
    AdminInviteCodes::from_plain_codes(&app_config.admin_invite_codes)
      .context("hashing admin invite codes")?,
  );
  if app_config.admin_invite_codes.is_empty() {
    tracing::warn!("No admin invite codes configured; admin signup is disabled.");
  }

  let app_state = AppState {
    credentials,
    catalog,
    carts,
    tokens,
    admin_invites,
    config: app_config.clone(),
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await?;

  Ok(())
}
