// src/state.rs

use std::sync::Arc;

use crate::cart::engine::CartEngine;
use crate::config::AppConfig;
use crate::services::{AdminInviteCodes, TokenService};
use crate::store::{CatalogStore, CredentialStore};

#[derive(Clone)]
pub struct AppState {
  pub credentials: Arc<dyn CredentialStore>,
  pub catalog: Arc<dyn CatalogStore>,
  pub carts: Arc<CartEngine>,
  pub tokens: Arc<TokenService>,
  pub admin_invites: Arc<AdminInviteCodes>,
  pub config: Arc<AppConfig>,
}
