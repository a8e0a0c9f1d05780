// src/web/auth.rs

//! Bearer-token authentication for the HTTP surface.
//!
//! Every protected handler takes an [`AuthenticatedAccount`] extractor:
//! the token is verified, the account is re-loaded to confirm it still
//! exists, and only then does the handler run. Any failure along the way
//! is the same uniform `Unauthorized`.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::debug;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::state::AppState;

/// The identity a valid bearer token resolves to.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAccount {
  pub account_id: Uuid,
  pub admin: bool,
}

impl AuthenticatedAccount {
  /// Gate for admin-only routes. The flag comes from the freshly loaded
  /// account record, not from the token claims, so a demoted account is
  /// locked out as soon as its record changes.
  pub fn require_admin(&self) -> Result<()> {
    if self.admin {
      Ok(())
    } else {
      Err(AppError::Forbidden("admin access required".to_string()))
    }
  }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .map(str::to_owned)
}

impl FromRequest for AuthenticatedAccount {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, AppError>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = bearer_token(req);

    Box::pin(async move {
      let state =
        state.ok_or_else(|| AppError::Internal("application state not configured".to_string()))?;
      let token = token.ok_or(AppError::Unauthorized)?;

      let claims = state.tokens.verify(&token)?;

      // The token may outlive the account; confirm it still resolves.
      let account = state
        .credentials
        .find_by_id(claims.account_id)
        .await?
        .ok_or_else(|| {
          debug!(account_id = %claims.account_id, "Token refers to a missing account.");
          AppError::Unauthorized
        })?;

      Ok(AuthenticatedAccount {
        account_id: account.id,
        admin: account.is_admin,
      })
    })
  }
}
