// src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result};
use crate::models::NewAccount;
use crate::state::AppState;
use crate::validation;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequestPayload {
  pub name: String,
  pub email: String,
  pub password: String,
  pub admin_code: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

#[instrument(
  name = "handler::signup",
  skip(app_state, req_payload),
  fields(req_email = %req_payload.email)
)]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SignupRequestPayload>,
) -> Result<HttpResponse> {
  let payload = req_payload.into_inner();
  validation::validate_signup(&payload.name, &payload.email, &payload.password)?;

  // A present-but-wrong invite code is a hard failure; silently creating
  // a non-admin account would hide the typo from the person elevating.
  let is_admin = match payload.admin_code.as_deref() {
    None => false,
    Some(code) if code.trim().is_empty() => false,
    Some(code) => {
      if app_state.admin_invites.redeem(code)? {
        true
      } else {
        warn!("Signup presented an invalid admin invite code.");
        return Err(AppError::invalid("adminCode", "invalid admin invite code"));
      }
    }
  };

  let account = app_state
    .credentials
    .create(NewAccount {
      email: payload.email,
      name: payload.name,
      secret: payload.password,
      is_admin,
    })
    .await?;

  let token = app_state.tokens.issue(account.id, account.is_admin, None)?;
  info!(account_id = %account.id, admin = account.is_admin, "Account created.");

  Ok(HttpResponse::Created().json(json!({
    "message": "Account created successfully.",
    "token": token,
    "account": account,
  })))
}

#[instrument(
  name = "handler::signin",
  skip(app_state, req_payload),
  fields(req_email = %req_payload.email)
)]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse> {
  let payload = req_payload.into_inner();
  validation::validate_signin(&payload.email, &payload.password)?;

  // Unknown identity and wrong password take the same exit so the
  // response cannot be used to probe which addresses have accounts.
  let account = app_state
    .credentials
    .find_by_identity(&payload.email)
    .await?
    .ok_or(AppError::Unauthorized)?;

  if !app_state.credentials.verify_secret(&account, &payload.password)? {
    warn!(account_id = %account.id, "Signin with wrong password.");
    return Err(AppError::Unauthorized);
  }

  let token = app_state.tokens.issue(account.id, account.is_admin, None)?;
  info!(account_id = %account.id, "Signin successful.");

  Ok(HttpResponse::Ok().json(json!({
    "token": token,
    "account": account,
  })))
}
