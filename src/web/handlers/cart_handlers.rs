// src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::cart::CartOps;
use crate::errors::Result;
use crate::state::AppState;
use crate::web::auth::AuthenticatedAccount;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddItemPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

fn default_quantity() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct SetQuantityPayload {
  pub quantity: i32,
}

#[instrument(name = "handler::get_cart", skip(app_state, auth), fields(account_id = %auth.account_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAccount,
) -> Result<HttpResponse> {
  let cart = app_state.carts.for_account(auth.account_id).cart().await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::add_cart_item",
  skip(app_state, auth, req_payload),
  fields(account_id = %auth.account_id, product_id = %req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn add_cart_item_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAccount,
  req_payload: web::Json<AddItemPayload>,
) -> Result<HttpResponse> {
  let payload = req_payload.into_inner();
  let cart = app_state
    .carts
    .for_account(auth.account_id)
    .add_item(payload.product_id, payload.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::set_cart_item_quantity",
  skip(app_state, auth, path, req_payload),
  fields(account_id = %auth.account_id, product_id = %path, quantity = req_payload.quantity)
)]
pub async fn set_cart_item_quantity_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAccount,
  path: web::Path<Uuid>,
  req_payload: web::Json<SetQuantityPayload>,
) -> Result<HttpResponse> {
  let cart = app_state
    .carts
    .for_account(auth.account_id)
    .set_quantity(path.into_inner(), req_payload.quantity)
    .await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(
  name = "handler::remove_cart_item",
  skip(app_state, auth, path),
  fields(account_id = %auth.account_id, product_id = %path)
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAccount,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  let cart = app_state
    .carts
    .for_account(auth.account_id)
    .remove_item(path.into_inner())
    .await?;
  Ok(HttpResponse::Ok().json(cart))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth), fields(account_id = %auth.account_id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAccount,
) -> Result<HttpResponse> {
  let cart = app_state.carts.for_account(auth.account_id).clear().await?;
  Ok(HttpResponse::Ok().json(cart))
}
