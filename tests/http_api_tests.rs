// tests/http_api_tests.rs
mod common;

use std::sync::Arc;

use actix_web::{http::StatusCode, test, web, App};
use chrono::Duration;
use common::*;
use serde_json::{json, Value};
use uuid::Uuid;

use mercato::cart::engine::CartEngine;
use mercato::config::AppConfig;
use mercato::services::{AdminInviteCodes, TokenService};
use mercato::state::AppState;
use mercato::store::memory::{MemoryCartStore, MemoryCatalogStore, MemoryCredentialStore};
use mercato::store::{CatalogStore, CredentialStore};
use mercato::web::routes::configure_app_routes;

fn test_state() -> AppState {
  setup_tracing();
  let credentials: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::new());
  let catalog: Arc<dyn CatalogStore> = Arc::new(MemoryCatalogStore::new());
  let carts = Arc::new(CartEngine::new(Arc::new(MemoryCartStore::new()), catalog.clone()));
  AppState {
    credentials,
    catalog,
    carts,
    tokens: Arc::new(TokenService::new(b"integration-test-secret", Duration::hours(1))),
    admin_invites: Arc::new(AdminInviteCodes::from_plain_codes(["let-me-admin"]).unwrap()),
    config: Arc::new(AppConfig {
      server_host: "127.0.0.1".to_string(),
      server_port: 0,
      database_url: String::new(),
      token_secret: "integration-test-secret".to_string(),
      token_ttl_hours: 1,
      admin_invite_codes: vec!["let-me-admin".to_string()],
    }),
  }
}

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

/// Signs an account up and yields `(token, response_body)`.
macro_rules! signup {
  ($app:expr, $email:expr) => {
    signup!($app, $email, Option::<&str>::None)
  };
  ($app:expr, $email:expr, $admin_code:expr) => {{
    let mut body = json!({
      "name": "Integration Tester",
      "email": $email,
      "password": "hunter22",
    });
    if let Some(code) = Option::<&str>::from($admin_code) {
      body["adminCode"] = json!(code);
    }
    let req = test::TestRequest::post()
      .uri("/api/auth/signup")
      .set_json(&body)
      .to_request();
    let resp: Value = test::call_and_read_body_json(&$app, req).await;
    let token = resp["token"].as_str().expect("signup returns a token").to_string();
    (token, resp)
  }};
}

#[actix_web::test]
async fn signup_signin_roundtrip() {
  let state = test_state();
  let app = app!(state);

  let (_, created) = signup!(app, "ada@example.com");
  assert_eq!(created["account"]["email"], "ada@example.com");
  assert!(created["account"].get("password_hash").is_none());

  let req = test::TestRequest::post()
    .uri("/api/auth/signin")
    .set_json(json!({"email": "ADA@example.com", "password": "hunter22"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let req = test::TestRequest::post()
    .uri("/api/auth/signin")
    .set_json(json!({"email": "ada@example.com", "password": "wrong"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn duplicate_signup_conflicts() {
  let state = test_state();
  let app = app!(state);

  signup!(app, "dup@example.com");
  let req = test::TestRequest::post()
    .uri("/api/auth/signup")
    .set_json(json!({"name": "Other", "email": "Dup@Example.com", "password": "hunter22"}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn invalid_admin_code_is_rejected_valid_one_elevates() {
  let state = test_state();
  let app = app!(state);

  let req = test::TestRequest::post()
    .uri("/api/auth/signup")
    .set_json(json!({
      "name": "Mallory",
      "email": "mallory@example.com",
      "password": "hunter22",
      "adminCode": "guessed-wrong",
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  let (_, created) = signup!(app, "root@example.com", Some("let-me-admin"));
  assert_eq!(created["account"]["is_admin"], true);
}

#[actix_web::test]
async fn product_mutation_requires_admin() {
  let state = test_state();
  let app = app!(state);

  let (member_token, _) = signup!(app, "member@example.com");
  let (admin_token, _) = signup!(app, "admin@example.com", Some("let-me-admin"));

  let payload = json!({
    "name": "Lamp",
    "description": "A lamp",
    "price": "20",
    "category": "home",
    "stock": 5,
  });

  let req = test::TestRequest::post()
    .uri("/api/products")
    .insert_header(("Authorization", format!("Bearer {}", member_token)))
    .set_json(&payload)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FORBIDDEN);

  let req = test::TestRequest::post()
    .uri("/api/products")
    .insert_header(("Authorization", format!("Bearer {}", admin_token)))
    .set_json(&payload)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn cart_endpoints_require_a_bearer_token() {
  let state = test_state();
  let app = app!(state);

  let req = test::TestRequest::get().uri("/api/cart").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(("Authorization", "Bearer not-a-real-token"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn cart_flow_over_http() {
  let state = test_state();
  let app = app!(state);
  let (token, _) = signup!(app, "shopper@example.com");
  let auth = ("Authorization", format!("Bearer {}", token));

  let product = product("Desk", "100", None);
  state.catalog.insert(&product).await.unwrap();

  // Empty cart materializes on first access.
  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(auth.clone())
    .to_request();
  let cart: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(cart["items"].as_array().unwrap().len(), 0);

  // Add twice; quantities merge.
  for quantity in [1, 2] {
    let req = test::TestRequest::post()
      .uri("/api/cart/items")
      .insert_header(auth.clone())
      .set_json(json!({"productId": product.id, "quantity": quantity}))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
  }
  let req = test::TestRequest::get()
    .uri("/api/cart")
    .insert_header(auth.clone())
    .to_request();
  let cart: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(cart["items"][0]["quantity"], 3);
  assert_eq!(cart["total_amount"], "300.00");

  // Quantity below one is rejected at the engine boundary.
  let req = test::TestRequest::put()
    .uri(&format!("/api/cart/items/{}", product.id))
    .insert_header(auth.clone())
    .set_json(json!({"quantity": 0}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

  // Remove, then clear the (now empty) cart.
  let req = test::TestRequest::delete()
    .uri(&format!("/api/cart/items/{}", product.id))
    .insert_header(auth.clone())
    .to_request();
  let cart: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(cart["items"].as_array().unwrap().len(), 0);

  let req = test::TestRequest::delete()
    .uri("/api/cart")
    .insert_header(auth.clone())
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn unknown_product_in_cart_add_is_404() {
  let state = test_state();
  let app = app!(state);
  let (token, _) = signup!(app, "shopper@example.com");

  let req = test::TestRequest::post()
    .uri("/api/cart/items")
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .set_json(json!({"productId": Uuid::new_v4()}))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn product_listing_filters_and_reviews() {
  let state = test_state();
  let app = app!(state);
  let (token, _) = signup!(app, "reviewer@example.com");

  for (name, price, category) in [("Anvil", "120", "tools"), ("Hammer", "35", "tools"), ("Teapot", "18", "kitchen")] {
    let mut p = product(name, price, None);
    p.category = category.to_string();
    state.catalog.insert(&p).await.unwrap();
  }

  let req = test::TestRequest::get()
    .uri("/api/products?category=tools&sort=price:asc")
    .to_request();
  let page: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(page["total"], 2);
  assert_eq!(page["products"][0]["name"], "Hammer");

  let anvil_id = page["products"][1]["id"].as_str().unwrap().to_string();
  let req = test::TestRequest::post()
    .uri(&format!("/api/products/{}/reviews", anvil_id))
    .insert_header(("Authorization", format!("Bearer {}", token)))
    .set_json(json!({"rating": 4, "comment": "solid"}))
    .to_request();
  let reviewed: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(reviewed["rating"], "4.0");
  assert_eq!(reviewed["reviews"].as_array().unwrap().len(), 1);
}
