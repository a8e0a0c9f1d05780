// src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{auth_handlers, cart_handlers, product_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Called in `main.rs` to configure services for the Actix App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      // Health Check Route
      .route("/health", web::get().to(health_check_handler))
      // Authentication Routes
      .service(
        web::scope("/auth")
          .route("/signup", web::post().to(auth_handlers::signup_handler))
          .route("/signin", web::post().to(auth_handlers::signin_handler)),
      )
      // Catalog Routes
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler))
          .route("/{product_id}", web::put().to(product_handlers::update_product_handler))
          .route(
            "/{product_id}",
            web::delete().to(product_handlers::delete_product_handler),
          )
          .route(
            "/{product_id}/reviews",
            web::post().to(product_handlers::add_review_handler),
          ),
      )
      // Cart Routes
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::delete().to(cart_handlers::clear_cart_handler))
          .route("/items", web::post().to(cart_handlers::add_cart_item_handler))
          .route(
            "/items/{product_id}",
            web::put().to(cart_handlers::set_cart_item_quantity_handler),
          )
          .route(
            "/items/{product_id}",
            web::delete().to(cart_handlers::remove_cart_item_handler),
          ),
      ),
  );
}
