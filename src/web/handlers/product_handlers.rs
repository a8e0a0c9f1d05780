// src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::product::{SortDirection, SortField};
use crate::models::{NewProduct, Product, ProductQuery, ProductUpdate, Review};
use crate::state::AppState;
use crate::validation;
use crate::web::auth::AuthenticatedAccount;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsParams {
  pub category: Option<String>,
  pub min_price: Option<Decimal>,
  pub max_price: Option<Decimal>,
  pub search: Option<String>,
  /// `field:direction`, e.g. `price:desc`. Defaults to newest first.
  pub sort: Option<String>,
  pub page: Option<i64>,
  pub page_size: Option<i64>,
}

fn parse_sort(raw: &str) -> Result<(SortField, SortDirection)> {
  let (field, direction) = raw.split_once(':').unwrap_or((raw, "asc"));
  let field = match field {
    "name" => SortField::Name,
    "price" => SortField::Price,
    "rating" => SortField::Rating,
    "created_at" | "createdAt" => SortField::CreatedAt,
    other => return Err(AppError::invalid("sort", format!("unknown sort field '{}'", other))),
  };
  let direction = match direction {
    "asc" => SortDirection::Asc,
    "desc" => SortDirection::Desc,
    other => {
      return Err(AppError::invalid(
        "sort",
        format!("unknown sort direction '{}'", other),
      ))
    }
  };
  Ok((field, direction))
}

impl ListProductsParams {
  fn into_query(self) -> Result<ProductQuery> {
    let mut query = ProductQuery {
      category: self.category,
      min_price: self.min_price,
      max_price: self.max_price,
      search: self.search,
      ..ProductQuery::default()
    };
    if let Some(sort) = self.sort.as_deref() {
      let (field, direction) = parse_sort(sort)?;
      query.sort_field = field;
      query.sort_direction = direction;
    }
    if let Some(page) = self.page {
      query.page = page.max(1);
    }
    if let Some(page_size) = self.page_size {
      query.page_size = page_size.clamp(1, 100);
    }
    Ok(query)
  }
}

#[instrument(name = "handler::list_products", skip(app_state, params))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  params: web::Query<ListProductsParams>,
) -> Result<HttpResponse> {
  let query = params.into_inner().into_query()?;
  let page = app_state.catalog.list(&query).await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  let product = app_state
    .catalog
    .find(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(name = "handler::create_product", skip(app_state, auth, req_payload))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAccount,
  req_payload: web::Json<NewProduct>,
) -> Result<HttpResponse> {
  auth.require_admin()?;
  let fields = req_payload.into_inner();
  validation::validate_product_create(&fields)?;

  let product = Product::new(fields);
  app_state.catalog.insert(&product).await?;
  info!(product_id = %product.id, "Product created.");
  Ok(HttpResponse::Created().json(product))
}

#[instrument(
  name = "handler::update_product",
  skip(app_state, auth, req_payload, path),
  fields(product_id = %path)
)]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAccount,
  path: web::Path<Uuid>,
  req_payload: web::Json<ProductUpdate>,
) -> Result<HttpResponse> {
  auth.require_admin()?;
  let product_id = path.into_inner();
  let update = req_payload.into_inner();
  validation::validate_product_update(&update)?;

  let product = app_state
    .catalog
    .update(product_id, update)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))?;
  Ok(HttpResponse::Ok().json(product))
}

#[instrument(
  name = "handler::delete_product",
  skip(app_state, auth, path),
  fields(product_id = %path)
)]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAccount,
  path: web::Path<Uuid>,
) -> Result<HttpResponse> {
  auth.require_admin()?;
  let product_id = path.into_inner();
  if !app_state.catalog.delete(product_id).await? {
    return Err(AppError::NotFound(format!("product {}", product_id)));
  }
  info!(product_id = %product_id, "Product deleted.");
  Ok(HttpResponse::Ok().json(json!({"message": "Product deleted successfully."})))
}

#[derive(Deserialize, Debug)]
pub struct AddReviewPayload {
  pub rating: i32,
  pub comment: String,
}

#[instrument(
  name = "handler::add_review",
  skip(app_state, auth, path, req_payload),
  fields(product_id = %path, account_id = %auth.account_id)
)]
pub async fn add_review_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedAccount,
  path: web::Path<Uuid>,
  req_payload: web::Json<AddReviewPayload>,
) -> Result<HttpResponse> {
  let product_id = path.into_inner();
  let payload = req_payload.into_inner();
  validation::validate_review(payload.rating, &payload.comment)?;

  let review = Review {
    reviewer_id: auth.account_id,
    rating: payload.rating,
    comment: payload.comment,
    created_at: chrono::Utc::now(),
  };
  let product = app_state
    .catalog
    .add_review(product_id, review)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("product {}", product_id)))?;
  Ok(HttpResponse::Created().json(product))
}
