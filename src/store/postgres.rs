// src/store/postgres.rs

//! Postgres store backends.
//!
//! Runtime-bound queries throughout (`sqlx::query_as` without compile-time
//! macros). Reviews and cart items are persisted as JSONB documents on
//! their owning row, so a cart's `{items, total_amount}` always lands as
//! one atomic write, and the version check in `carts.update` is a single
//! guarded `UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::account::normalize_identity;
use crate::models::product::{SortDirection, SortField};
use crate::models::{
  Account, Cart, CartItem, NewAccount, Product, ProductPage, ProductQuery, ProductUpdate, Review,
};
use crate::services::password;
use crate::store::{CartStore, CatalogStore, CredentialStore};

// Unique-violation code surfaced by Postgres on duplicate keys.
const PG_UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &sqlx::Error) -> bool {
  matches!(
    err,
    sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION)
  )
}

#[derive(FromRow)]
struct AccountRow {
  id: Uuid,
  email: String,
  name: String,
  password_hash: String,
  is_admin: bool,
  created_at: DateTime<Utc>,
}

impl From<AccountRow> for Account {
  fn from(row: AccountRow) -> Self {
    Account {
      id: row.id,
      email: row.email,
      name: row.name,
      password_hash: row.password_hash,
      is_admin: row.is_admin,
      created_at: row.created_at,
    }
  }
}

pub struct PgCredentialStore {
  pool: PgPool,
}

impl PgCredentialStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
  #[instrument(name = "pg::accounts::create", skip_all, fields(email = %account.email))]
  async fn create(&self, account: NewAccount) -> Result<Account> {
    let identity = normalize_identity(&account.email);
    let password_hash = password::hash_secret(&account.secret)?;

    let row: AccountRow = sqlx::query_as(
      "INSERT INTO accounts (id, email, name, password_hash, is_admin, created_at) \
       VALUES ($1, $2, $3, $4, $5, NOW()) \
       RETURNING id, email, name, password_hash, is_admin, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(&identity)
    .bind(account.name.trim())
    .bind(&password_hash)
    .bind(account.is_admin)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| {
      if is_unique_violation(&e) {
        AppError::Conflict(format!("account '{}' already exists", identity))
      } else {
        AppError::from(e)
      }
    })?;
    Ok(row.into())
  }

  async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>> {
    let row: Option<AccountRow> = sqlx::query_as(
      "SELECT id, email, name, password_hash, is_admin, created_at FROM accounts WHERE email = $1",
    )
    .bind(normalize_identity(identity))
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(Account::from))
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
    let row: Option<AccountRow> = sqlx::query_as(
      "SELECT id, email, name, password_hash, is_admin, created_at FROM accounts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(Account::from))
  }
}

#[derive(FromRow)]
struct ProductRow {
  id: Uuid,
  name: String,
  description: String,
  price: Decimal,
  offer_price: Option<Decimal>,
  category: String,
  stock: i32,
  image: String,
  rating: Decimal,
  reviews: Json<Vec<Review>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      name: row.name,
      description: row.description,
      price: row.price,
      offer_price: row.offer_price,
      category: row.category,
      stock: row.stock,
      image: row.image,
      rating: row.rating,
      reviews: row.reviews.0,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

const PRODUCT_COLUMNS: &str =
  "id, name, description, price, offer_price, category, stock, image, rating, reviews, created_at, updated_at";

fn sort_column(field: SortField) -> &'static str {
  match field {
    SortField::Name => "name",
    SortField::Price => "price",
    SortField::Rating => "rating",
    SortField::CreatedAt => "created_at",
  }
}

/// Appends the WHERE clause shared by the page and count queries.
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a ProductQuery) {
  builder.push(" WHERE TRUE");
  if let Some(category) = &query.category {
    builder.push(" AND category = ").push_bind(category);
  }
  if let Some(min_price) = query.min_price {
    builder.push(" AND price >= ").push_bind(min_price);
  }
  if let Some(max_price) = query.max_price {
    builder.push(" AND price <= ").push_bind(max_price);
  }
  if let Some(search) = &query.search {
    let pattern = format!("%{}%", search);
    builder
      .push(" AND (name ILIKE ")
      .push_bind(pattern.clone())
      .push(" OR description ILIKE ")
      .push_bind(pattern)
      .push(")");
  }
}

pub struct PgCatalogStore {
  pool: PgPool,
}

impl PgCatalogStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  async fn fetch_for_update(
    &self,
    tx: &mut sqlx::Transaction<'_, Postgres>,
    id: Uuid,
  ) -> Result<Option<Product>> {
    let row: Option<ProductRow> = sqlx::query_as(&format!(
      "SELECT {} FROM products WHERE id = $1 FOR UPDATE",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(row.map(Product::from))
  }

  async fn store_full(
    &self,
    tx: &mut sqlx::Transaction<'_, Postgres>,
    product: &Product,
  ) -> Result<()> {
    sqlx::query(
      "UPDATE products SET name = $2, description = $3, price = $4, offer_price = $5, \
       category = $6, stock = $7, image = $8, rating = $9, reviews = $10, updated_at = $11 \
       WHERE id = $1",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.offer_price)
    .bind(&product.category)
    .bind(product.stock)
    .bind(&product.image)
    .bind(product.rating)
    .bind(Json(&product.reviews))
    .bind(product.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
  }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
  #[instrument(name = "pg::products::list", skip_all)]
  async fn list(&self, query: &ProductQuery) -> Result<ProductPage> {
    let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM products");
    push_filters(&mut count_builder, query);
    let total: i64 = count_builder.build_query_scalar().fetch_one(&self.pool).await?;

    let mut page_builder = QueryBuilder::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
    push_filters(&mut page_builder, query);
    page_builder.push(" ORDER BY ").push(sort_column(query.sort_field)).push(
      match query.sort_direction {
        SortDirection::Asc => " ASC",
        SortDirection::Desc => " DESC",
      },
    );
    page_builder
      .push(" LIMIT ")
      .push_bind(query.page_size.max(0))
      .push(" OFFSET ")
      .push_bind(query.offset());

    let rows: Vec<ProductRow> = page_builder.build_query_as().fetch_all(&self.pool).await?;
    Ok(ProductPage::new(rows.into_iter().map(Product::from).collect(), total, query))
  }

  async fn find(&self, id: Uuid) -> Result<Option<Product>> {
    let row: Option<ProductRow> =
      sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
    Ok(row.map(Product::from))
  }

  #[instrument(name = "pg::products::insert", skip_all, fields(product_id = %product.id))]
  async fn insert(&self, product: &Product) -> Result<()> {
    sqlx::query(
      "INSERT INTO products \
       (id, name, description, price, offer_price, category, stock, image, rating, reviews, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.offer_price)
    .bind(&product.category)
    .bind(product.stock)
    .bind(&product.image)
    .bind(product.rating)
    .bind(Json(&product.reviews))
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  #[instrument(name = "pg::products::update", skip_all, fields(product_id = %id))]
  async fn update(&self, id: Uuid, update: ProductUpdate) -> Result<Option<Product>> {
    let mut tx = self.pool.begin().await?;
    let Some(mut product) = self.fetch_for_update(&mut tx, id).await? else {
      return Ok(None);
    };
    product.apply_update(update);
    self.store_full(&mut tx, &product).await?;
    tx.commit().await?;
    Ok(Some(product))
  }

  #[instrument(name = "pg::products::delete", skip_all, fields(product_id = %id))]
  async fn delete(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "pg::products::add_review", skip_all, fields(product_id = %id))]
  async fn add_review(&self, id: Uuid, review: Review) -> Result<Option<Product>> {
    let mut tx = self.pool.begin().await?;
    let Some(mut product) = self.fetch_for_update(&mut tx, id).await? else {
      return Ok(None);
    };
    product.push_review(review);
    self.store_full(&mut tx, &product).await?;
    tx.commit().await?;
    Ok(Some(product))
  }
}

#[derive(FromRow)]
struct CartRow {
  owner_id: Uuid,
  items: Json<Vec<CartItem>>,
  total_amount: Decimal,
  version: i64,
  updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
  fn from(row: CartRow) -> Self {
    Cart {
      owner_id: row.owner_id,
      items: row.items.0,
      total_amount: row.total_amount,
      version: row.version,
      updated_at: row.updated_at,
    }
  }
}

pub struct PgCartStore {
  pool: PgPool,
}

impl PgCartStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CartStore for PgCartStore {
  async fn find(&self, owner_id: Uuid) -> Result<Option<Cart>> {
    let row: Option<CartRow> = sqlx::query_as(
      "SELECT owner_id, items, total_amount, version, updated_at FROM carts WHERE owner_id = $1",
    )
    .bind(owner_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row.map(Cart::from))
  }

  #[instrument(name = "pg::carts::insert", skip_all, fields(owner_id = %cart.owner_id))]
  async fn insert(&self, cart: &Cart) -> Result<()> {
    sqlx::query(
      "INSERT INTO carts (owner_id, items, total_amount, version, updated_at) \
       VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(cart.owner_id)
    .bind(Json(&cart.items))
    .bind(cart.total_amount)
    .bind(cart.version)
    .bind(cart.updated_at)
    .execute(&self.pool)
    .await
    .map_err(|e| {
      if is_unique_violation(&e) {
        AppError::Conflict(format!("cart for account {} already exists", cart.owner_id))
      } else {
        AppError::from(e)
      }
    })?;
    Ok(())
  }

  #[instrument(
    name = "pg::carts::update",
    skip_all,
    fields(owner_id = %cart.owner_id, expected_version)
  )]
  async fn update(&self, cart: &Cart, expected_version: i64) -> Result<()> {
    let result = sqlx::query(
      "UPDATE carts SET items = $2, total_amount = $3, version = $4, updated_at = $5 \
       WHERE owner_id = $1 AND version = $6",
    )
    .bind(cart.owner_id)
    .bind(Json(&cart.items))
    .bind(cart.total_amount)
    .bind(cart.version)
    .bind(cart.updated_at)
    .bind(expected_version)
    .execute(&self.pool)
    .await?;

    if result.rows_affected() == 0 {
      // Either the row moved on past expected_version or it is gone;
      // both mean the caller must re-read before writing again.
      return Err(AppError::Conflict(format!(
        "cart version clash for account {}",
        cart.owner_id
      )));
    }
    Ok(())
  }
}
