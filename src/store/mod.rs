// src/store/mod.rs

//! Store contracts.
//!
//! The engines and handlers only ever see these traits; the concrete
//! backends live in [`memory`] (tests, local mirror) and [`postgres`]
//! (server). All methods surface [`AppError`] directly: `Conflict` for
//! uniqueness and version clashes, `Unavailable` for transient store
//! failures, plain `Ok(None)` for absence wherever absence is not an
//! error at this layer.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Account, Cart, NewAccount, Product, ProductPage, ProductQuery, ProductUpdate, Review};
use crate::services::password;

/// Persists account records and owns password hashing: `create` receives
/// the plain secret and only ever stores the Argon2 hash. Identities are
/// normalized (trimmed, lower-cased) before storage and lookup.
#[async_trait]
pub trait CredentialStore: Send + Sync {
  /// Fails with `Conflict` when the (normalized) identity already exists.
  async fn create(&self, account: NewAccount) -> Result<Account>;

  async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>>;

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

  /// One-way comparison of a candidate secret against the stored hash.
  fn verify_secret(&self, account: &Account, candidate: &str) -> Result<bool> {
    password::verify_secret(&account.password_hash, candidate)
  }
}

/// Persists product records.
#[async_trait]
pub trait CatalogStore: Send + Sync {
  async fn list(&self, query: &ProductQuery) -> Result<ProductPage>;

  async fn find(&self, id: Uuid) -> Result<Option<Product>>;

  async fn insert(&self, product: &Product) -> Result<()>;

  /// Applies a partial update; `Ok(None)` when the product is absent.
  async fn update(&self, id: Uuid, update: ProductUpdate) -> Result<Option<Product>>;

  /// `Ok(true)` when a record was deleted.
  async fn delete(&self, id: Uuid) -> Result<bool>;

  /// Appends a review and recomputes the derived average rating as one
  /// store-level operation. `Ok(None)` when the product is absent.
  async fn add_review(&self, id: Uuid, review: Review) -> Result<Option<Product>>;
}

/// Persists cart records, one per owning account.
///
/// `update` is the concurrency primitive the cart engine builds on: the
/// write only lands when the stored version still equals
/// `expected_version`, otherwise it fails with `Conflict` and the engine
/// re-reads and re-applies.
#[async_trait]
pub trait CartStore: Send + Sync {
  async fn find(&self, owner_id: Uuid) -> Result<Option<Cart>>;

  /// Fails with `Conflict` when a cart for the owner already exists.
  async fn insert(&self, cart: &Cart) -> Result<()>;

  /// Version-checked write of the full `{items, total_amount}` unit.
  async fn update(&self, cart: &Cart, expected_version: i64) -> Result<()>;
}
