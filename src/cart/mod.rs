// src/cart/mod.rs

//! Cart engines.
//!
//! Two implementations of one contract, selected by authentication state:
//! [`engine::CartEngine`] is the store-backed engine serving authenticated
//! accounts behind the HTTP surface; [`local::LocalCartEngine`] is the
//! local-only mirror an unauthenticated session shops with, replayed into
//! the server cart by [`sync::merge_into`] once the session signs in.

pub mod engine;
pub mod local;
pub mod pricing;
pub mod sync;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::CartView;

/// The cart contract shared by the server-backed and local engines.
///
/// All operations return the updated cart with items expanded to full
/// product detail and the total recomputed from current catalog prices.
#[async_trait]
pub trait CartOps {
  /// Returns the cart, creating an empty one on first access. Idempotent.
  async fn cart(&self) -> Result<CartView>;

  /// Inserts a new line or increments an existing one by `quantity`.
  async fn add_item(&self, product_id: Uuid, quantity: i32) -> Result<CartView>;

  /// Replaces a line's quantity. Zero or negative quantity is rejected;
  /// use `remove_item` for removal intent.
  async fn set_quantity(&self, product_id: Uuid, quantity: i32) -> Result<CartView>;

  /// Removes a line. Removing an absent product succeeds unchanged.
  async fn remove_item(&self, product_id: Uuid) -> Result<CartView>;

  /// Empties the cart and resets the total to zero.
  async fn clear(&self) -> Result<CartView>;
}
