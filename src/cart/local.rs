// src/cart/local.rs

//! The local-only cart engine.
//!
//! An unauthenticated session shops against this mirror instead of the
//! server: the same operations, the same merge and repricing rules, but
//! items persist in a string key-value [`LocalStorage`] (the browser
//! localStorage contract) rather than in the cart store. On sign-in the
//! accumulated items are replayed into the account's server cart by
//! [`crate::cart::sync::merge_into`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::instrument;
use uuid::Uuid;

use crate::cart::pricing;
use crate::cart::CartOps;
use crate::errors::{AppError, Result};
use crate::models::{Cart, CartItem, CartView};
use crate::store::CatalogStore;
use crate::validation::validate_quantity;

/// Storage key the mirrored items live under, matching the storefront's
/// localStorage slot.
pub const CART_STORAGE_KEY: &str = "cart";

/// A string key-value store with browser-localStorage semantics.
pub trait LocalStorage: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: String);
  fn remove(&self, key: &str);
}

/// Process-local [`LocalStorage`], used by tests and headless sessions.
#[derive(Default)]
pub struct MemoryLocalStorage {
  entries: RwLock<HashMap<String, String>>,
}

impl MemoryLocalStorage {
  pub fn new() -> Self {
    Self::default()
  }
}

impl LocalStorage for MemoryLocalStorage {
  fn get(&self, key: &str) -> Option<String> {
    self.entries.read().get(key).cloned()
  }

  fn set(&self, key: &str, value: String) {
    self.entries.write().insert(key.to_string(), value);
  }

  fn remove(&self, key: &str) {
    self.entries.write().remove(key);
  }
}

/// Local-only implementation of the shared cart contract.
///
/// The mirror materializes on first use (an absent storage slot reads as
/// an empty cart), so unlike the server engine its operations never fail
/// with a cart-level `NotFound`. Item-level semantics are identical.
pub struct LocalCartEngine {
  storage: Arc<dyn LocalStorage>,
  catalog: Arc<dyn CatalogStore>,
}

impl LocalCartEngine {
  pub fn new(storage: Arc<dyn LocalStorage>, catalog: Arc<dyn CatalogStore>) -> Self {
    Self { storage, catalog }
  }

  /// The items currently mirrored, in insertion order.
  pub fn items(&self) -> Result<Vec<CartItem>> {
    match self.storage.get(CART_STORAGE_KEY) {
      None => Ok(Vec::new()),
      Some(raw) => serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(format!("corrupt local cart payload: {}", e))),
    }
  }

  /// Drops every mirrored item, e.g. after a successful sync.
  pub fn reset(&self) {
    self.storage.remove(CART_STORAGE_KEY);
  }

  fn store_items(&self, items: &[CartItem]) -> Result<()> {
    let raw = serde_json::to_string(items)
      .map_err(|e| AppError::Internal(format!("encoding local cart failed: {}", e)))?;
    self.storage.set(CART_STORAGE_KEY, raw);
    Ok(())
  }

  async fn view_of(&self, items: Vec<CartItem>) -> Result<CartView> {
    let repriced = pricing::reprice(&items, self.catalog.as_ref()).await?;
    Ok(pricing::view_from(Uuid::nil(), repriced, Utc::now()))
  }

  /// Load, mutate, persist, reprice. Single-session storage, so no
  /// version check is needed here.
  async fn mutate<F>(&self, apply: F) -> Result<CartView>
  where
    F: FnOnce(&mut Cart) -> Result<()>,
  {
    let mut cart = Cart::empty(Uuid::nil());
    cart.items = self.items()?;
    apply(&mut cart)?;
    self.store_items(&cart.items)?;
    self.view_of(cart.items).await
  }
}

#[async_trait]
impl CartOps for LocalCartEngine {
  #[instrument(name = "local_cart::get", skip(self))]
  async fn cart(&self) -> Result<CartView> {
    self.view_of(self.items()?).await
  }

  #[instrument(name = "local_cart::add_item", skip(self))]
  async fn add_item(&self, product_id: Uuid, quantity: i32) -> Result<CartView> {
    validate_quantity(quantity)?;
    if self.catalog.find(product_id).await?.is_none() {
      return Err(AppError::NotFound(format!("product {}", product_id)));
    }
    self
      .mutate(move |cart| {
        cart.add(product_id, quantity);
        Ok(())
      })
      .await
  }

  #[instrument(name = "local_cart::set_quantity", skip(self))]
  async fn set_quantity(&self, product_id: Uuid, quantity: i32) -> Result<CartView> {
    validate_quantity(quantity)?;
    self
      .mutate(move |cart| match cart.item_mut(product_id) {
        Some(item) => {
          item.quantity = quantity;
          Ok(())
        }
        None => Err(AppError::NotFound(format!("product {} not in cart", product_id))),
      })
      .await
  }

  #[instrument(name = "local_cart::remove_item", skip(self))]
  async fn remove_item(&self, product_id: Uuid) -> Result<CartView> {
    self
      .mutate(move |cart| {
        cart.remove(product_id);
        Ok(())
      })
      .await
  }

  #[instrument(name = "local_cart::clear", skip(self))]
  async fn clear(&self) -> Result<CartView> {
    self
      .mutate(|cart| {
        cart.clear();
        Ok(())
      })
      .await
  }
}
