// src/models/cart.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::Product;

/// One (product reference, quantity) pair owned by a cart. A cart holds at
/// most one entry per distinct product; quantity is always >= 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
  pub product_id: Uuid,
  pub quantity: i32,
}

/// The persisted cart record for one account.
///
/// `total_amount` is a cached recomputation, not a source of truth: it is
/// rebuilt from current catalog prices on every mutation. `version` is the
/// optimistic-concurrency stamp checked by the store on every write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
  pub owner_id: Uuid,
  pub items: Vec<CartItem>,
  pub total_amount: Decimal,
  pub version: i64,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  /// An empty cart for `owner_id`, as materialized on first access.
  pub fn empty(owner_id: Uuid) -> Self {
    Self {
      owner_id,
      items: Vec::new(),
      total_amount: Decimal::ZERO,
      version: 0,
      updated_at: Utc::now(),
    }
  }

  pub fn item(&self, product_id: Uuid) -> Option<&CartItem> {
    self.items.iter().find(|item| item.product_id == product_id)
  }

  pub fn item_mut(&mut self, product_id: Uuid) -> Option<&mut CartItem> {
    self.items.iter_mut().find(|item| item.product_id == product_id)
  }

  /// Inserts a new entry or increments an existing one, preserving
  /// insertion order. Quantity validity is the engine's responsibility.
  pub fn add(&mut self, product_id: Uuid, quantity: i32) {
    match self.item_mut(product_id) {
      Some(existing) => existing.quantity += quantity,
      None => self.items.push(CartItem { product_id, quantity }),
    }
  }

  /// Drops the entry for `product_id` if present. Absence is not an error:
  /// removal is idempotent.
  pub fn remove(&mut self, product_id: Uuid) {
    self.items.retain(|item| item.product_id != product_id);
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.total_amount = Decimal::ZERO;
  }
}

/// One cart line as returned to callers: the stored reference plus the
/// full current product record for display. `product` is `None` when the
/// referenced product has been deleted out-of-band; the line then prices
/// at zero but is retained.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
  pub product_id: Uuid,
  pub quantity: i32,
  pub product: Option<Product>,
}

/// A cart as returned by every engine operation: items expanded with
/// current product detail and the total recomputed from current prices.
/// The expansion is read-only; the total is always derived from price
/// fields, never from what happens to be displayed.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
  pub owner_id: Uuid,
  pub items: Vec<CartItemView>,
  pub total_amount: Decimal,
  pub updated_at: DateTime<Utc>,
}
