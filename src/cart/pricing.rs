// src/cart/pricing.rs

//! Repricing: deriving a cart's total from current catalog prices.
//!
//! The total is never trusted from storage; it is recomputed here on every
//! mutation (and for every returned view) so it always reflects the
//! catalog as of the enclosing operation.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{CartItem, CartItemView, CartView, Product};
use crate::store::CatalogStore;

/// Currency-minor-unit precision of every total.
pub const MONEY_DECIMALS: u32 = 2;

/// Rounds a summed amount half-up to currency precision. Applied to the
/// final sum only, never per line. The result is rescaled so totals always
/// carry exactly two fractional digits on the wire.
pub fn round_money(amount: Decimal) -> Decimal {
  let mut rounded = amount.round_dp_with_strategy(MONEY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
  rounded.rescale(MONEY_DECIMALS);
  rounded
}

/// The line contributions of a repriced cart: each item paired with the
/// product record fetched for it (`None` when the product is gone).
pub struct Repriced {
  pub lines: Vec<(CartItem, Option<Product>)>,
  pub total: Decimal,
}

/// Re-fetches every referenced product and sums effective price times
/// quantity. A product deleted out-of-band contributes zero; its line is
/// retained so the dangling reference stays visible to the owner.
pub async fn reprice(items: &[CartItem], catalog: &dyn CatalogStore) -> Result<Repriced> {
  let mut lines = Vec::with_capacity(items.len());
  let mut sum = Decimal::ZERO;
  for item in items {
    let product = catalog.find(item.product_id).await?;
    match &product {
      Some(product) => {
        sum += product.effective_price() * Decimal::from(item.quantity);
      }
      None => {
        warn!(product_id = %item.product_id, "Cart references a deleted product; pricing line at zero.");
      }
    }
    lines.push((item.clone(), product));
  }
  Ok(Repriced {
    lines,
    total: round_money(sum),
  })
}

/// Builds the caller-facing view from a repriced item set. The expansion
/// is display-only; the total came from price fields alone.
pub fn view_from(owner_id: Uuid, repriced: Repriced, updated_at: chrono::DateTime<chrono::Utc>) -> CartView {
  CartView {
    owner_id,
    items: repriced
      .lines
      .into_iter()
      .map(|(item, product)| CartItemView {
        product_id: item.product_id,
        quantity: item.quantity,
        product,
      })
      .collect(),
    total_amount: repriced.total,
    updated_at,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::NewProduct;
  use crate::store::memory::MemoryCatalogStore;

  fn dec(value: &str) -> Decimal {
    value.parse().unwrap()
  }

  async fn seed(catalog: &MemoryCatalogStore, price: &str, offer: Option<&str>) -> Uuid {
    let product = Product::new(NewProduct {
      name: "Widget".to_string(),
      description: "A widget".to_string(),
      price: dec(price),
      offer_price: offer.map(dec),
      category: "tools".to_string(),
      stock: 100,
      image: None,
    });
    catalog.insert(&product).await.unwrap();
    product.id
  }

  #[test]
  fn rounds_half_up_at_two_decimals() {
    assert_eq!(round_money(dec("10.005")), dec("10.01"));
    assert_eq!(round_money(dec("10.004")), dec("10.00"));
    assert_eq!(round_money(dec("2.675")), dec("2.68"));
  }

  #[tokio::test]
  async fn rounding_applies_to_the_sum_not_per_line() {
    let catalog = MemoryCatalogStore::new();
    // Two lines of 0.125 each: per-line rounding would give 0.13 + 0.13 =
    // 0.26; summing first gives 0.25.
    let a = seed(&catalog, "0.125", None).await;
    let b = seed(&catalog, "0.125", None).await;
    let items = vec![
      CartItem { product_id: a, quantity: 1 },
      CartItem { product_id: b, quantity: 1 },
    ];
    let repriced = reprice(&items, &catalog).await.unwrap();
    assert_eq!(repriced.total, dec("0.25"));
  }

  #[tokio::test]
  async fn offer_price_used_only_when_lower() {
    let catalog = MemoryCatalogStore::new();
    let discounted = seed(&catalog, "200", Some("150")).await;
    let inflated = seed(&catalog, "100", Some("120")).await;
    let items = vec![
      CartItem { product_id: discounted, quantity: 1 },
      CartItem { product_id: inflated, quantity: 1 },
    ];
    let repriced = reprice(&items, &catalog).await.unwrap();
    assert_eq!(repriced.total, dec("250.00"));
  }

  #[tokio::test]
  async fn deleted_product_contributes_zero_but_line_survives() {
    let catalog = MemoryCatalogStore::new();
    let live = seed(&catalog, "40", None).await;
    let gone = Uuid::new_v4();
    let items = vec![
      CartItem { product_id: gone, quantity: 3 },
      CartItem { product_id: live, quantity: 1 },
    ];
    let repriced = reprice(&items, &catalog).await.unwrap();
    assert_eq!(repriced.total, dec("40.00"));
    assert_eq!(repriced.lines.len(), 2);
    assert!(repriced.lines[0].1.is_none());
  }
}
