// tests/local_cart_tests.rs
mod common;

use std::sync::Arc;

use common::*;
use mercato::cart::local::{LocalCartEngine, MemoryLocalStorage};
use mercato::cart::{sync, CartOps};
use mercato::errors::AppError;
use rust_decimal::Decimal;
use uuid::Uuid;

fn local_engine(h: &TestHarness) -> LocalCartEngine {
  LocalCartEngine::new(Arc::new(MemoryLocalStorage::new()), h.catalog.clone())
}

#[tokio::test]
async fn starts_empty_and_merges_quantities_like_the_server_engine() {
  let h = harness();
  let local = local_engine(&h);
  let p1 = seed_product(&h.catalog, "Lamp", "20", None).await;

  let cart = local.cart().await.unwrap();
  assert!(cart.items.is_empty());
  assert_eq!(cart.total_amount, Decimal::ZERO);

  local.add_item(p1, 2).await.unwrap();
  let cart = local.add_item(p1, 3).await.unwrap();
  assert_eq!(cart.items.len(), 1);
  assert_eq!(cart.items[0].quantity, 5);
  assert_eq!(cart.total_amount, dec("100.00"));
}

#[tokio::test]
async fn mirrors_server_engine_semantics_for_the_basic_lifecycle() {
  let h = harness();
  let local = local_engine(&h);
  let p1 = seed_product(&h.catalog, "Desk", "100", None).await;

  let cart = local.add_item(p1, 1).await.unwrap();
  assert_eq!(cart.total_amount, dec("100.00"));

  let cart = local.add_item(p1, 2).await.unwrap();
  assert_eq!(cart.items[0].quantity, 3);
  assert_eq!(cart.total_amount, dec("300.00"));

  let cart = local.set_quantity(p1, 1).await.unwrap();
  assert_eq!(cart.total_amount, dec("100.00"));

  let cart = local.remove_item(p1).await.unwrap();
  assert!(cart.items.is_empty());
  assert_eq!(cart.total_amount, Decimal::ZERO);
}

#[tokio::test]
async fn rejects_bad_quantities_and_unknown_products() {
  let h = harness();
  let local = local_engine(&h);
  let p1 = seed_product(&h.catalog, "Desk", "100", None).await;

  assert!(matches!(
    local.add_item(p1, 0).await.unwrap_err(),
    AppError::Validation(_)
  ));
  assert!(matches!(
    local.add_item(Uuid::new_v4(), 1).await.unwrap_err(),
    AppError::NotFound(_)
  ));
  assert!(matches!(
    local.set_quantity(p1, 1).await.unwrap_err(),
    AppError::NotFound(_)
  ));
}

#[tokio::test]
async fn remove_and_clear_are_safe_on_an_untouched_mirror() {
  let h = harness();
  let local = local_engine(&h);

  let cart = local.remove_item(Uuid::new_v4()).await.unwrap();
  assert!(cart.items.is_empty());

  let cart = local.clear().await.unwrap();
  assert!(cart.items.is_empty());
  assert_eq!(cart.total_amount, Decimal::ZERO);
}

#[tokio::test]
async fn local_reads_reprice_against_the_current_catalog() {
  let h = harness();
  let local = local_engine(&h);
  let p1 = seed_product(&h.catalog, "Mug", "10", None).await;
  local.add_item(p1, 2).await.unwrap();

  use mercato::models::ProductUpdate;
  use mercato::store::CatalogStore;
  h.catalog
    .update(
      p1,
      ProductUpdate {
        price: Some(dec("25")),
        ..ProductUpdate::default()
      },
    )
    .await
    .unwrap();

  let cart = local.cart().await.unwrap();
  assert_eq!(cart.total_amount, dec("50.00"));
}

#[tokio::test]
async fn sign_in_merges_the_mirror_into_the_server_cart() {
  let h = harness();
  let local = local_engine(&h);
  let owner = Uuid::new_v4();
  let p1 = seed_product(&h.catalog, "Fork", "2", None).await;
  let p2 = seed_product(&h.catalog, "Spoon", "3", None).await;

  // Anonymous session accumulates items; the account already has one of
  // them in its server cart from an earlier visit.
  local.add_item(p1, 2).await.unwrap();
  local.add_item(p2, 1).await.unwrap();
  h.engine.add_item(owner, p1, 1).await.unwrap();

  let merged = sync::merge_into(&local, &h.engine, owner).await.unwrap();

  assert_eq!(merged.items.len(), 2);
  let fork = merged.items.iter().find(|i| i.product_id == p1).unwrap();
  assert_eq!(fork.quantity, 3); // 1 on the server + 2 mirrored
  let spoon = merged.items.iter().find(|i| i.product_id == p2).unwrap();
  assert_eq!(spoon.quantity, 1);
  assert_eq!(merged.total_amount, dec("9.00"));

  // The mirror is drained once everything landed.
  assert!(local.items().unwrap().is_empty());
  let after = local.cart().await.unwrap();
  assert!(after.items.is_empty());
}

#[tokio::test]
async fn merge_skips_lines_whose_product_vanished() {
  let h = harness();
  let local = local_engine(&h);
  let owner = Uuid::new_v4();
  let keeper = seed_product(&h.catalog, "Keeper", "30", None).await;
  let doomed = seed_product(&h.catalog, "Doomed", "70", None).await;

  local.add_item(keeper, 1).await.unwrap();
  local.add_item(doomed, 1).await.unwrap();

  use mercato::store::CatalogStore;
  h.catalog.delete(doomed).await.unwrap();

  let merged = sync::merge_into(&local, &h.engine, owner).await.unwrap();
  assert_eq!(merged.items.len(), 1);
  assert_eq!(merged.items[0].product_id, keeper);
  assert_eq!(merged.total_amount, dec("30.00"));
}
