// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use std::sync::Arc;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use uuid::Uuid;

use mercato::cart::engine::CartEngine;
use mercato::models::{NewAccount, NewProduct, Product};
use mercato::store::memory::{MemoryCartStore, MemoryCatalogStore, MemoryCredentialStore};
use mercato::store::{CatalogStore, CredentialStore};

static TRACING: Lazy<()> = Lazy::new(|| {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING);
}

pub fn dec(value: &str) -> Decimal {
  value.parse().unwrap()
}

/// The usual fixture: a cart engine over fresh in-memory stores, with the
/// catalog handle exposed so tests can edit prices mid-scenario.
pub struct TestHarness {
  pub catalog: Arc<MemoryCatalogStore>,
  pub cart_store: Arc<MemoryCartStore>,
  pub engine: Arc<CartEngine>,
}

pub fn harness() -> TestHarness {
  setup_tracing();
  let catalog = Arc::new(MemoryCatalogStore::new());
  let cart_store = Arc::new(MemoryCartStore::new());
  let engine = Arc::new(CartEngine::new(cart_store.clone(), catalog.clone()));
  TestHarness {
    catalog,
    cart_store,
    engine,
  }
}

pub fn product(name: &str, price: &str, offer: Option<&str>) -> Product {
  Product::new(NewProduct {
    name: name.to_string(),
    description: format!("{} description", name),
    price: dec(price),
    offer_price: offer.map(dec),
    category: "general".to_string(),
    stock: 100,
    image: None,
  })
}

pub async fn seed_product(catalog: &MemoryCatalogStore, name: &str, price: &str, offer: Option<&str>) -> Uuid {
  let p = product(name, price, offer);
  catalog.insert(&p).await.unwrap();
  p.id
}

pub async fn seed_account(credentials: &MemoryCredentialStore, email: &str) -> Uuid {
  credentials
    .create(NewAccount {
      email: email.to_string(),
      name: "Test Account".to_string(),
      secret: "hunter22".to_string(),
      is_admin: false,
    })
    .await
    .unwrap()
    .id
}
