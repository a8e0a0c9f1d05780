// src/store/memory.rs

//! In-memory store backends.
//!
//! Used by the test suite and by the local (unauthenticated) cart mirror.
//! Semantics mirror the Postgres backends exactly, including the
//! version-checked cart write, so the engines cannot tell them apart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::account::normalize_identity;
use crate::models::product::{SortDirection, SortField};
use crate::models::{Account, Cart, NewAccount, Product, ProductPage, ProductQuery, ProductUpdate, Review};
use crate::services::password;
use crate::store::{CartStore, CatalogStore, CredentialStore};

#[derive(Default)]
pub struct MemoryCredentialStore {
  accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryCredentialStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
  async fn create(&self, account: NewAccount) -> Result<Account> {
    let identity = normalize_identity(&account.email);
    let password_hash = password::hash_secret(&account.secret)?;

    let mut accounts = self.accounts.write();
    if accounts.values().any(|existing| existing.email == identity) {
      return Err(AppError::Conflict(format!("account '{}' already exists", identity)));
    }
    let record = Account {
      id: Uuid::new_v4(),
      email: identity,
      name: account.name.trim().to_string(),
      password_hash,
      is_admin: account.is_admin,
      created_at: Utc::now(),
    };
    accounts.insert(record.id, record.clone());
    Ok(record)
  }

  async fn find_by_identity(&self, identity: &str) -> Result<Option<Account>> {
    let identity = normalize_identity(identity);
    Ok(self.accounts.read().values().find(|a| a.email == identity).cloned())
  }

  async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
    Ok(self.accounts.read().get(&id).cloned())
  }
}

#[derive(Default)]
pub struct MemoryCatalogStore {
  products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryCatalogStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
  async fn list(&self, query: &ProductQuery) -> Result<ProductPage> {
    let products = self.products.read();
    let search = query.search.as_ref().map(|s| s.to_lowercase());

    let mut matches: Vec<Product> = products
      .values()
      .filter(|p| {
        query.category.as_ref().is_none_or(|c| &p.category == c)
          && query.min_price.is_none_or(|min| p.price >= min)
          && query.max_price.is_none_or(|max| p.price <= max)
          && search.as_ref().is_none_or(|needle| {
            p.name.to_lowercase().contains(needle) || p.description.to_lowercase().contains(needle)
          })
      })
      .cloned()
      .collect();

    matches.sort_by(|a, b| {
      let ordering = match query.sort_field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Price => a.price.cmp(&b.price),
        SortField::Rating => a.rating.cmp(&b.rating),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
      };
      match query.sort_direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
      }
    });

    let total = matches.len() as i64;
    let page: Vec<Product> = matches
      .into_iter()
      .skip(query.offset() as usize)
      .take(query.page_size.max(0) as usize)
      .collect();
    Ok(ProductPage::new(page, total, query))
  }

  async fn find(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.products.read().get(&id).cloned())
  }

  async fn insert(&self, product: &Product) -> Result<()> {
    self.products.write().insert(product.id, product.clone());
    Ok(())
  }

  async fn update(&self, id: Uuid, update: ProductUpdate) -> Result<Option<Product>> {
    let mut products = self.products.write();
    Ok(products.get_mut(&id).map(|product| {
      product.apply_update(update);
      product.clone()
    }))
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    Ok(self.products.write().remove(&id).is_some())
  }

  async fn add_review(&self, id: Uuid, review: Review) -> Result<Option<Product>> {
    let mut products = self.products.write();
    Ok(products.get_mut(&id).map(|product| {
      product.push_review(review);
      product.clone()
    }))
  }
}

#[derive(Default)]
pub struct MemoryCartStore {
  carts: RwLock<HashMap<Uuid, Cart>>,
}

impl MemoryCartStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CartStore for MemoryCartStore {
  async fn find(&self, owner_id: Uuid) -> Result<Option<Cart>> {
    Ok(self.carts.read().get(&owner_id).cloned())
  }

  async fn insert(&self, cart: &Cart) -> Result<()> {
    let mut carts = self.carts.write();
    if carts.contains_key(&cart.owner_id) {
      return Err(AppError::Conflict(format!(
        "cart for account {} already exists",
        cart.owner_id
      )));
    }
    carts.insert(cart.owner_id, cart.clone());
    Ok(())
  }

  async fn update(&self, cart: &Cart, expected_version: i64) -> Result<()> {
    let mut carts = self.carts.write();
    match carts.get_mut(&cart.owner_id) {
      Some(stored) if stored.version == expected_version => {
        *stored = cart.clone();
        Ok(())
      }
      Some(stored) => Err(AppError::Conflict(format!(
        "cart version clash for account {}: stored {}, expected {}",
        cart.owner_id, stored.version, expected_version
      ))),
      None => Err(AppError::NotFound(format!("cart for account {}", cart.owner_id))),
    }
  }
}
