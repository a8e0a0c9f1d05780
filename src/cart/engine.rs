// src/cart/engine.rs

//! The store-backed cart engine.
//!
//! No cart state lives in the process: every operation loads the owner's
//! cart from the store, applies the mutation, reprices from current
//! catalog prices, and persists `{items, total_amount}` as one
//! version-checked write. A version clash means another request won the
//! race; the operation re-reads and re-applies, so two concurrent
//! mutations of one cart both land instead of one clobbering the other.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::cart::pricing;
use crate::cart::CartOps;
use crate::errors::{AppError, Result};
use crate::models::{Cart, CartView};
use crate::store::{CartStore, CatalogStore};
use crate::validation::validate_quantity;

/// Attempts per mutation before surfacing the version clash to the caller.
const MAX_WRITE_ATTEMPTS: u32 = 3;

#[derive(Clone)]
pub struct CartEngine {
  carts: Arc<dyn CartStore>,
  catalog: Arc<dyn CatalogStore>,
}

impl CartEngine {
  pub fn new(carts: Arc<dyn CartStore>, catalog: Arc<dyn CatalogStore>) -> Self {
    Self { carts, catalog }
  }

  /// Binds the engine to one account, yielding the [`CartOps`] handle the
  /// HTTP surface works with.
  pub fn for_account(&self, owner_id: Uuid) -> AccountCart {
    AccountCart {
      engine: self.clone(),
      owner_id,
    }
  }

  /// Returns the account's cart, creating an empty one on first access.
  #[instrument(name = "cart::get", skip(self))]
  pub async fn cart(&self, owner_id: Uuid) -> Result<CartView> {
    let cart = match self.carts.find(owner_id).await? {
      Some(cart) => cart,
      None => self.materialize(owner_id).await?,
    };
    // Reads reprice for display but persist nothing; the stored total is
    // only refreshed by mutations.
    let repriced = pricing::reprice(&cart.items, self.catalog.as_ref()).await?;
    Ok(pricing::view_from(owner_id, repriced, cart.updated_at))
  }

  #[instrument(name = "cart::add_item", skip(self))]
  pub async fn add_item(&self, owner_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartView> {
    validate_quantity(quantity)?;
    if self.catalog.find(product_id).await?.is_none() {
      return Err(AppError::NotFound(format!("product {}", product_id)));
    }

    self
      .mutate(owner_id, CreateIfMissing::Yes, move |cart| {
        cart.add(product_id, quantity);
        Ok(())
      })
      .await
  }

  #[instrument(name = "cart::set_quantity", skip(self))]
  pub async fn set_quantity(&self, owner_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartView> {
    validate_quantity(quantity)?;

    self
      .mutate(owner_id, CreateIfMissing::No, move |cart| {
        match cart.item_mut(product_id) {
          Some(item) => {
            item.quantity = quantity;
            Ok(())
          }
          None => Err(AppError::NotFound(format!("product {} not in cart", product_id))),
        }
      })
      .await
  }

  #[instrument(name = "cart::remove_item", skip(self))]
  pub async fn remove_item(&self, owner_id: Uuid, product_id: Uuid) -> Result<CartView> {
    self
      .mutate(owner_id, CreateIfMissing::No, move |cart| {
        // Removing an absent product is an idempotent success; the cart
        // still gets repriced and rewritten below.
        cart.remove(product_id);
        Ok(())
      })
      .await
  }

  #[instrument(name = "cart::clear", skip(self))]
  pub async fn clear(&self, owner_id: Uuid) -> Result<CartView> {
    self
      .mutate(owner_id, CreateIfMissing::No, move |cart| {
        cart.clear();
        Ok(())
      })
      .await
  }

  async fn materialize(&self, owner_id: Uuid) -> Result<Cart> {
    let cart = Cart::empty(owner_id);
    match self.carts.insert(&cart).await {
      Ok(()) => Ok(cart),
      // Lost a creation race: another request materialized it first.
      Err(AppError::Conflict(_)) => self
        .carts
        .find(owner_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("cart for {} vanished after creation race", owner_id))),
      Err(other) => Err(other),
    }
  }

  /// The read-modify-reprice-write loop every mutation goes through.
  ///
  /// `apply` must be a pure function of the freshly loaded cart: on a
  /// version clash it runs again against the re-read state, which is what
  /// keeps increment-style mutations from double-applying.
  async fn mutate<F>(&self, owner_id: Uuid, create: CreateIfMissing, apply: F) -> Result<CartView>
  where
    F: Fn(&mut Cart) -> Result<()>,
  {
    let mut last_clash: Option<AppError> = None;

    for attempt in 0..MAX_WRITE_ATTEMPTS {
      let mut cart = match self.carts.find(owner_id).await? {
        Some(cart) => cart,
        None => match create {
          CreateIfMissing::Yes => self.materialize(owner_id).await?,
          CreateIfMissing::No => {
            return Err(AppError::NotFound(format!("cart for account {}", owner_id)));
          }
        },
      };
      let loaded_version = cart.version;

      apply(&mut cart)?;

      let repriced = pricing::reprice(&cart.items, self.catalog.as_ref()).await?;
      cart.total_amount = repriced.total;
      cart.version = loaded_version + 1;
      cart.updated_at = Utc::now();

      match self.carts.update(&cart, loaded_version).await {
        Ok(()) => return Ok(pricing::view_from(owner_id, repriced, cart.updated_at)),
        Err(AppError::Conflict(reason)) => {
          debug!(owner_id = %owner_id, attempt, %reason, "Cart write lost a race; re-reading.");
          last_clash = Some(AppError::Conflict(reason));
        }
        Err(other) => return Err(other),
      }
    }

    Err(last_clash.unwrap_or_else(|| {
      AppError::Conflict(format!("cart for account {} kept changing concurrently", owner_id))
    }))
  }
}

enum CreateIfMissing {
  Yes,
  No,
}

/// A [`CartEngine`] bound to one authenticated account. This is the
/// store-backed implementation of the shared cart contract.
pub struct AccountCart {
  engine: CartEngine,
  owner_id: Uuid,
}

#[async_trait]
impl CartOps for AccountCart {
  async fn cart(&self) -> Result<CartView> {
    self.engine.cart(self.owner_id).await
  }

  async fn add_item(&self, product_id: Uuid, quantity: i32) -> Result<CartView> {
    self.engine.add_item(self.owner_id, product_id, quantity).await
  }

  async fn set_quantity(&self, product_id: Uuid, quantity: i32) -> Result<CartView> {
    self.engine.set_quantity(self.owner_id, product_id, quantity).await
  }

  async fn remove_item(&self, product_id: Uuid) -> Result<CartView> {
    self.engine.remove_item(self.owner_id, product_id).await
  }

  async fn clear(&self) -> Result<CartView> {
    self.engine.clear(self.owner_id).await
  }
}
