// src/cart/sync.rs

//! Local-to-server cart synchronization.
//!
//! Runs when a session that shopped anonymously signs in: every mirrored
//! item is replayed into the account's server cart through the ordinary
//! add-item path, so quantities merge by the same rules as any other add
//! (an item already in the server cart gets its quantity incremented).
//! The mirror is cleared only after every line landed.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cart::engine::CartEngine;
use crate::cart::local::LocalCartEngine;
use crate::errors::{AppError, Result};
use crate::models::CartView;

/// Replays the local mirror into `owner_id`'s server cart and clears the
/// mirror. Returns the merged server cart.
///
/// A mirrored line whose product has been deleted since it was added is
/// skipped rather than failing the whole merge; everything else landing
/// is worth more than a dangling reference.
#[instrument(name = "cart::sync", skip(local, engine))]
pub async fn merge_into(local: &LocalCartEngine, engine: &CartEngine, owner_id: Uuid) -> Result<CartView> {
  let items = local.items()?;
  let mut merged = 0usize;

  for item in &items {
    match engine.add_item(owner_id, item.product_id, item.quantity).await {
      Ok(_) => merged += 1,
      Err(AppError::NotFound(_)) => {
        warn!(product_id = %item.product_id, "Skipping local cart line for a product that no longer exists.");
      }
      Err(other) => return Err(other),
    }
  }

  local.reset();
  info!(lines = merged, "Local cart merged into server cart.");
  engine.cart(owner_id).await
}
