// src/services/admin_invites.rs

//! Rotatable admin invite codes.
//!
//! Admin elevation at signup is gated on possession of an invite code.
//! Codes are never stored in the clear: the service keeps Argon2 hashes of
//! the currently active set, and `rotate` swaps the whole set so a leaked
//! code stops granting elevation the moment it is rotated out.

use parking_lot::RwLock;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::services::password;

pub struct AdminInviteCodes {
  active_hashes: RwLock<Vec<String>>,
}

impl AdminInviteCodes {
  /// Builds the store from plain-text codes (hashed on the way in).
  /// Typically fed from configuration at startup.
  pub fn from_plain_codes<I, S>(codes: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut hashes = Vec::new();
    for code in codes {
      let code = code.as_ref().trim();
      if code.is_empty() {
        continue;
      }
      hashes.push(password::hash_secret(code)?);
    }
    Ok(Self {
      active_hashes: RwLock::new(hashes),
    })
  }

  /// An empty store: every redemption attempt fails.
  pub fn disabled() -> Self {
    Self {
      active_hashes: RwLock::new(Vec::new()),
    }
  }

  /// Checks a candidate code against every active hash.
  #[instrument(name = "admin_invites::redeem", skip_all)]
  pub fn redeem(&self, candidate: &str) -> Result<bool> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
      return Ok(false);
    }
    let hashes = self.active_hashes.read();
    for hash in hashes.iter() {
      if password::verify_secret(hash, candidate)? {
        return Ok(true);
      }
    }
    Ok(false)
  }

  /// Replaces the active set. Codes rotated out stop redeeming immediately.
  #[instrument(name = "admin_invites::rotate", skip_all)]
  pub fn rotate<I, S>(&self, codes: I) -> Result<()>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut hashes = Vec::new();
    for code in codes {
      let code = code.as_ref().trim();
      if code.is_empty() {
        continue;
      }
      hashes.push(password::hash_secret(code)?);
    }
    let count = hashes.len();
    *self.active_hashes.write() = hashes;
    info!(active_codes = count, "Admin invite codes rotated.");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn active_code_redeems() {
    let invites = AdminInviteCodes::from_plain_codes(["first-code", "second-code"]).unwrap();
    assert!(invites.redeem("first-code").unwrap());
    assert!(invites.redeem("second-code").unwrap());
    assert!(!invites.redeem("third-code").unwrap());
  }

  #[test]
  fn rotation_invalidates_old_codes() {
    let invites = AdminInviteCodes::from_plain_codes(["old-code"]).unwrap();
    assert!(invites.redeem("old-code").unwrap());

    invites.rotate(["new-code"]).unwrap();
    assert!(!invites.redeem("old-code").unwrap());
    assert!(invites.redeem("new-code").unwrap());
  }

  #[test]
  fn empty_candidate_never_redeems() {
    let invites = AdminInviteCodes::from_plain_codes(["code"]).unwrap();
    assert!(!invites.redeem("").unwrap());
    assert!(!invites.redeem("   ").unwrap());
  }

  #[test]
  fn disabled_store_rejects_everything() {
    let invites = AdminInviteCodes::disabled();
    assert!(!invites.redeem("anything").unwrap());
  }
}
