// src/models/account.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account. The password hash never leaves the process
/// boundary; identity comparisons always go through [`normalize_identity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
  pub id: Uuid,
  pub email: String,
  pub name: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub is_admin: bool,
  pub created_at: DateTime<Utc>,
}

/// Creation request handed to the credential store. `secret` is the
/// plain-text password; hashing is the store's job, not the caller's.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email: String,
  pub name: String,
  pub secret: String,
  pub is_admin: bool,
}

/// Canonical form of an account identity: trimmed and lower-cased.
/// Applied before every storage write and every lookup.
pub fn normalize_identity(raw: &str) -> String {
  raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn identity_is_trimmed_and_lowercased() {
    assert_eq!(normalize_identity("  Ada@Example.COM "), "ada@example.com");
    assert_eq!(normalize_identity("plain@host.tld"), "plain@host.tld");
  }

  #[test]
  fn password_hash_is_not_serialized() {
    let account = Account {
      id: Uuid::new_v4(),
      email: "a@b.cd".to_string(),
      name: "Ada".to_string(),
      password_hash: "$argon2id$secret".to_string(),
      is_admin: false,
      created_at: Utc::now(),
    };
    let as_json = serde_json::to_string(&account).unwrap();
    assert!(!as_json.contains("argon2id"));
    assert!(!as_json.contains("password_hash"));
  }
}
