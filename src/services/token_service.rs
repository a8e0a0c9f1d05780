// src/services/token_service.rs

//! Signed session tokens.
//!
//! Issues and verifies HS256 JWTs carrying the account id, the admin flag,
//! and an expiry. Verification failures are deliberately collapsed into a
//! single [`AppError::Unauthorized`]: the caller must not be able to tell
//! a malformed token from an expired or forged one.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};

/// The verified identity attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
  pub account_id: Uuid,
  pub admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  sub: Uuid,
  admin: bool,
  iat: i64,
  exp: i64,
}

pub struct TokenService {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  default_ttl: Duration,
}

impl TokenService {
  pub const DEFAULT_TTL_HOURS: i64 = 24;

  pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
    Self {
      encoding_key: EncodingKey::from_secret(secret),
      decoding_key: DecodingKey::from_secret(secret),
      default_ttl,
    }
  }

  pub fn with_default_ttl(secret: &[u8]) -> Self {
    Self::new(secret, Duration::hours(Self::DEFAULT_TTL_HOURS))
  }

  /// Issues a signed token for `account_id`, valid for `ttl` (or the
  /// service default when `None`).
  #[instrument(name = "tokens::issue", skip(self), fields(%account_id))]
  pub fn issue(&self, account_id: Uuid, admin: bool, ttl: Option<Duration>) -> Result<String> {
    let now = Utc::now();
    let ttl = ttl.unwrap_or(self.default_ttl);
    let claims = Claims {
      sub: account_id,
      admin,
      iat: now.timestamp(),
      exp: (now + ttl).timestamp(),
    };
    encode(&Header::default(), &claims, &self.encoding_key)
      .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))
  }

  /// Verifies a token and returns the claims it carries.
  ///
  /// Malformed, expired, and signature-invalid tokens all map to the same
  /// `Unauthorized`; the distinction is logged but never surfaced.
  #[instrument(name = "tokens::verify", skip_all)]
  pub fn verify(&self, token: &str) -> Result<AuthContext> {
    let mut validation = Validation::default();
    validation.leeway = 0;
    match decode::<Claims>(token, &self.decoding_key, &validation) {
      Ok(data) => Ok(AuthContext {
        account_id: data.claims.sub,
        admin: data.claims.admin,
      }),
      Err(e) => {
        debug!(reason = %e, "Token verification failed.");
        Err(AppError::Unauthorized)
      }
    }
  }
}
