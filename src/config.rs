// src/config.rs

use dotenvy::dotenv;
use std::env;

use crate::errors::{AppError, Result};

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,

  /// HMAC secret the token service signs session claims with.
  pub token_secret: String,
  /// Session token lifetime, in hours.
  pub token_ttl_hours: i64,

  /// Plain-text admin invite codes seeded at startup (hashed on load).
  /// Comma-separated in the environment; rotated at runtime thereafter.
  pub admin_invite_codes: Vec<String>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| {
        AppError::Internal(format!("Missing environment variable '{}': {}", var_name, e))
      })
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Internal(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;

    let token_secret = get_env("TOKEN_SECRET")?;
    if token_secret.len() < 16 {
      return Err(AppError::Internal(
        "TOKEN_SECRET must be at least 16 bytes".to_string(),
      ));
    }
    let token_ttl_hours = get_env("TOKEN_TTL_HOURS")
      .unwrap_or_else(|_| "24".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Internal(format!("Invalid TOKEN_TTL_HOURS: {}", e)))?;

    let admin_invite_codes = get_env("ADMIN_INVITE_CODES")
      .map(|raw| {
        raw
          .split(',')
          .map(str::trim)
          .filter(|code| !code.is_empty())
          .map(str::to_string)
          .collect()
      })
      .unwrap_or_default();

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      token_secret,
      token_ttl_hours,
      admin_invite_codes,
    })
  }
}
