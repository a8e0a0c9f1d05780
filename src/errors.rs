// src/errors.rs

//! Application error taxonomy and its mapping onto HTTP responses.
//!
//! Every fallible operation in the crate surfaces one of these kinds; the
//! actix `ResponseError` impl at the bottom is the single place errors are
//! turned into status codes, so nothing gets swallowed on the way out.

use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One violated field, produced by the validators in [`crate::validation`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
  pub field: String,
  pub message: String,
}

impl FieldViolation {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      message: message.into(),
    }
  }
}

/// The full set of violations found in one request payload.
///
/// Validators collect every violated field before returning, so a caller
/// sees all problems at once rather than one per round-trip.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct ValidationErrors {
  pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
  pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self.violations.push(FieldViolation::new(field, message));
  }

  pub fn is_empty(&self) -> bool {
    self.violations.is_empty()
  }

  /// Consumes the collector: `Ok(())` if nothing was recorded, otherwise
  /// the whole list wrapped in [`AppError::Validation`].
  pub fn into_result(self) -> Result<()> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(AppError::Validation(self))
    }
  }
}

impl std::fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut first = true;
    for v in &self.violations {
      if !first {
        write!(f, "; ")?;
      }
      write!(f, "{}: {}", v.field, v.message)?;
      first = false;
    }
    Ok(())
  }
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  // Deliberately carries no detail: malformed, expired, and
  // signature-invalid tokens must be indistinguishable to the caller,
  // and so must wrong-email vs wrong-password at signin.
  #[error("Unauthorized")]
  Unauthorized,

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Store unavailable: {0}")]
  Unavailable(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl AppError {
  /// Shorthand for a single-field validation failure.
  pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
    AppError::Validation(ValidationErrors {
      violations: vec![FieldViolation::new(field, message)],
    })
  }

  /// Whether a caller may safely retry the failed call as-is.
  pub fn is_retryable(&self) -> bool {
    matches!(self, AppError::Unavailable(_))
  }
}

impl From<sqlx::Error> for AppError {
  fn from(err: sqlx::Error) -> Self {
    match err {
      sqlx::Error::RowNotFound => AppError::NotFound("record not found".to_string()),
      // Pool exhaustion and transport failures are transient; surface them
      // as retryable rather than as opaque internal errors.
      sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
        AppError::Unavailable(format!("database pool: {}", err))
      }
      sqlx::Error::Io(io_err) => AppError::Unavailable(format!("database i/o: {}", io_err)),
      other => AppError::Internal(format!("database: {}", other)),
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    AppError::Internal(err.to_string())
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response.
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(errors) => HttpResponse::BadRequest().json(json!({
        "error": "Validation failed",
        "violations": errors.violations,
      })),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Conflict(m) => HttpResponse::Conflict().json(json!({"error": m})),
      AppError::Unauthorized => {
        HttpResponse::Unauthorized().json(json!({"error": "Invalid or missing credentials"}))
      }
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      AppError::Unavailable(m) => HttpResponse::ServiceUnavailable().json(json!({
        "error": "Service temporarily unavailable",
        "detail": m,
        "retryable": true,
      })),
      AppError::Internal(m) => {
        tracing::error!(detail = %m, "Internal error details");
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred"}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn transient_store_failures_map_to_retryable_unavailable() {
    let err = AppError::from(sqlx::Error::PoolTimedOut);
    assert!(matches!(err, AppError::Unavailable(_)));
    assert!(err.is_retryable());
  }

  #[test]
  fn row_not_found_maps_to_not_found() {
    let err = AppError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(!err.is_retryable());
  }

  #[test]
  fn validation_errors_display_every_field() {
    let mut errors = ValidationErrors::default();
    errors.push("name", "too short");
    errors.push("email", "not an address");
    let rendered = errors.to_string();
    assert!(rendered.contains("name: too short"));
    assert!(rendered.contains("email: not an address"));
  }

  #[test]
  fn empty_collector_is_ok() {
    assert!(ValidationErrors::default().into_result().is_ok());
  }
}
