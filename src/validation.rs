// src/validation.rs

//! Explicit request validation.
//!
//! Each function checks every field and returns a [`ValidationErrors`]
//! listing all violations at once, wrapped in [`AppError::Validation`].
//! Validators run before any persistence call; stores never see a payload
//! that has not passed through here.

use rust_decimal::Decimal;

use crate::errors::{AppError, Result, ValidationErrors};
use crate::models::product::{NewProduct, ProductUpdate};

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 6;

/// Minimal shape check: one `@`, non-empty local part, and a dot in the
/// domain. Anything stricter belongs to a confirmation mail, not a regex.
fn is_plausible_email(email: &str) -> bool {
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.is_empty() || local.contains(char::is_whitespace) {
    return false;
  }
  match domain.rsplit_once('.') {
    Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.contains(char::is_whitespace),
    None => false,
  }
}

pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<()> {
  let mut errors = ValidationErrors::default();
  if name.trim().len() < MIN_NAME_LEN {
    errors.push("name", format!("must be at least {} characters long", MIN_NAME_LEN));
  }
  if !is_plausible_email(email.trim()) {
    errors.push("email", "must be a valid email address");
  }
  if password.len() < MIN_PASSWORD_LEN {
    errors.push(
      "password",
      format!("must be at least {} characters long", MIN_PASSWORD_LEN),
    );
  }
  errors.into_result()
}

pub fn validate_signin(email: &str, password: &str) -> Result<()> {
  let mut errors = ValidationErrors::default();
  if email.trim().is_empty() {
    errors.push("email", "is required");
  }
  if password.is_empty() {
    errors.push("password", "is required");
  }
  errors.into_result()
}

pub fn validate_product_create(fields: &NewProduct) -> Result<()> {
  let mut errors = ValidationErrors::default();
  if fields.name.trim().is_empty() {
    errors.push("name", "is required");
  }
  if fields.description.trim().is_empty() {
    errors.push("description", "is required");
  }
  if fields.category.trim().is_empty() {
    errors.push("category", "is required");
  }
  if fields.price < Decimal::ZERO {
    errors.push("price", "must not be negative");
  }
  if let Some(offer) = fields.offer_price {
    if offer < Decimal::ZERO {
      errors.push("offer_price", "must not be negative");
    }
  }
  if fields.stock < 0 {
    errors.push("stock", "must not be negative");
  }
  errors.into_result()
}

pub fn validate_product_update(update: &ProductUpdate) -> Result<()> {
  let mut errors = ValidationErrors::default();
  if let Some(name) = &update.name {
    if name.trim().is_empty() {
      errors.push("name", "must not be empty");
    }
  }
  if let Some(description) = &update.description {
    if description.trim().is_empty() {
      errors.push("description", "must not be empty");
    }
  }
  if let Some(category) = &update.category {
    if category.trim().is_empty() {
      errors.push("category", "must not be empty");
    }
  }
  if let Some(price) = update.price {
    if price < Decimal::ZERO {
      errors.push("price", "must not be negative");
    }
  }
  if let Some(Some(offer)) = update.offer_price {
    if offer < Decimal::ZERO {
      errors.push("offer_price", "must not be negative");
    }
  }
  if let Some(stock) = update.stock {
    if stock < 0 {
      errors.push("stock", "must not be negative");
    }
  }
  errors.into_result()
}

pub fn validate_review(rating: i32, comment: &str) -> Result<()> {
  let mut errors = ValidationErrors::default();
  if !(1..=5).contains(&rating) {
    errors.push("rating", "must be between 1 and 5");
  }
  if comment.trim().is_empty() {
    errors.push("comment", "is required");
  }
  errors.into_result()
}

/// Cart quantities must be at least 1; zero or negative intent is a remove,
/// not an update, and is rejected here.
pub fn validate_quantity(quantity: i32) -> Result<()> {
  if quantity < 1 {
    return Err(AppError::invalid("quantity", "must be at least 1"));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::errors::AppError;

  fn violation_fields(err: AppError) -> Vec<String> {
    match err {
      AppError::Validation(errors) => errors.violations.into_iter().map(|v| v.field).collect(),
      other => panic!("expected Validation, got {:?}", other),
    }
  }

  #[test]
  fn signup_reports_every_violated_field_at_once() {
    let err = validate_signup("A", "not-an-email", "short").unwrap_err();
    assert_eq!(violation_fields(err), vec!["name", "email", "password"]);
  }

  #[test]
  fn signup_accepts_a_reasonable_payload() {
    assert!(validate_signup("Ada Lovelace", "ada@example.com", "hunter22").is_ok());
  }

  #[test]
  fn email_shape_check_rejects_the_obvious() {
    for bad in ["", "no-at-sign", "@host.tld", "a@", "a@nodot", "a b@host.tld"] {
      assert!(!is_plausible_email(bad), "should reject {:?}", bad);
    }
    assert!(is_plausible_email("user@sub.example.com"));
  }

  #[test]
  fn quantity_below_one_is_invalid() {
    assert!(validate_quantity(0).is_err());
    assert!(validate_quantity(-3).is_err());
    assert!(validate_quantity(1).is_ok());
  }

  #[test]
  fn review_rating_bounds_are_inclusive() {
    assert!(validate_review(1, "ok").is_ok());
    assert!(validate_review(5, "ok").is_ok());
    assert!(validate_review(0, "ok").is_err());
    assert!(validate_review(6, "ok").is_err());
  }

  #[test]
  fn product_create_collects_all_violations() {
    let fields = NewProduct {
      name: " ".to_string(),
      description: String::new(),
      price: "-1".parse().unwrap(),
      offer_price: Some("-2".parse().unwrap()),
      category: String::new(),
      stock: -1,
      image: None,
    };
    let err = validate_product_create(&fields).unwrap_err();
    assert_eq!(
      violation_fields(err),
      vec!["name", "description", "category", "price", "offer_price", "stock"]
    );
  }
}
