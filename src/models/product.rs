// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product. `rating` is derived from `reviews` and recomputed on
/// every review insertion, never written directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: String,
  /// List price, non-negative, currency-minor-unit precision.
  pub price: Decimal,
  /// Optional discounted price. Only used when strictly lower than `price`.
  pub offer_price: Option<Decimal>,
  pub category: String,
  pub stock: i32,
  pub image: String,
  /// Mean review rating, rounded half-up to one decimal place.
  pub rating: Decimal,
  pub reviews: Vec<Review>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
  pub reviewer_id: Uuid,
  pub rating: i32,
  pub comment: String,
  pub created_at: DateTime<Utc>,
}

impl Product {
  pub const DEFAULT_IMAGE: &'static str = "default-product.jpg";

  pub fn new(fields: NewProduct) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: fields.name,
      description: fields.description,
      price: fields.price,
      offer_price: fields.offer_price,
      category: fields.category,
      stock: fields.stock,
      image: fields.image.unwrap_or_else(|| Self::DEFAULT_IMAGE.to_string()),
      rating: Decimal::ZERO,
      reviews: Vec::new(),
      created_at: now,
      updated_at: now,
    }
  }

  /// The price a cart actually pays: the offer price when one is set and
  /// strictly lower than the list price, otherwise the list price.
  pub fn effective_price(&self) -> Decimal {
    match self.offer_price {
      Some(offer) if offer < self.price => offer,
      _ => self.price,
    }
  }

  /// Appends a review and recomputes the derived average rating.
  pub fn push_review(&mut self, review: Review) {
    self.reviews.push(review);
    self.rating = average_rating(&self.reviews);
    self.updated_at = Utc::now();
  }

  /// Applies a partial update in place. `None` fields are left untouched.
  pub fn apply_update(&mut self, update: ProductUpdate) {
    if let Some(name) = update.name {
      self.name = name;
    }
    if let Some(description) = update.description {
      self.description = description;
    }
    if let Some(price) = update.price {
      self.price = price;
    }
    if let Some(offer_price) = update.offer_price {
      self.offer_price = offer_price;
    }
    if let Some(category) = update.category {
      self.category = category;
    }
    if let Some(stock) = update.stock {
      self.stock = stock;
    }
    if let Some(image) = update.image {
      self.image = image;
    }
    self.updated_at = Utc::now();
  }
}

/// Arithmetic mean of all review ratings, rounded half-up to one decimal
/// place. Zero when there are no reviews.
pub fn average_rating(reviews: &[Review]) -> Decimal {
  if reviews.is_empty() {
    return Decimal::ZERO;
  }
  let sum: Decimal = reviews.iter().map(|r| Decimal::from(r.rating)).sum();
  let mut mean =
    (sum / Decimal::from(reviews.len() as i64)).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
  mean.rescale(1);
  mean
}

/// Fields accepted when creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  pub name: String,
  pub description: String,
  pub price: Decimal,
  pub offer_price: Option<Decimal>,
  pub category: String,
  pub stock: i32,
  pub image: Option<String>,
}

/// Partial product update. `offer_price: Some(None)` clears the offer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price: Option<Decimal>,
  #[serde(default, with = "double_option")]
  pub offer_price: Option<Option<Decimal>>,
  pub category: Option<String>,
  pub stock: Option<i32>,
  pub image: Option<String>,
}

// Distinguishes an absent `offer_price` key (no change) from an explicit
// `"offer_price": null` (clear the offer).
mod double_option {
  use rust_decimal::Decimal;
  use serde::{Deserialize, Deserializer};

  pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
  where
    D: Deserializer<'de>,
  {
    Option::<Decimal>::deserialize(deserializer).map(Some)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
  Name,
  Price,
  Rating,
  CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
  Asc,
  Desc,
}

/// Filter/sort/pagination parameters for a catalog listing.
#[derive(Debug, Clone)]
pub struct ProductQuery {
  pub category: Option<String>,
  /// Bounds apply to the list price, not the effective price.
  pub min_price: Option<Decimal>,
  pub max_price: Option<Decimal>,
  /// Case-insensitive substring match over name and description.
  pub search: Option<String>,
  pub sort_field: SortField,
  pub sort_direction: SortDirection,
  /// 1-based.
  pub page: i64,
  pub page_size: i64,
}

impl Default for ProductQuery {
  fn default() -> Self {
    Self {
      category: None,
      min_price: None,
      max_price: None,
      search: None,
      sort_field: SortField::CreatedAt,
      sort_direction: SortDirection::Desc,
      page: 1,
      page_size: Self::DEFAULT_PAGE_SIZE,
    }
  }
}

impl ProductQuery {
  pub const DEFAULT_PAGE_SIZE: i64 = 10;

  pub fn offset(&self) -> i64 {
    (self.page.max(1) - 1) * self.page_size
  }
}

/// One page of catalog results plus the overall match count.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
  pub products: Vec<Product>,
  pub total: i64,
  pub page: i64,
  pub page_size: i64,
  pub total_pages: i64,
}

impl ProductPage {
  pub fn new(products: Vec<Product>, total: i64, query: &ProductQuery) -> Self {
    let page_size = query.page_size.max(1);
    Self {
      products,
      total,
      page: query.page.max(1),
      page_size,
      total_pages: (total + page_size - 1) / page_size,
    }
  }
}
