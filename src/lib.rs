// src/lib.rs

//! Mercato: a small e-commerce backend.
//!
//! Accounts, a filterable product catalog, and a per-account shopping
//! cart whose total is never trusted from storage: every mutation (and
//! every read) reprices the cart from current catalog prices. Features:
//!  - Bearer-token sessions (signed claims) over argon2 password hashes.
//!  - Admin elevation at signup via rotatable, hashed invite codes.
//!  - One cart contract with two engines: store-backed for authenticated
//!    accounts, localStorage-mirrored for anonymous sessions, merged on
//!    sign-in.
//!  - Optimistic, version-checked cart writes so concurrent mutations of
//!    one cart never silently lose an update.
//!  - Store traits with Postgres and in-memory backends.

pub mod cart;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
pub mod web;

// --- Re-exports for the Public API ---

pub use crate::cart::engine::CartEngine;
pub use crate::cart::local::{LocalCartEngine, LocalStorage, MemoryLocalStorage};
pub use crate::cart::CartOps;
pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::models::{Account, Cart, CartItem, CartView, Product, Review};
pub use crate::services::{AdminInviteCodes, AuthContext, TokenService};
pub use crate::state::AppState;
