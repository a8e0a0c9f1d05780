// src/models/mod.rs

pub mod account;
pub mod cart;
pub mod product;

pub use account::{Account, NewAccount};
pub use cart::{Cart, CartItem, CartItemView, CartView};
pub use product::{NewProduct, Product, ProductPage, ProductQuery, ProductUpdate, Review, SortDirection, SortField};
