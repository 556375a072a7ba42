//! Minishop Core - Shared domain types.
//!
//! This crate provides the types used across all Minishop components:
//! - `storefront` - Public-facing shop (catalog, cart, checkout)
//! - `cli` - Command-line tools for migrations, catalog seeding, and order listing
//!
//! # Architecture
//!
//! The core crate contains only types and their invariants - no I/O, no
//! database access, no HTTP. Catalog lookups and order persistence live in the
//! storefront crate; everything here is plain data that can be unit tested
//! and serialized into a session.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, quantities, and contact details
//! - [`catalog`] - Products as the catalog hands them out
//! - [`cart`] - The per-visitor cart and its derived line items
//! - [`order`] - Frozen order snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;

pub use cart::{Cart, CartEntry, LineItem};
pub use catalog::{NewProduct, Product, ProductError};
pub use order::{NewOrder, Order, OrderItem};
pub use types::*;
