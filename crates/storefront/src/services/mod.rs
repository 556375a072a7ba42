//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Cart operations validated against the catalog
//! - `checkout` - Turns a cart into a persisted order
//!
//! Both are written against the [`Catalog`] and [`OrderStore`] traits rather
//! than `PostgreSQL` directly. The `db` repositories implement them for the
//! running service; tests plug in in-memory versions.

use std::future::Future;

use minishop_core::{NewOrder, Order, Product, ProductId};
use uuid::Uuid;

use crate::db::RepositoryError;

pub mod cart;
pub mod checkout;
#[cfg(test)]
pub(crate) mod memory;

pub use cart::{CartError, CartView};
pub use checkout::{Checkout, CheckoutError};

/// Read access to the product catalog.
///
/// The catalog is the source of truth for product names and prices. Cart and
/// checkout code only ever reads from it.
pub trait Catalog: Send + Sync {
    /// Look up a product by id. `Ok(None)` means the product does not exist
    /// (or has been deleted).
    fn find(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>, RepositoryError>> + Send;

    /// List every product for browsing.
    fn list(&self) -> impl Future<Output = Result<Vec<Product>, RepositoryError>> + Send;
}

/// Append-only storage for placed orders.
pub trait OrderStore: Send + Sync {
    /// Persist an order atomically, assigning its id and creation time.
    ///
    /// `checkout_token` identifies the cart submission. If an order was
    /// already stored under the same token, that order is returned and
    /// nothing new is written.
    ///
    /// On error nothing has been stored.
    fn append(
        &self,
        order: &NewOrder,
        checkout_token: Uuid,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;
}
