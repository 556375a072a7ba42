//! Integration tests for Minishop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p minishop-integration-tests
//! ```
//!
//! No database is needed: the scenarios run the real cart service and checkout
//! against the in-memory [`TestCatalog`] and [`TestOrderStore`] defined here.
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Cart service behavior against a live-editable catalog
//! - `checkout_scenarios` - Order placement, failures, and retries
//! - `cart_properties` - Property tests over random operation sequences

use std::sync::Mutex;

use chrono::Utc;
use minishop_core::{NewOrder, Order, OrderId, Price, Product, ProductId};
use minishop_storefront::db::RepositoryError;
use minishop_storefront::services::{Catalog, OrderStore};
use uuid::Uuid;

fn poisoned() -> RepositoryError {
    RepositoryError::DataCorruption("test store lock poisoned".to_string())
}

/// A catalog the test can edit between cart operations.
#[derive(Default)]
pub struct TestCatalog {
    products: Mutex<Vec<Product>>,
}

impl TestCatalog {
    /// Build a catalog from `(id, name, price)` triples.
    ///
    /// # Panics
    ///
    /// Panics if a price is not a positive decimal.
    #[must_use]
    pub fn with(products: &[(i32, &str, &str)]) -> Self {
        let catalog = Self::default();
        for &(id, name, price) in products {
            catalog.put(id, name, price);
        }
        catalog
    }

    /// Insert or replace a product.
    ///
    /// # Panics
    ///
    /// Panics if `price` is not a positive decimal.
    pub fn put(&self, id: i32, name: &str, price: &str) {
        let product = Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            price: Price::parse(price).unwrap_or_else(|e| panic!("bad test price {price}: {e}")),
            image: None,
            description: None,
        };
        if let Ok(mut products) = self.products.lock() {
            products.retain(|p| p.id != product.id);
            products.push(product);
        }
    }

    /// Change a product's price.
    pub fn set_price(&self, id: i32, price: &str) {
        let name = self
            .products
            .lock()
            .ok()
            .and_then(|products| {
                products
                    .iter()
                    .find(|p| p.id == ProductId::new(id))
                    .map(|p| p.name.clone())
            });
        if let Some(name) = name {
            self.put(id, &name, price);
        }
    }

    /// Delete a product, as an administrator would.
    pub fn delete(&self, id: i32) {
        if let Ok(mut products) = self.products.lock() {
            products.retain(|p| p.id != ProductId::new(id));
        }
    }
}

impl Catalog for TestCatalog {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.lock().map_err(|_| poisoned())?;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.lock().map_err(|_| poisoned())?;
        Ok(products.clone())
    }
}

/// An order store that records appends and can be switched into failure.
///
/// Appends are keyed by checkout token like the database store: a second
/// append with a used token returns the stored order.
#[derive(Default)]
pub struct TestOrderStore {
    orders: Mutex<Vec<(Uuid, Order)>>,
    failing: Mutex<bool>,
}

impl TestOrderStore {
    /// Make subsequent appends fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut flag) = self.failing.lock() {
            *flag = failing;
        }
    }

    /// Every order stored so far.
    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        self.orders
            .lock()
            .map(|orders| orders.iter().map(|(_, order)| order.clone()).collect())
            .unwrap_or_default()
    }
}

impl OrderStore for TestOrderStore {
    async fn append(
        &self,
        order: &NewOrder,
        checkout_token: Uuid,
    ) -> Result<Order, RepositoryError> {
        if self.failing.lock().map(|flag| *flag).unwrap_or(true) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut orders = self.orders.lock().map_err(|_| poisoned())?;
        if let Some((_, stored)) = orders.iter().find(|(token, _)| *token == checkout_token) {
            return Ok(stored.clone());
        }
        let next_id = i32::try_from(orders.len()).unwrap_or(i32::MAX).saturating_add(1);
        let stored = order.clone().into_order(OrderId::new(next_id), Utc::now());
        orders.push((checkout_token, stored.clone()));
        Ok(stored)
    }
}
