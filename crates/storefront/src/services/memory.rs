//! In-memory `Catalog` and `OrderStore` for unit tests.

use std::sync::Mutex;

use chrono::Utc;
use minishop_core::{NewOrder, Order, OrderId, Price, Product, ProductId};
use uuid::Uuid;

use super::{Catalog, OrderStore};
use crate::db::RepositoryError;

#[derive(Default)]
pub struct MemoryCatalog {
    products: Mutex<Vec<Product>>,
    unavailable: bool,
}

impl MemoryCatalog {
    pub fn with(products: &[(i32, &str, &str)]) -> Self {
        let products = products
            .iter()
            .map(|&(id, name, price)| Product {
                id: ProductId::new(id),
                name: name.to_owned(),
                price: Price::parse(price).unwrap_or_else(|e| panic!("bad test price {price}: {e}")),
                image: None,
                description: None,
            })
            .collect();
        Self {
            products: Mutex::new(products),
            unavailable: false,
        }
    }

    /// A catalog whose every read fails.
    pub fn unavailable() -> Self {
        Self {
            products: Mutex::default(),
            unavailable: true,
        }
    }

    pub fn delete(&self, id: ProductId) {
        if let Ok(mut products) = self.products.lock() {
            products.retain(|product| product.id != id);
        }
    }
}

impl Catalog for MemoryCatalog {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let products = self
            .products
            .lock()
            .map_err(|_| RepositoryError::DataCorruption("catalog lock poisoned".to_owned()))?;
        Ok(products.iter().find(|product| product.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        if self.unavailable {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let products = self
            .products
            .lock()
            .map_err(|_| RepositoryError::DataCorruption("catalog lock poisoned".to_owned()))?;
        Ok(products.clone())
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<(Uuid, Order)>>,
    failing: bool,
}

impl MemoryOrderStore {
    /// A store whose every append fails.
    pub fn failing() -> Self {
        Self {
            orders: Mutex::default(),
            failing: true,
        }
    }

    pub fn orders(&self) -> Vec<Order> {
        self.orders
            .lock()
            .map(|orders| orders.iter().map(|(_, order)| order.clone()).collect())
            .unwrap_or_default()
    }
}

impl OrderStore for MemoryOrderStore {
    async fn append(
        &self,
        order: &NewOrder,
        checkout_token: Uuid,
    ) -> Result<Order, RepositoryError> {
        if self.failing {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut orders = self
            .orders
            .lock()
            .map_err(|_| RepositoryError::DataCorruption("order lock poisoned".to_owned()))?;
        if let Some((_, placed)) = orders.iter().find(|(token, _)| *token == checkout_token) {
            return Ok(placed.clone());
        }
        let id = OrderId::new(i32::try_from(orders.len()).unwrap_or(i32::MAX) + 1);
        let order = order.clone().into_order(id, Utc::now());
        orders.push((checkout_token, order.clone()));
        Ok(order)
    }
}
