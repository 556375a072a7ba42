//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{OrderRepository, ProductRepository};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the repositories
/// handlers work against. Configuration is consumed at startup and not kept.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pool }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The product catalog.
    #[must_use]
    pub fn catalog(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.inner.pool)
    }

    /// The order store.
    #[must_use]
    pub fn orders(&self) -> OrderRepository<'_> {
        OrderRepository::new(&self.inner.pool)
    }
}
