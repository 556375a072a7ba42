//! The checkout transaction.
//!
//! Resolves the cart exactly as the cart view does, snapshots the resolved
//! lines into a [`NewOrder`], persists it in one atomic write, and only then
//! clears the cart. Any failure leaves the cart as it was so the visitor can
//! retry. A retry with the same checkout token gets the order that was
//! already stored.

use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use minishop_core::{Cart, ContactDetails, NewOrder, Order};

use super::cart::resolve;
use super::{Catalog, OrderStore};
use crate::db::RepositoryError;

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing in the cart resolves to a product in the catalog.
    #[error("cart is empty")]
    EmptyCart,

    /// The order could not be stored. Nothing was written.
    #[error("failed to persist order: {0}")]
    Persistence(#[source] RepositoryError),

    /// The catalog could not be read while resolving the cart.
    #[error("failed to read catalog: {0}")]
    Catalog(#[source] RepositoryError),
}

/// Places orders from carts.
pub struct Checkout<'a, C, S> {
    catalog: &'a C,
    orders: &'a S,
}

impl<'a, C: Catalog, S: OrderStore> Checkout<'a, C, S> {
    #[must_use]
    pub const fn new(catalog: &'a C, orders: &'a S) -> Self {
        Self { catalog, orders }
    }

    /// Turn the cart into a persisted order and clear the cart.
    ///
    /// Cart entries whose product has been deleted are left out of the order.
    /// The order total is the same total the cart view shows. Calling this
    /// again with the same `checkout_token` returns the first order.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::EmptyCart` if no entry resolves to a product
    /// - `CheckoutError::Catalog` if the catalog cannot be read
    /// - `CheckoutError::Persistence` if the order store rejects the write
    ///
    /// The cart is unchanged in every error case.
    #[instrument(skip_all, fields(entries = cart.len()))]
    pub async fn place_order(
        &self,
        cart: &mut Cart,
        contact: ContactDetails,
        checkout_token: Uuid,
    ) -> Result<Order, CheckoutError> {
        let view = resolve(cart, self.catalog)
            .await
            .map_err(CheckoutError::Catalog)?;

        let new_order =
            NewOrder::from_lines(contact, &view.lines).ok_or(CheckoutError::EmptyCart)?;

        let order = self
            .orders
            .append(&new_order, checkout_token)
            .await
            .map_err(CheckoutError::Persistence)?;

        cart.clear();

        tracing::info!(
            order_id = %order.id,
            items = order.items.len(),
            total = %order.total,
            skipped = view.missing.len(),
            "Order placed"
        );
        Ok(order)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::cart;
    use crate::services::memory::{MemoryCatalog, MemoryOrderStore};
    use minishop_core::ProductId;

    const A: ProductId = ProductId::new(1);
    const B: ProductId = ProductId::new(2);
    const X: ProductId = ProductId::new(3);

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::with(&[(1, "A", "10"), (2, "B", "20"), (3, "X", "15")])
    }

    fn contact() -> ContactDetails {
        ContactDetails::parse("Ada", "ada@example.com", "12 Analytical Way").unwrap()
    }

    #[tokio::test]
    async fn test_place_order_snapshots_and_clears_cart() {
        let catalog = catalog();
        let store = MemoryOrderStore::default();
        let mut cart = Cart::new();
        cart::add(&mut cart, &catalog, A).await.unwrap();
        cart::add(&mut cart, &catalog, A).await.unwrap();
        cart::add(&mut cart, &catalog, B).await.unwrap();
        let view_total = cart::view(&cart, &catalog).await.unwrap().total;

        let order = Checkout::new(&catalog, &store)
            .place_order(&mut cart, contact(), Uuid::new_v4())
            .await
            .unwrap();

        let items: Vec<_> = order
            .items
            .iter()
            .map(|item| (item.name.as_str(), item.quantity.get(), item.unit_price.to_string()))
            .collect();
        assert_eq!(
            items,
            vec![("A", 2, "10.00".to_owned()), ("B", 1, "20.00".to_owned())]
        );
        assert_eq!(order.total, view_total);
        assert_eq!(order.total.to_string(), "40.00");
        assert!(cart.is_empty());
        assert_eq!(store.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let catalog = catalog();
        let store = MemoryOrderStore::default();
        let mut cart = Cart::new();

        let err = Checkout::new(&catalog, &store)
            .place_order(&mut cart, contact(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(store.orders().is_empty());
    }

    #[tokio::test]
    async fn test_only_deleted_products_is_empty_cart() {
        let catalog = catalog();
        let store = MemoryOrderStore::default();
        let mut cart = Cart::new();
        for _ in 0..3 {
            cart::add(&mut cart, &catalog, X).await.unwrap();
        }
        catalog.delete(X);

        let err = Checkout::new(&catalog, &store)
            .place_order(&mut cart, contact(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));
        assert_eq!(cart.len(), 1);
        assert!(store.orders().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_leaves_cart() {
        let catalog = catalog();
        let store = MemoryOrderStore::failing();
        let mut cart = Cart::new();
        cart::add(&mut cart, &catalog, A).await.unwrap();
        let before = cart.clone();

        let err = Checkout::new(&catalog, &store)
            .place_order(&mut cart, contact(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Persistence(_)));
        assert_eq!(cart, before);
    }

    #[tokio::test]
    async fn test_same_token_places_one_order() {
        let catalog = catalog();
        let store = MemoryOrderStore::default();
        let mut cart = Cart::new();
        cart::add(&mut cart, &catalog, A).await.unwrap();
        let retried = cart.clone();
        let token = Uuid::new_v4();

        let first = Checkout::new(&catalog, &store)
            .place_order(&mut cart, contact(), token)
            .await
            .unwrap();
        let mut cart = retried;
        let second = Checkout::new(&catalog, &store)
            .place_order(&mut cart, contact(), token)
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert!(cart.is_empty());
        assert_eq!(store.orders().len(), 1);
    }

    #[tokio::test]
    async fn test_catalog_failure_leaves_cart() {
        let store = MemoryOrderStore::default();
        let mut cart = Cart::new();
        cart.add_one(A);
        let before = cart.clone();

        let err = Checkout::new(&MemoryCatalog::unavailable(), &store)
            .place_order(&mut cart, contact(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Catalog(_)));
        assert_eq!(cart, before);
        assert!(store.orders().is_empty());
    }
}
