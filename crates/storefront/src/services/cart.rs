//! Cart operations validated against the catalog.
//!
//! Every operation takes the visitor's [`Cart`] by `&mut` and either applies
//! its change completely or returns an error with the cart untouched. Only
//! [`add`] consults the catalog when mutating; the other mutations act on ids
//! already in the cart.

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use minishop_core::{Cart, LineItem, Money, ProductId, Quantity, QuantityError};

use super::Catalog;
use crate::db::RepositoryError;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product does not exist in the catalog.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The requested quantity is not a whole number of at least 1.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// Reading the catalog failed.
    #[error("catalog error: {0}")]
    Catalog(#[from] RepositoryError),
}

/// A cart resolved against current catalog prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    /// Resolved lines, in cart order.
    pub lines: Vec<LineItem>,
    /// Sum of the line totals.
    pub total: Money,
    /// Cart entries whose product no longer exists. They are not in `lines`
    /// and contribute nothing to `total`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<ProductId>,
}

impl CartView {
    /// Total number of units across the resolved lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// True when nothing in the cart could be resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Add one unit of a product, inserting it if absent.
///
/// Returns the product's display name for the confirmation message.
///
/// # Errors
///
/// Returns `CartError::NotFound` if the catalog has no such product, or
/// `CartError::Catalog` if the lookup fails. The cart is unchanged on error.
#[instrument(skip(cart, catalog))]
pub async fn add<C: Catalog>(
    cart: &mut Cart,
    catalog: &C,
    product_id: ProductId,
) -> Result<String, CartError> {
    let product = catalog
        .find(product_id)
        .await?
        .ok_or(CartError::NotFound(product_id))?;

    let quantity = cart.add_one(product_id);
    tracing::debug!(quantity = %quantity, "Added to cart");
    Ok(product.name)
}

/// Remove a product. Removing something not in the cart does nothing.
pub fn remove(cart: &mut Cart, product_id: ProductId) -> bool {
    cart.remove(product_id)
}

/// Add one unit of a product that is already in the cart.
pub fn increase(cart: &mut Cart, product_id: ProductId) -> bool {
    cart.increase(product_id)
}

/// Take one unit away, dropping the entry when its last unit goes.
pub fn decrease(cart: &mut Cart, product_id: ProductId) -> bool {
    cart.decrease(product_id)
}

/// Overwrite a product's quantity from raw form input.
///
/// Returns `Ok(false)` if the product is not in the cart.
///
/// # Errors
///
/// Returns `CartError::InvalidQuantity` if `raw` is not a whole number of at
/// least 1. The cart is unchanged on error.
pub fn set_quantity(cart: &mut Cart, product_id: ProductId, raw: &str) -> Result<bool, CartError> {
    let quantity = Quantity::parse(raw)?;
    Ok(cart.set_quantity(product_id, quantity))
}

/// Resolve the cart against the catalog.
///
/// # Errors
///
/// Returns `CartError::Catalog` if a catalog lookup fails.
pub async fn view<C: Catalog>(cart: &Cart, catalog: &C) -> Result<CartView, CartError> {
    Ok(resolve(cart, catalog).await?)
}

/// Join cart entries with current catalog data, skipping deleted products.
///
/// Shared by [`view`] and checkout so both see exactly the same lines and
/// total.
#[instrument(skip_all, fields(entries = cart.len()))]
pub(crate) async fn resolve<C: Catalog>(
    cart: &Cart,
    catalog: &C,
) -> Result<CartView, RepositoryError> {
    let mut lines = Vec::with_capacity(cart.len());
    let mut missing = Vec::new();

    for entry in cart.entries() {
        match catalog.find(entry.product_id).await? {
            Some(product) => lines.push(LineItem::new(product, entry.quantity)),
            None => missing.push(entry.product_id),
        }
    }

    if !missing.is_empty() {
        tracing::debug!(?missing, "Skipping cart entries for deleted products");
    }

    let total = lines.iter().map(|line| line.line_total).sum();
    Ok(CartView {
        lines,
        total,
        missing,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::memory::MemoryCatalog;

    const A: ProductId = ProductId::new(1);
    const B: ProductId = ProductId::new(2);
    const X: ProductId = ProductId::new(3);

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::with(&[(1, "A", "10"), (2, "B", "20"), (3, "X", "15")])
    }

    #[tokio::test]
    async fn test_add_returns_name_and_increments() {
        let catalog = catalog();
        let mut cart = Cart::new();

        assert_eq!(add(&mut cart, &catalog, A).await.unwrap(), "A");
        assert_eq!(add(&mut cart, &catalog, A).await.unwrap(), "A");
        assert_eq!(add(&mut cart, &catalog, B).await.unwrap(), "B");

        assert_eq!(cart.quantity_of(A).map(Quantity::get), Some(2));
        assert_eq!(cart.quantity_of(B).map(Quantity::get), Some(1));
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_not_found() {
        let catalog = catalog();
        let mut cart = Cart::new();
        cart.add_one(A);
        let before = cart.clone();

        let err = add(&mut cart, &catalog, ProductId::new(404)).await.unwrap_err();
        assert!(matches!(err, CartError::NotFound(id) if id == ProductId::new(404)));
        assert_eq!(cart, before);
    }

    #[tokio::test]
    async fn test_add_with_catalog_down_leaves_cart() {
        let catalog = MemoryCatalog::unavailable();
        let mut cart = Cart::new();

        let err = add(&mut cart, &catalog, A).await.unwrap_err();
        assert!(matches!(err, CartError::Catalog(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_rejects_zero_and_negative() {
        let mut cart = Cart::new();
        cart.add_one(A);
        let before = cart.clone();

        for raw in ["0", "-3", "two", "", "1.5"] {
            let err = set_quantity(&mut cart, A, raw).unwrap_err();
            assert!(matches!(err, CartError::InvalidQuantity(_)), "{raw}");
            assert_eq!(cart, before, "{raw}");
        }
    }

    #[test]
    fn test_set_quantity_overwrites_or_ignores_absent() {
        let mut cart = Cart::new();
        cart.add_one(A);

        assert!(set_quantity(&mut cart, A, " 5 ").unwrap());
        assert_eq!(cart.quantity_of(A).map(Quantity::get), Some(5));

        assert!(!set_quantity(&mut cart, B, "2").unwrap());
        assert_eq!(cart.quantity_of(B), None);
    }

    #[tokio::test]
    async fn test_view_totals_current_prices() {
        let catalog = catalog();
        let mut cart = Cart::new();
        add(&mut cart, &catalog, A).await.unwrap();
        add(&mut cart, &catalog, A).await.unwrap();
        add(&mut cart, &catalog, B).await.unwrap();

        let view = view(&cart, &catalog).await.unwrap();
        let lines: Vec<_> = view
            .lines
            .iter()
            .map(|line| (line.product.name.as_str(), line.quantity.get()))
            .collect();
        assert_eq!(lines, vec![("A", 2), ("B", 1)]);
        assert_eq!(view.total.to_string(), "40.00");
        assert_eq!(view.item_count(), 3);
        assert!(view.missing.is_empty());
    }

    #[tokio::test]
    async fn test_view_skips_deleted_products() {
        let catalog = catalog();
        let mut cart = Cart::new();
        add(&mut cart, &catalog, A).await.unwrap();
        for _ in 0..3 {
            add(&mut cart, &catalog, X).await.unwrap();
        }

        catalog.delete(X);

        let view = view(&cart, &catalog).await.unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.total.to_string(), "10.00");
        assert_eq!(view.missing, vec![X]);
        // Viewing never mutates the cart.
        assert_eq!(cart.len(), 2);
    }

    #[tokio::test]
    async fn test_view_of_empty_cart() {
        let view = view(&Cart::new(), &catalog()).await.unwrap();
        assert!(view.is_empty());
        assert!(view.total.is_zero());
    }
}
