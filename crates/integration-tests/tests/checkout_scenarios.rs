//! Checkout scenarios: order snapshots, empty carts, store failures, and
//! resubmitted checkouts.

#![allow(clippy::unwrap_used)]

use minishop_core::{Cart, ContactDetails, ProductId};
use minishop_integration_tests::{TestCatalog, TestOrderStore};
use minishop_storefront::services::{Checkout, CheckoutError, cart};
use uuid::Uuid;

const A: ProductId = ProductId::new(1);
const B: ProductId = ProductId::new(2);
const X: ProductId = ProductId::new(3);

fn catalog() -> TestCatalog {
    TestCatalog::with(&[(1, "A", "10"), (2, "B", "20"), (3, "X", "15")])
}

fn contact() -> ContactDetails {
    ContactDetails::parse("Grace Hopper", "grace@example.com", "1 Compiler Lane").unwrap()
}

async fn cart_with(catalog: &TestCatalog, ids: &[ProductId]) -> Cart {
    let mut cart = Cart::new();
    for &id in ids {
        cart::add(&mut cart, catalog, id).await.unwrap();
    }
    cart
}

#[tokio::test]
async fn checkout_snapshots_cart_into_order() {
    let catalog = catalog();
    let store = TestOrderStore::default();
    let mut cart = cart_with(&catalog, &[A, A, B]).await;

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
    assert_eq!(order.total.to_string(), "40.00");
    assert_eq!(order.contact.name(), "Grace Hopper");
    assert!(cart.is_empty());
    assert_eq!(store.orders(), vec![order]);
}

#[tokio::test]
async fn empty_cart_fails_without_writing() {
    let catalog = catalog();
    let store = TestOrderStore::default();
    let mut cart = Cart::new();

    let err = Checkout::new(&catalog, &store)
        .place_order(&mut cart, contact(), Uuid::new_v4())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn deleted_product_is_left_out_of_order() {
    let catalog = catalog();
    let store = TestOrderStore::default();
    let mut cart = cart_with(&catalog, &[A, X, X, X]).await;

    catalog.delete(3);

    let order = Checkout::new(&catalog, &store)
        .place_order(&mut cart, contact(), Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.total.to_string(), "10.00");
}

#[tokio::test]
async fn cart_of_only_deleted_products_is_empty() {
    let catalog = catalog();
    let store = TestOrderStore::default();
    let mut cart = cart_with(&catalog, &[X, X, X]).await;

    catalog.delete(3);

    let err = Checkout::new(&catalog, &store)
        .place_order(&mut cart, contact(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
    assert!(store.orders().is_empty());
}

#[tokio::test]
async fn order_prices_survive_catalog_price_change() {
    let catalog = catalog();
    let store = TestOrderStore::default();
    let mut cart = cart_with(&catalog, &[A, A]).await;

    Checkout::new(&catalog, &store)
        .place_order(&mut cart, contact(), Uuid::new_v4())
        .await
        .unwrap();

    catalog.set_price(1, "99");

    let orders = store.orders();
    let stored = orders.first().unwrap();
    assert_eq!(stored.items.first().unwrap().unit_price.to_string(), "10.00");
    assert_eq!(stored.total.to_string(), "20.00");
}

#[tokio::test]
async fn persistence_failure_keeps_cart_and_retry_succeeds() {
    let catalog = catalog();
    let store = TestOrderStore::default();
    let mut cart = cart_with(&catalog, &[A, B]).await;
    let before = cart.clone();

    store.set_failing(true);
    let err = Checkout::new(&catalog, &store)
        .place_order(&mut cart, contact(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::Persistence(_)));
    assert_eq!(cart, before);
    assert!(store.orders().is_empty());

    store.set_failing(false);
    let order = Checkout::new(&catalog, &store)
        .place_order(&mut cart, contact(), Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(order.total.to_string(), "30.00");
    assert!(cart.is_empty());
    assert_eq!(store.orders().len(), 1);
}

#[tokio::test]
async fn order_total_matches_cart_view_total() {
    let catalog = TestCatalog::with(&[(1, "Pen", "0.10"), (2, "Ink", "19.99")]);
    let store = TestOrderStore::default();
    let mut cart = cart_with(&catalog, &[A, A, A, B, B]).await;

    let view_total = cart::view(&cart, &catalog).await.unwrap().total;
    let order = Checkout::new(&catalog, &store)
        .place_order(&mut cart, contact(), Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(order.total, view_total);
    assert_eq!(order.total.to_string(), "40.28");
}

#[tokio::test]
async fn resubmitted_checkout_returns_first_order() {
    let catalog = catalog();
    let store = TestOrderStore::default();
    let mut cart = cart_with(&catalog, &[A, B]).await;
    // The session that never learned about the first order still holds this.
    let mut unsaved = cart.clone();
    let token = Uuid::new_v4();

    let first = Checkout::new(&catalog, &store)
        .place_order(&mut cart, contact(), token)
        .await
        .unwrap();
    catalog.set_price(1, "99");
    let second = Checkout::new(&catalog, &store)
        .place_order(&mut unsaved, contact(), token)
        .await
        .unwrap();

    assert_eq!(second, first);
    assert!(unsaved.is_empty());
    assert_eq!(store.orders(), vec![first]);
}
