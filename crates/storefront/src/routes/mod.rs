//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! # Products
//! GET  /products               - Product listing
//! GET  /products/{id}          - Product detail
//!
//! # Cart (JSON, session-bound)
//! GET  /cart                   - Cart view (lines, total, count)
//! POST /cart/add/{id}          - Add one unit
//! POST /cart/remove/{id}       - Remove a product
//! POST /cart/increase/{id}     - One more of a product already in the cart
//! POST /cart/decrease/{id}     - One fewer; removes at zero
//! POST /cart/update/{id}       - Set quantity (form: quantity)
//! GET  /cart/count             - Cart count badge
//!
//! # Checkout
//! POST /checkout               - Place order (form: name, email, address)
//! GET  /orders/{id}            - Order confirmation (own session only)
//! ```
//!
//! `/health` and `/health/ready` are mounted by the binary.

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{cart_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add/{id}", post(cart::add))
        .route("/remove/{id}", post(cart::remove))
        .route("/increase/{id}", post(cart::increase))
        .route("/decrease/{id}", post(cart::decrease))
        .route("/update/{id}", post(cart::update))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes().route_layer(cart_rate_limiter()))
        .route(
            "/checkout",
            post(checkout::place_order).route_layer(checkout_rate_limiter()),
        )
        .route("/orders/{id}", get(checkout::show_order))
}
