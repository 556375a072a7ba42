//! Cart route handlers.
//!
//! Every handler loads the visitor's cart from the session, applies one cart
//! service operation, and answers with the refreshed cart view. The session is
//! only written after the operation succeeds.
//!
//! Entries whose product has been deleted from the catalog are pruned from the
//! stored cart the next time it is viewed.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use minishop_core::{LineItem, Money, ProductId};

use crate::error::{Result, add_breadcrumb};
use crate::middleware::{FormData, IdPath, SessionCart};
use crate::services::{Catalog, cart};
use crate::state::AppState;

/// Cart contents as returned to the client.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    /// Confirmation for the action just taken, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub lines: Vec<LineItem>,
    pub total: Money,
    /// Total number of units in the cart.
    pub count: u64,
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u64,
}

/// Set-quantity form data. The raw string is validated by the cart service,
/// so a missing field is reported as an invalid quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityForm {
    #[serde(default)]
    pub quantity: String,
}

/// Resolve the cart, drop entries for deleted products, save, and respond.
async fn respond<C: Catalog>(
    catalog: &C,
    mut session_cart: SessionCart,
    message: Option<String>,
) -> Result<Json<CartResponse>> {
    let view = cart::view(&session_cart.cart, catalog).await?;

    if !view.missing.is_empty() {
        let pruned = session_cart.cart.prune(&view.missing);
        tracing::info!(pruned, "Pruned deleted products from cart");
    }
    session_cart.save().await?;

    let count = view.item_count();
    Ok(Json(CartResponse {
        message,
        lines: view.lines,
        total: view.total,
        count,
    }))
}

async fn add_product<C: Catalog>(
    catalog: &C,
    mut session_cart: SessionCart,
    id: ProductId,
) -> Result<Json<CartResponse>> {
    let name = cart::add(&mut session_cart.cart, catalog, id).await?;
    let product_id = id.to_string();
    add_breadcrumb("cart", "Added product", Some(&[("product_id", product_id.as_str())]));
    respond(catalog, session_cart, Some(format!("{name} added to cart"))).await
}

async fn update_quantity<C: Catalog>(
    catalog: &C,
    mut session_cart: SessionCart,
    id: ProductId,
    quantity: &str,
) -> Result<Json<CartResponse>> {
    cart::set_quantity(&mut session_cart.cart, id, quantity)?;
    respond(catalog, session_cart, None).await
}

/// Show the cart.
#[instrument(skip(state, session_cart))]
pub async fn show(
    State(state): State<AppState>,
    session_cart: SessionCart,
) -> Result<Json<CartResponse>> {
    respond(&state.catalog(), session_cart, None).await
}

/// Add one unit of a product.
#[instrument(skip(state, session_cart))]
pub async fn add(
    State(state): State<AppState>,
    session_cart: SessionCart,
    IdPath(id): IdPath<ProductId>,
) -> Result<Json<CartResponse>> {
    add_product(&state.catalog(), session_cart, id).await
}

/// Remove a product entirely.
#[instrument(skip(state, session_cart))]
pub async fn remove(
    State(state): State<AppState>,
    mut session_cart: SessionCart,
    IdPath(id): IdPath<ProductId>,
) -> Result<Json<CartResponse>> {
    cart::remove(&mut session_cart.cart, id);
    respond(&state.catalog(), session_cart, None).await
}

/// Add one unit of a product already in the cart.
#[instrument(skip(state, session_cart))]
pub async fn increase(
    State(state): State<AppState>,
    mut session_cart: SessionCart,
    IdPath(id): IdPath<ProductId>,
) -> Result<Json<CartResponse>> {
    cart::increase(&mut session_cart.cart, id);
    respond(&state.catalog(), session_cart, None).await
}

/// Take one unit away.
#[instrument(skip(state, session_cart))]
pub async fn decrease(
    State(state): State<AppState>,
    mut session_cart: SessionCart,
    IdPath(id): IdPath<ProductId>,
) -> Result<Json<CartResponse>> {
    cart::decrease(&mut session_cart.cart, id);
    respond(&state.catalog(), session_cart, None).await
}

/// Overwrite a product's quantity.
#[instrument(skip(state, session_cart, form))]
pub async fn update(
    State(state): State<AppState>,
    session_cart: SessionCart,
    IdPath(id): IdPath<ProductId>,
    FormData(form): FormData<UpdateQuantityForm>,
) -> Result<Json<CartResponse>> {
    update_quantity(&state.catalog(), session_cart, id, &form.quantity).await
}

/// Cart badge count. Reads the session only, no catalog lookups.
#[instrument(skip(session_cart))]
pub async fn count(session_cart: SessionCart) -> Json<CartCount> {
    Json(CartCount {
        count: session_cart.cart.total_quantity(),
    })
}
