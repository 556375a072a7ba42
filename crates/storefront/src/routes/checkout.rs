//! Checkout and order confirmation handlers.
//!
//! The session is saved explicitly once an order is stored, rather than left
//! to the session layer, so a failed write is reported to the visitor. The
//! stored session then still holds the cart and its checkout token, and
//! submitting checkout again returns the order that was already placed.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use minishop_core::{ContactDetails, Money, Order, OrderId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{FormData, IdPath, SessionCart};
use crate::models::session::keys;
use crate::services::{Catalog, Checkout, OrderStore};
use crate::state::AppState;

/// Checkout form data. Missing fields arrive empty and are reported by the
/// contact validator.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// Response to a placed order.
#[derive(Debug, Serialize)]
pub struct OrderPlaced {
    pub order_id: OrderId,
    pub total: Money,
}

/// Place an order from the session cart.
///
/// Contact details are validated before the cart is touched.
#[instrument(skip(state, session_cart, form))]
pub async fn place_order(
    State(state): State<AppState>,
    session_cart: SessionCart,
    FormData(form): FormData<CheckoutForm>,
) -> Result<(StatusCode, Json<OrderPlaced>)> {
    let order = checkout(&state.catalog(), &state.orders(), session_cart, &form).await?;

    Ok((
        StatusCode::CREATED,
        Json(OrderPlaced {
            order_id: order.id,
            total: order.total,
        }),
    ))
}

async fn checkout<C: Catalog, S: OrderStore>(
    catalog: &C,
    orders: &S,
    mut session_cart: SessionCart,
    form: &CheckoutForm,
) -> Result<Order> {
    let contact = ContactDetails::parse(&form.name, &form.email, &form.address)?;
    let token = session_cart.checkout_token().await?;

    let order = Checkout::new(catalog, orders)
        .place_order(&mut session_cart.cart, contact, token)
        .await?;

    let order_id = order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));

    if let Err(e) = confirm(&mut session_cart, order.id).await {
        tracing::error!(order_id = %order.id, error = %e, "Order stored but session not saved");
        return Err(AppError::OrderUnconfirmed(order.id));
    }

    Ok(order)
}

/// Clear the cart, record the order as placed, and write the session.
async fn confirm(session_cart: &mut SessionCart, order_id: OrderId) -> Result<()> {
    session_cart.save().await?;

    let session = session_cart.session();
    let mut placed: Vec<OrderId> = session.get(keys::PLACED_ORDERS).await?.unwrap_or_default();
    if !placed.contains(&order_id) {
        placed.push(order_id);
        session.insert(keys::PLACED_ORDERS, placed).await?;
    }

    session.save().await?;
    Ok(())
}

/// Fails with "Order not found" unless the order was placed in this session.
async fn ensure_placed(session: &Session, id: OrderId) -> Result<()> {
    let placed: Vec<OrderId> = session.get(keys::PLACED_ORDERS).await?.unwrap_or_default();
    if placed.contains(&id) {
        Ok(())
    } else {
        Err(AppError::NotFound("Order".to_string()))
    }
}

/// Show an order placed in this session.
///
/// Orders from other sessions are reported as not found.
#[instrument(skip(state, session))]
pub async fn show_order(
    State(state): State<AppState>,
    session: Session,
    IdPath(id): IdPath<OrderId>,
) -> Result<Json<Order>> {
    ensure_placed(&session, id).await?;

    state
        .orders()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
}
