//! Product route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use minishop_core::{Product, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::IdPath;
use crate::services::Catalog;
use crate::state::AppState;

/// List the catalog.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.catalog().list().await?;
    Ok(Json(products))
}

/// Show one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    IdPath(id): IdPath<ProductId>,
) -> Result<Json<Product>> {
    state
        .catalog()
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}
