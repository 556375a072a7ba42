//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Clients receive `{"error": "<message>"}` with a short message meant for a
//! shopper. Internal details only reach the logs and Sentry.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use minishop_core::{ContactError, OrderId};

use crate::db::RepositoryError;
use crate::services::{CartError, CheckoutError};

const INTERNAL_MESSAGE: &str = "Internal server error";
const ORDER_FAILED_MESSAGE: &str = "We could not place your order, please try again";
const ORDER_UNCONFIRMED_MESSAGE: &str =
    "Your order was received but could not be confirmed, please submit checkout again";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Checkout form failed validation.
    #[error("Invalid contact details: {0}")]
    Contact(#[from] ContactError),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// The order is stored but the session still holds the cart. Submitting
    /// checkout again returns the same order.
    #[error("Order {0} stored but the session was not saved")]
    OrderUnconfirmed(OrderId),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error is the server's fault (and worth reporting).
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Session(_)
                | Self::OrderUnconfirmed(_)
                | Self::Internal(_)
                | Self::Cart(CartError::Catalog(_))
                | Self::Checkout(CheckoutError::Persistence(_) | CheckoutError::Catalog(_))
        )
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_)
            | Self::Session(_)
            | Self::OrderUnconfirmed(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Cart(err) => match err {
                CartError::NotFound(_) => StatusCode::NOT_FOUND,
                CartError::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
                CartError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => StatusCode::BAD_REQUEST,
                CheckoutError::Persistence(_) | CheckoutError::Catalog(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Contact(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Message shown to the client. Never contains internal details.
    fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Internal(_) => {
                INTERNAL_MESSAGE.to_string()
            }
            Self::Cart(err) => match err {
                CartError::NotFound(_) => "Product not found".to_string(),
                CartError::InvalidQuantity(_) => {
                    "Quantity must be a positive whole number".to_string()
                }
                CartError::Catalog(_) => INTERNAL_MESSAGE.to_string(),
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::Persistence(_) | CheckoutError::Catalog(_) => {
                    ORDER_FAILED_MESSAGE.to_string()
                }
            },
            Self::OrderUnconfirmed(_) => ORDER_UNCONFIRMED_MESSAGE.to_string(),
            Self::Contact(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// actions leading up to a failed checkout.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
