//! Session-bound cart extractor.
//!
//! The cart is stored as a plain list of `{product_id, quantity}` entries
//! under [`keys::CART`]. Handlers take a [`SessionCart`], mutate
//! [`SessionCart::cart`], and call [`SessionCart::save`] once the change has
//! succeeded. Nothing is written back on error paths, so a failed operation
//! leaves the stored cart as it was.
//!
//! Every change to the stored cart also issues a fresh checkout token under
//! [`keys::CHECKOUT_TOKEN`]. The order store keys orders by that token, so a
//! checkout resubmitted for the same cart contents returns the order already
//! placed instead of storing a second one.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use uuid::Uuid;

use minishop_core::Cart;

use crate::error::AppError;
use crate::models::session::keys;

/// The visitor's cart, loaded from their session.
pub struct SessionCart {
    session: Session,
    /// The cart as it is in the session record.
    stored: Cart,
    /// Working copy of the cart.
    pub cart: Cart,
}

impl SessionCart {
    /// Load the cart from a session.
    ///
    /// A record that no longer decodes (e.g. a zero quantity) is dropped from
    /// the session and the visitor starts with an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store cannot be read.
    pub async fn load(session: Session) -> Result<Self, AppError> {
        let cart = match session.get::<Cart>(keys::CART).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding undecodable session cart");
                session.remove_value(keys::CART).await?;
                session.remove_value(keys::CHECKOUT_TOKEN).await?;
                Cart::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            session,
            stored: cart.clone(),
            cart,
        })
    }

    /// The session the cart was loaded from.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Write the cart back to the session.
    ///
    /// Does nothing if the cart is unchanged. An empty cart removes the
    /// session key rather than storing an empty list, so a visitor who never
    /// adds anything gets no cart record. Any other change issues a new
    /// checkout token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store rejects the write.
    pub async fn save(&mut self) -> Result<(), AppError> {
        if self.cart == self.stored {
            return Ok(());
        }

        if self.cart.is_empty() {
            self.session.remove_value(keys::CART).await?;
            self.session.remove_value(keys::CHECKOUT_TOKEN).await?;
        } else {
            self.session.insert(keys::CART, &self.cart).await?;
            self.session
                .insert(keys::CHECKOUT_TOKEN, Uuid::new_v4())
                .await?;
        }
        self.stored = self.cart.clone();
        Ok(())
    }

    /// The checkout token for the stored cart contents.
    ///
    /// A session without one (e.g. created before tokens existed) gets a new
    /// token, written to the store right away so that a retried checkout
    /// sees the same token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the token cannot be read or stored.
    pub async fn checkout_token(&self) -> Result<Uuid, AppError> {
        if let Some(token) = self.session.get::<Uuid>(keys::CHECKOUT_TOKEN).await? {
            return Ok(token);
        }

        let token = Uuid::new_v4();
        self.session.insert(keys::CHECKOUT_TOKEN, token).await?;
        self.session.save().await?;
        Ok(token)
    }
}

impl<S> FromRequestParts<S> for SessionCart
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        Self::load(session).await
    }
}
