//! Path and form extractors that reject with [`AppError`].
//!
//! axum's own `Path` and `Form` answer a bad request with a plain-text body.
//! These wrappers keep every client-facing failure in the `{"error": ...}`
//! shape.

use axum::{
    Form,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use minishop_core::{OrderId, ProductId};

use crate::error::AppError;

/// Message for a form body that cannot be read at all.
pub const UNREADABLE_FORM_MESSAGE: &str = "Could not read the submitted form";

/// An id type that names the resource it points to.
pub trait Resource {
    /// Resource name used in "not found" messages.
    const NAME: &'static str;
}

impl Resource for ProductId {
    const NAME: &'static str = "Product";
}

impl Resource for OrderId {
    const NAME: &'static str = "Order";
}

/// A resource id from the path. An id that does not parse cannot exist, so
/// it is reported as not found.
pub struct IdPath<T>(pub T);

impl<S, T> FromRequestParts<S> for IdPath<T>
where
    T: Resource + DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(rejection) => {
                tracing::debug!(%rejection, resource = T::NAME, "Unusable id in path");
                Err(AppError::NotFound(T::NAME.to_string()))
            }
        }
    }
}

/// A URL-encoded form body.
///
/// Field-level problems are left to the form types: their fields default to
/// empty strings and the domain parsers report what is missing.
pub struct FormData<T>(pub T);

impl<S, T> FromRequest<S> for FormData<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Form::<T>::from_request(req, state).await {
            Ok(Form(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(%rejection, "Unreadable form body");
                Err(AppError::BadRequest(UNREADABLE_FORM_MESSAGE.to_string()))
            }
        }
    }
}
