//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded into the span)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on cart and checkout routes (governor)
//!
//! [`SessionCart`] is an extractor, not a layer: handlers that need the cart
//! ask for it and it reads from the session set up by layer 5. [`IdPath`] and
//! [`FormData`] wrap axum's `Path` and `Form` so their rejections use the
//! same JSON error body as every other failure.

pub mod cart;
pub mod params;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use cart::SessionCart;
pub use params::{FormData, IdPath};
pub use rate_limit::{cart_rate_limiter, checkout_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{create_session_layer, create_session_store};
