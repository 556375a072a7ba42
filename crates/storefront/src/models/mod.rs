//! Storefront-local models.
//!
//! Domain types (products, carts, orders) live in `minishop-core`; this module
//! only holds what is specific to the HTTP service.

pub mod session;
