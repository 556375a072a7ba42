//! Core types for Minishop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod money;
pub mod quantity;

pub use contact::{ContactDetails, ContactError, Email, EmailError};
pub use id::{OrderId, ProductId};
pub use money::{Money, Price, PriceError};
pub use quantity::{Quantity, QuantityError};
