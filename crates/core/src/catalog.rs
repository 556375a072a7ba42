//! Products as the catalog hands them out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Errors from validating a product before it enters the catalog.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// Name left blank.
    #[error("product name cannot be empty")]
    EmptyName,
    /// Name over the column limit.
    #[error("product name must be at most {max} characters")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// More decimal places than the price column stores.
    #[error("price {price} has more than {max} decimal places")]
    TooManyDecimals {
        /// The rejected price.
        price: Price,
        /// Decimal places the catalog keeps.
        max: u32,
    },
    /// Larger than the price column can hold.
    #[error("price {price} is above the maximum of {max}")]
    PriceTooHigh {
        /// The rejected price.
        price: Price,
        /// Largest accepted price.
        max: Decimal,
    },
}

/// A purchasable product.
///
/// The cart and checkout only ever read products; they never change one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Stable identifier.
    pub id: ProductId,
    /// Display name (non-empty).
    pub name: String,
    /// Current unit price.
    pub price: Price,
    /// Image reference (file name or URL), if one was uploaded.
    pub image: Option<String>,
    /// Long-form description.
    pub description: Option<String>,
}

/// A product that has not been assigned an id yet.
///
/// This is also the shape of one entry in a catalog seed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewProduct {
    /// Maximum length of a product name.
    pub const MAX_NAME_LENGTH: usize = 100;

    /// Decimal places kept for a price (`NUMERIC(10, 2)`).
    pub const PRICE_SCALE: u32 = 2;

    /// Largest price the catalog stores, 99999999.99 (`NUMERIC(10, 2)`).
    pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

    /// Check the fields that `Price` cannot enforce by construction.
    ///
    /// A price must fit the catalog column exactly: nothing is rounded on
    /// the way in.
    ///
    /// # Errors
    ///
    /// Returns a [`ProductError`] if the name is blank or too long, or the
    /// price has more than two decimal places or is above [`Self::MAX_PRICE`].
    pub fn validate(&self) -> Result<(), ProductError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductError::EmptyName);
        }
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(ProductError::NameTooLong {
                max: Self::MAX_NAME_LENGTH,
            });
        }

        let amount = self.price.amount();
        if amount.scale() > Self::PRICE_SCALE {
            return Err(ProductError::TooManyDecimals {
                price: self.price,
                max: Self::PRICE_SCALE,
            });
        }
        if amount > Self::MAX_PRICE {
            return Err(ProductError::PriceTooHigh {
                price: self.price,
                max: Self::MAX_PRICE,
            });
        }
        Ok(())
    }
}
