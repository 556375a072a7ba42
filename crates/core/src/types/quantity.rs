//! Cart line quantities.

use core::fmt;
use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The input is not a whole number.
    #[error("'{0}' is not a whole number")]
    Unparsable(String),
    /// Zero or negative.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// Larger than the order item column can hold.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Largest accepted quantity.
        max: u32,
    },
}

/// A quantity of one product in a cart or order. Always at least 1.
///
/// There is deliberately no way to build a zero quantity: a cart entry that
/// would drop to zero is removed instead.
///
/// ```
/// use minishop_core::Quantity;
///
/// assert_eq!(Quantity::parse("3").unwrap().get(), 3);
/// assert!(Quantity::parse("0").is_err());
/// assert!(Quantity::parse("-3").is_err());
/// assert!(Quantity::parse("two").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Largest quantity; matches the `INTEGER` column orders are stored in.
    pub const MAX: u32 = i32::MAX.unsigned_abs();

    /// Create a quantity, returning `None` for zero or values above [`Self::MAX`].
    #[must_use]
    pub const fn new(n: u32) -> Option<Self> {
        if n > Self::MAX {
            return None;
        }
        match NonZeroU32::new(n) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }

    /// Parse a quantity from raw form input.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Unparsable`] if the input is not an integer,
    /// [`QuantityError::NotPositive`] for zero or negative values, and
    /// [`QuantityError::TooLarge`] above [`Self::MAX`].
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let trimmed = input.trim();
        let n = trimmed
            .parse::<i64>()
            .map_err(|_| QuantityError::Unparsable(trimmed.to_owned()))?;

        if n <= 0 {
            return Err(QuantityError::NotPositive(n));
        }

        u32::try_from(n)
            .ok()
            .and_then(Self::new)
            .ok_or(QuantityError::TooLarge { max: Self::MAX })
    }

    /// Returns the quantity as a plain integer.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// One more, saturating at [`Self::MAX`].
    #[must_use]
    pub fn incremented(self) -> Self {
        Self::new(self.get().saturating_add(1)).unwrap_or(self)
    }

    /// One less, or `None` when this is the last unit.
    #[must_use]
    pub const fn decremented(self) -> Option<Self> {
        Self::new(self.get() - 1)
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        if n == 0 {
            return Err(QuantityError::NotPositive(0));
        }
        Self::new(n).ok_or(QuantityError::TooLarge { max: Self::MAX })
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(n: i32) -> Result<Self, Self::Error> {
        let unsigned = u32::try_from(n).map_err(|_| QuantityError::NotPositive(n.into()))?;
        Self::try_from(unsigned)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        // MAX is i32::MAX, so this never saturates.
        Self::try_from(quantity.get()).unwrap_or(Self::MAX)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(Quantity::parse("1").unwrap(), Quantity::ONE);
        assert_eq!(Quantity::parse(" 12 ").unwrap().get(), 12);
    }

    #[test]
    fn test_parse_zero_and_negative() {
        assert_eq!(Quantity::parse("0"), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::parse("-3"), Err(QuantityError::NotPositive(-3)));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Quantity::parse("1.5"),
            Err(QuantityError::Unparsable(_))
        ));
        assert!(matches!(
            Quantity::parse(""),
            Err(QuantityError::Unparsable(_))
        ));
        assert!(matches!(
            Quantity::parse("lots"),
            Err(QuantityError::Unparsable(_))
        ));
    }

    #[test]
    fn test_parse_too_large() {
        assert!(matches!(
            Quantity::parse("99999999999"),
            Err(QuantityError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_increment_and_decrement() {
        let two = Quantity::ONE.incremented();
        assert_eq!(two.get(), 2);
        assert_eq!(two.decremented(), Some(Quantity::ONE));
        assert_eq!(Quantity::ONE.decremented(), None);
    }

    #[test]
    fn test_increment_saturates() {
        let max = Quantity::new(Quantity::MAX).unwrap();
        assert_eq!(max.incremented(), max);
    }

    #[test]
    fn test_serde_rejects_zero() {
        let parsed: Result<Quantity, _> = serde_json::from_str("0");
        assert!(parsed.is_err());

        let parsed: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(parsed.get(), 4);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "4");
    }

    #[test]
    fn test_i32_conversions() {
        assert!(Quantity::try_from(-1_i32).is_err());
        assert!(Quantity::try_from(0_i32).is_err());
        assert_eq!(i32::from(Quantity::try_from(5_i32).unwrap()), 5);
    }
}
