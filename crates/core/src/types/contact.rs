//! Checkout contact details: who the order is for and where it ships.
//!
//! Parsing here is the boundary validation for the checkout form. Once a
//! [`ContactDetails`] exists, every field is known to be present, trimmed, and
//! within length limits, so the checkout itself never re-validates.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Whitespace inside the address.
    #[error("email cannot contain spaces")]
    ContainsWhitespace,
    /// Not exactly one `@` separating a non-empty local part and domain.
    #[error("email must look like name@example.com")]
    Malformed,
}

/// An email address with a structurally valid `local@domain` shape.
///
/// ```
/// use minishop_core::Email;
///
/// assert!(Email::parse("ada@example.com").is_ok());
/// assert!(Email::parse("  ada@example.com ").is_ok()); // trimmed
/// assert!(Email::parse("ada@").is_err());
/// assert!(Email::parse("a@b@c").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first problem found.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(EmailError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors from validating the checkout contact form.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    /// Name left blank.
    #[error("please enter your name")]
    MissingName,
    /// Name over the length limit.
    #[error("name must be at most {max} characters")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// Email failed validation.
    #[error("{0}")]
    Email(#[from] EmailError),
    /// Shipping address left blank.
    #[error("please enter a shipping address")]
    MissingAddress,
    /// Shipping address over the length limit.
    #[error("address must be at most {max} characters")]
    AddressTooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Validated contact and shipping details for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    name: String,
    email: Email,
    address: String,
}

impl ContactDetails {
    /// Maximum length of the contact name.
    pub const MAX_NAME_LENGTH: usize = 100;
    /// Maximum length of the shipping address.
    pub const MAX_ADDRESS_LENGTH: usize = 500;

    /// Validate raw form fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ContactError`] for the first invalid field, checked in
    /// name, email, address order.
    pub fn parse(name: &str, email: &str, address: &str) -> Result<Self, ContactError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactError::MissingName);
        }
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(ContactError::NameTooLong {
                max: Self::MAX_NAME_LENGTH,
            });
        }

        let email = Email::parse(email)?;

        let address = address.trim();
        if address.is_empty() {
            return Err(ContactError::MissingAddress);
        }
        if address.chars().count() > Self::MAX_ADDRESS_LENGTH {
            return Err(ContactError::AddressTooLong {
                max: Self::MAX_ADDRESS_LENGTH,
            });
        }

        Ok(Self {
            name: name.to_owned(),
            email,
            address: address.to_owned(),
        })
    }

    /// Rebuild contact details from a stored order row.
    ///
    /// Stored values were validated on the way in and are trusted as-is.
    #[must_use]
    pub const fn from_stored(name: String, email: Email, address: String) -> Self {
        Self {
            name,
            email,
            address,
        }
    }

    /// The contact name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The contact email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// The shipping address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }
}
