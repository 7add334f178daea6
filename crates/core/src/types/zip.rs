//! US ZIP codes for load origins, destinations and signup.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ZipCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ZipCodeError {
    /// The input is empty.
    #[error("ZIP code is required")]
    Empty,
    /// The input is not five digits.
    #[error("ZIP code must be 5 digits")]
    Format,
}

/// A five-digit US ZIP code.
///
/// ```
/// use hitchyard_core::ZipCode;
///
/// assert_eq!(ZipCode::parse(" 90210 ").unwrap().as_str(), "90210");
/// assert!(ZipCode::parse("9021").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZipCode(String);

impl ZipCode {
    /// Number of digits in a ZIP code.
    pub const LENGTH: usize = 5;

    /// Parse a ZIP code, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ZipCodeError::Empty`] for blank input and
    /// [`ZipCodeError::Format`] for anything other than five ASCII digits.
    pub fn parse(s: &str) -> Result<Self, ZipCodeError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ZipCodeError::Empty);
        }
        if trimmed.len() != Self::LENGTH || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ZipCodeError::Format);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the ZIP code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
