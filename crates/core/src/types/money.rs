//! Dollar amounts for carrier bids.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`UsdAmount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input is not a decimal number.
    #[error("amount is not a number")]
    NotANumber,
    /// The amount is zero or negative.
    #[error("amount must be greater than zero")]
    NotPositive,
}

/// A strictly positive amount in US dollars.
///
/// Stored with full decimal precision; rounded to cents only for display.
///
/// ```
/// use hitchyard_core::UsdAmount;
///
/// let bid = UsdAmount::parse("250.5").unwrap();
/// assert_eq!(bid.display(), "$250.50");
/// assert!(UsdAmount::parse("0").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsdAmount(Decimal);

impl UsdAmount {
    /// Validate a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::NotPositive`] for zero or negative values.
    pub fn new(amount: Decimal) -> Result<Self, AmountError> {
        if amount <= Decimal::ZERO {
            return Err(AmountError::NotPositive);
        }
        Ok(Self(amount.normalize()))
    }

    /// Parse an amount typed into a form field.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::NotANumber`] if the input is blank or not a
    /// decimal, and [`AmountError::NotPositive`] for zero or negative values.
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| AmountError::NotANumber)?;
        Self::new(amount)
    }

    /// The raw decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format for display with a dollar sign and exactly two decimals.
    #[must_use]
    pub fn display(&self) -> String {
        let mut cents = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        cents.rescale(2);
        format!("${cents}")
    }
}

impl fmt::Display for UsdAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
