//! Load weight in pounds.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Weight`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WeightError {
    /// The input is not a decimal number.
    #[error("weight is not a number")]
    NotANumber,
    /// The weight is zero or negative.
    #[error("weight must be a positive number")]
    NotPositive,
}

/// A strictly positive shipment weight, in pounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Weight(Decimal);

impl Weight {
    /// Validate a weight in pounds.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError::NotPositive`] for zero or negative values.
    pub fn new(pounds: Decimal) -> Result<Self, WeightError> {
        if pounds <= Decimal::ZERO {
            return Err(WeightError::NotPositive);
        }
        Ok(Self(pounds.normalize()))
    }

    /// Parse a weight typed into a form field.
    ///
    /// # Errors
    ///
    /// Returns [`WeightError::NotANumber`] for blank or non-numeric input and
    /// [`WeightError::NotPositive`] for zero or negative values.
    pub fn parse(s: &str) -> Result<Self, WeightError> {
        let pounds = Decimal::from_str(s.trim()).map_err(|_| WeightError::NotANumber)?;
        Self::new(pounds)
    }

    /// The weight in pounds.
    #[must_use]
    pub const fn pounds(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} lbs", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_pounds() {
        let weight = Weight::parse(" 5000 ").unwrap();
        assert_eq!(weight.to_string(), "5000 lbs");
    }

    #[test]
    fn test_normalizes_trailing_zeros() {
        assert_eq!(Weight::parse("42.50").unwrap().to_string(), "42.5 lbs");
    }

    #[test]
    fn test_rejects_non_positive() {
        assert_eq!(Weight::parse("0"), Err(WeightError::NotPositive));
        assert_eq!(Weight::parse("-1"), Err(WeightError::NotPositive));
    }

    #[test]
    fn test_rejects_non_numbers() {
        assert_eq!(Weight::parse("heavy"), Err(WeightError::NotANumber));
    }
}
