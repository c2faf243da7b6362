//! Type-safe price representation using decimal arithmetic.
//!
//! The backend sends and accepts prices as plain JSON numbers in the store's
//! single currency (USD). Keeping them as [`Decimal`] means line totals and
//! cart totals are exact: `9.99 * 2` is `19.98`, not `19.979999999999997`.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Price`] from user input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input string is empty.
    #[error("price cannot be empty")]
    Empty,
    /// The input is not a number.
    #[error("price must be a number: {0}")]
    NotANumber(String),
    /// The amount is zero or negative.
    #[error("price must be greater than zero")]
    NotPositive,
}

/// A unit or line price in dollars.
///
/// Serialized as a JSON number to match the backend wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// The zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, 2))
    }

    /// Parse a price typed into a form.
    ///
    /// Accepts an optional leading `$`. The amount must be strictly positive.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, not a number, or not positive.
    pub fn parse_positive(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
        if digits.is_empty() {
            return Err(PriceError::Empty);
        }

        let amount = Decimal::from_str(digits)
            .map_err(|_| PriceError::NotANumber(trimmed.to_owned()))?;
        if amount <= Decimal::ZERO {
            return Err(PriceError::NotPositive);
        }

        Ok(Self(amount.normalize()))
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units at this unit price.
    ///
    /// Saturates at the largest representable amount instead of overflowing.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map_or_else(|| Self::saturated(self.0), Self)
    }

    /// The bound an overflowing result with the sign of `toward` clamps to.
    const fn saturated(toward: Decimal) -> Self {
        if toward.is_sign_negative() {
            Self(Decimal::MIN)
        } else {
            Self(Decimal::MAX)
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.0)
    }
}

impl Serialize for Price {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.0
            .checked_add(rhs.0)
            .map_or_else(|| Self::saturated(rhs.0), Self)
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self {
        self.times(rhs)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_is_exact() {
        let widget = Price::new(Decimal::new(999, 2));
        assert_eq!(widget.times(2).amount(), Decimal::new(1998, 2));
    }

    #[test]
    fn test_times_saturates_instead_of_overflowing() {
        let huge = Price::new(Decimal::from_i128_with_scale(10_i128.pow(28), 0));
        assert_eq!(huge.times(100), Price::new(Decimal::MAX));
        assert_eq!(
            Price::new(Decimal::MIN).times(2),
            Price::new(Decimal::MIN)
        );
    }

    #[test]
    fn test_add_saturates_instead_of_overflowing() {
        let total: Price = [Price::new(Decimal::MAX), Price::from_cents(1)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::new(Decimal::MAX));
        assert_eq!(
            Price::new(Decimal::MIN) + Price::from_cents(-1),
            Price::new(Decimal::MIN)
        );
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(150), Price::from_cents(250)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(400));
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Price::from_cents(1998).to_string(), "$19.98");
        assert_eq!(Price::new(Decimal::from(5)).to_string(), "$5.00");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(
            Price::parse_positive("12.50").unwrap().amount(),
            Decimal::new(125, 1)
        );
        assert_eq!(
            Price::parse_positive(" $3 ").unwrap(),
            Price::new(Decimal::from(3))
        );
    }

    #[test]
    fn test_parse_positive_rejects_bad_input() {
        assert_eq!(Price::parse_positive(""), Err(PriceError::Empty));
        assert_eq!(Price::parse_positive("$"), Err(PriceError::Empty));
        assert!(matches!(
            Price::parse_positive("abc"),
            Err(PriceError::NotANumber(_))
        ));
        assert_eq!(Price::parse_positive("0"), Err(PriceError::NotPositive));
        assert_eq!(Price::parse_positive("-4.99"), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("9.99").unwrap();
        assert_eq!(price, Price::from_cents(999));

        let whole: Price = serde_json::from_str("12").unwrap();
        assert_eq!(whole.amount(), Decimal::from(12));
    }

    #[test]
    fn test_serialize_as_json_number() {
        let json = serde_json::to_string(&Price::from_cents(1998)).unwrap();
        assert_eq!(json, "19.98");
    }
}
