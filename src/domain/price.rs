//! Lossless price type backed by rust_decimal.
//!
//! All gain and damage math runs on Price to avoid floating-point drift;
//! integer results (health, currency) are produced via explicit floors.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless decimal used for token prices, gain ratios and percentages.
///
/// Serializes to a JSON number (not a string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Price {
    /// Create a Price from a RustDecimal.
    pub fn new(value: RustDecimal) -> Self {
        Price(value)
    }

    /// Parse a Price from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn parse(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Price)
    }

    /// Create a Price from an integer count of whole units.
    pub fn from_i64(value: i64) -> Self {
        Price(RustDecimal::from(value))
    }

    /// Get the underlying RustDecimal.
    pub fn inner(&self) -> RustDecimal {
        self.0
    }

    /// The additive identity (0).
    pub fn zero() -> Self {
        Price(RustDecimal::ZERO)
    }

    /// The multiplicative identity (1).
    pub fn one() -> Self {
        Price(RustDecimal::ONE)
    }

    /// The value 100, used for percentage conversions.
    pub fn hundred() -> Self {
        Price(RustDecimal::ONE_HUNDRED)
    }

    /// Returns true if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Relative gain of `self` over a reference price:
    /// `(self - reference) / reference`. Zero when the reference is
    /// non-positive, so invalid purchase prices never produce a gain.
    pub fn gain_over(&self, reference: Price) -> Price {
        if !reference.is_positive() {
            return Price::zero();
        }
        Price((self.0 - reference.0) / reference.0)
    }

    /// Percentage drop of `current` below `self` (self as the peak):
    /// `(self - current) / self * 100`, clamped at 0 when current >= self.
    pub fn drop_percent_to(&self, current: Price) -> Price {
        if !self.is_positive() || current >= *self {
            return Price::zero();
        }
        Price((self.0 - current.0) / self.0 * RustDecimal::ONE_HUNDRED)
    }

    /// Truncate toward zero to an i64. Values outside i64 range clamp to
    /// the nearest bound.
    pub fn floor_i64(&self) -> i64 {
        self.0.trunc().to_i64().unwrap_or(if self.0.is_sign_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
    }

    /// Format without exponent notation.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<RustDecimal> for Price {
    fn from(value: RustDecimal) -> Self {
        Price(value)
    }
}

impl From<Price> for RustDecimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl std::ops::Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Price {
    type Output = Price;

    fn sub(self, rhs: Price) -> Price {
        Price(self.0 - rhs.0)
    }
}

impl std::ops::Mul for Price {
    type Output = Price;

    fn mul(self, rhs: Price) -> Price {
        Price(self.0 * rhs.0)
    }
}

impl std::ops::Div for Price {
    type Output = Price;

    fn div(self, rhs: Price) -> Price {
        Price(self.0 / rhs.0)
    }
}
