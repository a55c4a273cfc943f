//! Decimal price strings as delivered by the commerce API.
//!
//! The external API serializes every monetary amount as a decimal string
//! (`"55.00"`), with the empty string standing in for "no price" (e.g. a
//! product that is not on sale). [`Price`] keeps the wire representation
//! intact and parses on demand, so totals can be computed exactly with
//! `rust_decimal` while round-tripping the payload byte-for-byte.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a price string into a decimal amount.
#[derive(Debug, Error)]
pub enum PriceError {
    /// The price string is empty (no price set).
    #[error("price is empty")]
    Empty,
    /// The price string is not a valid decimal number.
    #[error("invalid decimal price {0:?}")]
    Invalid(String),
}

/// A monetary amount as a decimal string.
///
/// Kept as the raw wire string; parse with [`Price::amount`] when arithmetic
/// is needed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Price(String);

impl Price {
    /// Create a price from a decimal string.
    #[must_use]
    pub const fn new(raw: String) -> Self {
        Self(raw)
    }

    /// The raw wire string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a price is set at all (empty string = unset).
    #[must_use]
    pub fn is_set(&self) -> bool {
        !self.0.is_empty()
    }

    /// Parse the price into an exact decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Empty`] for an unset price and
    /// [`PriceError::Invalid`] if the string is not a decimal number.
    pub fn amount(&self) -> Result<Decimal, PriceError> {
        if self.0.is_empty() {
            return Err(PriceError::Empty);
        }
        self.0
            .parse::<Decimal>()
            .map_err(|_| PriceError::Invalid(self.0.clone()))
    }

    /// Parse the price, treating unset or malformed values as zero.
    ///
    /// Used for cart totals where a product with no parseable price must not
    /// poison the whole sum.
    #[must_use]
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount().unwrap_or_default()
    }
}

impl From<&str> for Price {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
