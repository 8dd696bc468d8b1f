//! Money: unit prices, unit costs and the stock valuations derived from them.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::Add;
use std::str::FromStr;

/// A currency amount. Serialized as a plain decimal string, so that no precision is lost in
/// `config.json`, backups or the database.
///
/// # Examples
///
/// ```
/// # use stock_recon::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1,200.5").unwrap();
/// assert_eq!(amount.to_string(), "1,200.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Multiplies the amount by a quantity, saturating instead of overflowing.
    pub fn times(&self, quantity: Decimal) -> Amount {
        Amount(self.0.saturating_mul(quantity))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

/// A string that is not a decimal amount.
#[derive(Debug, thiserror::Error)]
#[error("'{input}' is not an amount: {source}")]
pub struct AmountError {
    input: String,
    source: rust_decimal::Error,
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Accepts surrounding whitespace and `,` thousands separators; an empty string is zero. This
    /// is strict, for permissive coercion of sheet cells see `Cell::to_decimal`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.trim().chars().filter(|&c| c != ',').collect();
        if digits.is_empty() {
            return Ok(Amount::ZERO);
        }
        Decimal::from_str(&digits)
            .map(Amount)
            .map_err(|source| AmountError {
                input: s.to_string(),
                source,
            })
    }
}

impl Display for Amount {
    /// Two decimal places with `,` between thousands, e.g. `-1,200.50`.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let magnitude = self.0.abs().to_f64().unwrap_or_default();
        let sign = if self.0 < Decimal::ZERO { "-" } else { "" };
        write!(f, "{sign}{}", format_num::format_num!(",.2", magnitude))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
