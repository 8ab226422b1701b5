//! SiaPrimecoin <-> hastings conversion.
//!
//! One coin is 10^24 hastings. Both conversions shift the decimal scale
//! instead of multiplying, so they are exact for any finite input, and
//! amounts always render as plain digits. The daemon API rejects JSON
//! numbers in exponential form, so `1e+44` must never leave this module.

use crate::error::{Error, Result};
use bigdecimal::BigDecimal;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Map key serde_json uses to hand over a number's exact text.
const JSON_NUMBER_TOKEN: &str = "$serde_json::private::Number";

/// Power of ten separating a coin from its smallest unit.
pub const HASTINGS_EXPONENT: i64 = 24;

/// An arbitrary-precision decimal amount, either coins or hastings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigDecimal);

impl Amount {
    /// Wrap an existing decimal.
    pub fn new(value: BigDecimal) -> Self {
        Self(value)
    }

    /// Number of hastings in one coin.
    pub fn hastings_per_coin() -> Self {
        Self(BigDecimal::new(1.into(), -HASTINGS_EXPONENT))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigDecimal::default()
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn into_decimal(self) -> BigDecimal {
        self.0
    }

    /// Multiply by 10^`exponent` without rounding.
    fn shift(&self, exponent: i64) -> Self {
        let (digits, scale) = self.0.as_bigint_and_exponent();
        Self(BigDecimal::new(digits, scale - exponent).normalized())
    }
}

/// Convert coins to hastings.
pub fn to_subunits(amount: &Amount) -> Amount {
    amount.shift(HASTINGS_EXPONENT)
}

/// Convert hastings to coins.
pub fn to_main_unit(subunits: &Amount) -> Amount {
    subunits.shift(-HASTINGS_EXPONENT)
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BigDecimal::from_str(s)
            .map(Self)
            .map_err(|_| Error::InvalidAmount(s.to_string()))
    }
}

impl TryFrom<&str> for Amount {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        s.parse()
    }
}

impl From<BigDecimal> for Amount {
    fn from(value: BigDecimal) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigDecimal::from(value))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(BigDecimal::from(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_plain_string())
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Amount, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Amount, E> {
        if !v.is_finite() {
            return Err(E::custom(Error::InvalidAmount(v.to_string())));
        }
        // f64's Display never uses exponent notation
        v.to_string().parse().map_err(E::custom)
    }

    // serde_json with `arbitrary_precision` delivers numbers as a one-entry
    // map holding the literal digits, so values past u64 stay exact.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Amount, A::Error> {
        match map.next_key::<String>()? {
            Some(key) if key == JSON_NUMBER_TOKEN => {
                let digits: String = map.next_value()?;
                digits.parse().map_err(de::Error::custom)
            }
            _ => Err(de::Error::invalid_type(de::Unexpected::Map, &self)),
        }
    }
}
