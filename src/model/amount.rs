use std::{fmt::Display, str::FromStr};

use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{
    de::{self},
    ser, Serialize,
};

use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Number;

const MIN_EXPONENT: i64 = -18;
const MAX_EXPONENT: i64 = 64;

/// Monetary value held in minor units (hundredths).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Amount {
    amount: i64,
}

impl Amount {
    pub fn from_minor_units(amount: i64) -> Amount {
        Amount { amount }
    }

    pub fn serialize_for_db(&self) -> i64 {
        self.amount
    }

    pub fn deserialize_from_db(amount: i64) -> Amount {
        Amount { amount }
    }

    /// Parses a decimal literal with at most two fractional digits.
    pub fn parse_decimal(literal: &str) -> Result<Amount, String> {
        let value = BigDecimal::from_str(literal).map_err(|_| String::from("Failed to parse"))?;

        // Rescaling expands the exponent into a power of ten, so bound it first.
        // An exponent past 18 cannot fit i64 minor units either way.
        let (_, exponent) = value.as_bigint_and_exponent();
        if exponent < MIN_EXPONENT || exponent > MAX_EXPONENT {
            return Err(String::from("Invalid amount"));
        }

        let scaled = value.with_scale(2);
        if scaled != value {
            return Err(String::from("Invalid amount"));
        }

        let (minor_units, _) = scaled.as_bigint_and_exponent();
        match minor_units.to_i64() {
            Some(amount) => Ok(Amount { amount }),
            None => Err(String::from("Invalid amount")),
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let minor = self.amount.unsigned_abs() % 100;
        let major = self.amount.unsigned_abs() / 100;
        write!(f, "{}{}.{:0>2}", sign, major, minor)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let number: Number = serde_json::from_str(&self.to_string()).map_err(ser::Error::custom)?;
        Number::serialize(&number, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Amount, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = Number::deserialize(deserializer)?;

        Amount::parse_decimal(&n.to_string()).map_err(de::Error::custom)
    }
}
