//! Token amounts expressed in the smallest denomination of an 18-decimal token
//!
//! Subgraphs serialize `BigInt` fields as decimal strings that overflow any
//! primitive integer, so amounts are held as a signed 256-bit integer and
//! converted for display with ether units.

use alloy_primitives::utils::{format_ether, Unit};
use alloy_primitives::I256;
use serde::{Deserialize, Deserializer};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("amount {0:?} is not a decimal integer")]
    InvalidDigits(String),
    #[error("amount {value:?} does not fit in 256 bits: {reason}")]
    OutOfRange { value: String, reason: String },
}

/// Signed integer amount in base units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenAmount(I256);

impl TokenAmount {
    /// Parse a decimal integer with an optional leading minus sign
    pub fn parse(raw: &str) -> Result<Self, AmountError> {
        let raw = raw.trim();
        let unsigned = raw.strip_prefix('-').unwrap_or(raw);

        if unsigned.is_empty() {
            return Err(AmountError::Empty);
        }
        // from_dec_str tolerates `_` separators, the wire format does not
        if !unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidDigits(raw.to_string()));
        }

        I256::from_dec_str(raw)
            .map(Self)
            .map_err(|e| AmountError::OutOfRange {
                value: raw.to_string(),
                reason: e.to_string(),
            })
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Whole tokens, i.e. `floor(raw / 10^18)`
    ///
    /// Never rounds up: `1.5` tokens shows as `1`, and `-1.5` shows as `-2`.
    pub fn whole_tokens(&self) -> String {
        let unit = I256::from_raw(Unit::ETHER.wei());
        // I256 division truncates toward zero
        let whole = self.0 / unit;
        let floored = if (self.0 % unit).is_negative() {
            whole - I256::ONE
        } else {
            whole
        };
        floored.to_string()
    }

    /// Exact decimal rendering in tokens, trailing zeros trimmed
    ///
    /// Keeps at least one fractional digit: `2 * 10^18` renders as `2.0`.
    pub fn to_decimal_string(&self) -> String {
        let formatted = format_ether(self.0);
        let trimmed = formatted.trim_end_matches('0');
        if trimmed.ends_with('.') {
            format!("{}0", trimmed)
        } else {
            trimmed.to_string()
        }
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(text) => text,
            RawAmount::Unsigned(n) => n.to_string(),
            RawAmount::Signed(n) => n.to_string(),
        };
        TokenAmount::parse(&raw).map_err(serde::de::Error::custom)
    }
}
