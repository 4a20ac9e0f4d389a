//! Canonical parse boundary for numeric text fields.
//!
//! Price, cost and margin inputs arrive as free text (a field may be empty
//! while the user types). They are parsed exactly once, here, into a typed
//! optional value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::trace;

/// Parse a user-entered amount such as `"10.00"`, `"$1,250.50"` or `"35%"`.
///
/// Returns `None` for empty, unparsable or negative input.
///
/// Example:
/// assert_eq!(parse_amount(" $1,250.50 "), Some(Decimal::new(125050, 2)));
/// assert_eq!(parse_amount(""), None);
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    let s = s.strip_prefix('$').unwrap_or(s);
    let s = s.strip_suffix('%').unwrap_or(s).trim();
    if s.is_empty() {
        return None;
    }
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    match Decimal::from_str(&cleaned) {
        Ok(v) if v >= Decimal::ZERO => Some(v.normalize()),
        Ok(_) => {
            trace!(raw, "rejected negative amount");
            None
        }
        Err(_) => {
            trace!(raw, "rejected unparsable amount");
            None
        }
    }
}

/// Text of a price field together with its parsed value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInput {
    raw: String,
    value: Option<Decimal>,
}

impl PriceInput {
    /// Parse `raw` through [`parse_amount`].
    pub fn parse(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            value: parse_amount(raw),
        }
    }

    /// An empty field.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Text as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Parsed amount, `None` when the field is empty or invalid.
    pub fn value(&self) -> Option<Decimal> {
        self.value
    }

    /// Field has text that did not parse.
    pub fn is_invalid(&self) -> bool {
        self.value.is_none() && !self.raw.trim().is_empty()
    }
}
