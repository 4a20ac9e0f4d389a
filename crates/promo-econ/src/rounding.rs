//! Rounding and formatting helpers.
//!
//! All rounding is half away from zero, so 0.5 rounds to 1 and -0.5 to -1.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Placeholder shown where no projection exists.
pub const EM_DASH: &str = "\u{2014}";

/// Round to `dp` decimal places, half away from zero.
pub fn round_half_up(v: Decimal, dp: u32) -> Decimal {
    v.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to the nearest whole unit count, clamping negatives to zero and
/// saturating at `u64::MAX`.
pub fn round_units(v: Decimal) -> u64 {
    if v <= Decimal::ZERO {
        return 0;
    }
    round_half_up(v, 0).to_u64().unwrap_or(u64::MAX)
}

/// `part / whole * 100`, or zero when `whole` is not positive.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}

/// Signed difference `a - b` of two unit counts, saturating at the `i64` range.
pub fn unit_delta(a: u64, b: u64) -> i64 {
    let d = a as i128 - b as i128;
    d.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Group an integer digit string with thousands separators.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format as currency with two decimals, e.g. `-$1,234.50`.
pub fn format_currency(v: Decimal) -> String {
    let r = round_half_up(v, 2);
    let sign = if r.is_sign_negative() && !r.is_zero() { "-" } else { "" };
    let s = format!("{:.2}", r.abs());
    let (int, frac) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    format!("{sign}${}.{frac}", group_thousands(int))
}

/// Format a whole count with thousands separators.
pub fn format_count(v: i64) -> String {
    let sign = if v < 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(&v.unsigned_abs().to_string()))
}

/// Format an unsigned unit total with thousands separators.
pub fn format_units(v: u64) -> String {
    group_thousands(&v.to_string())
}

/// Format a percentage with two decimals, e.g. `-1.58%`.
pub fn format_pct(v: Decimal) -> String {
    format!("{:.2}%", round_half_up(v, 2))
}

/// Format an optional value, falling back to an em-dash.
pub fn or_dash<T>(v: Option<T>, f: impl FnOnce(T) -> String) -> String {
    v.map(f).unwrap_or_else(|| EM_DASH.to_string())
}
