// Utility helpers for parsing and basic statistics.
//
// This module centralizes all the "dirty" CSV/number handling so the loader
// and the analysis engine can assume clean, typed values.
use num_format::{Locale, ToFormattedString};

/// Parse a string-like value into `f64` while being forgiving about
/// formatting issues that are common in billing exports (commas, spaces,
/// currency signs).
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters.
/// - Strips thousands separators like `","` and a leading `"$"`.
/// - Returns `None` for anything that cannot be safely parsed or is not finite.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace([',', '$'], "");
    let v = s.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Outcome of coercing one CSV cell to a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coerced {
    /// The cell held a usable number.
    Parsed(f64),
    /// The cell was missing or blank.
    Missing,
    /// The cell held text that is not a number.
    Invalid,
}

impl Coerced {
    pub fn value(self) -> f64 {
        match self {
            Coerced::Parsed(v) => v,
            Coerced::Missing | Coerced::Invalid => 0.0,
        }
    }
}

/// Coerce a cell the way the upstream extraction expects: missing and
/// malformed values both become zero, but the caller can tell them apart.
pub fn coerce_f64(s: Option<&str>) -> Coerced {
    match s.map(str::trim) {
        None | Some("") => Coerced::Missing,
        Some(raw) => match parse_f64_safe(Some(raw)) {
            Some(v) => Coerced::Parsed(v),
            None => Coerced::Invalid,
        },
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Relative change from `previous` to `current`, in percent.
///
/// Returns `None` when `previous` is zero, since the ratio is undefined.
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Share of `part` in `total`, in percent. Zero when `total` is not positive.
pub fn share_pct(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    part / total * 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let s = format!("{:.*}", decimals, n.abs());
    let neg = n.is_sign_negative() && s.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    // Use `num-format` to insert commas into the integer portion.
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // counts in console messages (e.g., `1,204 values coerced`).
    n.to_formatted_string(&Locale::en)
}
