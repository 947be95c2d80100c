//! Numeric literal parsing
//!
//! Accepts the literal forms found in DBC scaling and range fields: optionally
//! signed integers, decimals and exponent notation. Anything else (names,
//! expressions, `inf`/`nan`) is rejected.

use crate::types::Number;

/// Parse a numeric literal into the narrowest matching [`Number`]
///
/// Returns `None` if the token is not a number.
pub fn parse_number(token: &str) -> Option<Number> {
    let token = token.trim();
    let digits = token.strip_prefix(&['+', '-'][..]).unwrap_or(token);

    if digits.is_empty() {
        return None;
    }

    if digits.bytes().all(|b| b.is_ascii_digit()) {
        // Integers beyond i64 keep their value as a float
        return match token.parse::<i64>() {
            Ok(value) => Some(Number::Integer(value)),
            Err(_) => token.parse::<f64>().ok().map(Number::Float),
        };
    }

    let well_formed = digits.bytes().any(|b| b.is_ascii_digit())
        && digits
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !well_formed {
        return None;
    }

    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Number::Float)
}

/// Parse a non-negative integer field such as an arbitration ID or byte count
pub fn parse_unsigned(token: &str) -> Option<u32> {
    let digits = token.strip_prefix('+').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
