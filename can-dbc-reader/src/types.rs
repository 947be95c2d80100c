//! Core types for the DBC reader library
//!
//! This module defines the error type returned by every parse operation and the
//! numeric value type produced when evaluating scaling and range literals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, DbcError>;

/// Errors that can occur while building a signal database
///
/// Line numbers are 1-based and refer to the position in the input text.
#[derive(Debug, thiserror::Error)]
pub enum DbcError {
    #[error("line {line}: signal definition outside of any message: {content:?}")]
    Structural { line: usize, content: String },

    #[error("line {line}: expected at least {expected} fields, found {found}: {content:?}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
        content: String,
    },

    #[error("line {line}: invalid numeric literal {token:?}")]
    NumericLiteral { line: usize, token: String },

    #[error("line {line}: invalid bit field {token:?}: {reason}")]
    BitFieldFormat {
        line: usize,
        token: String,
        reason: String,
    },

    #[error("line {line}: duplicate message ID {id}")]
    DuplicateMessage { line: usize, id: u32 },

    #[error("line {line}: duplicate signal '{name}' in message {id}")]
    DuplicateSignal { line: usize, id: u32, name: String },

    #[error("line {line}: signal '{name}' has minimum {minimum} greater than maximum {maximum}")]
    InvalidRange {
        line: usize,
        name: String,
        minimum: Number,
        maximum: Number,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbcError {
    /// Line number the error was raised on, if it came from a specific line
    pub fn line(&self) -> Option<usize> {
        match self {
            DbcError::Structural { line, .. }
            | DbcError::FieldCount { line, .. }
            | DbcError::NumericLiteral { line, .. }
            | DbcError::BitFieldFormat { line, .. }
            | DbcError::DuplicateMessage { line, .. }
            | DbcError::DuplicateSignal { line, .. }
            | DbcError::InvalidRange { line, .. } => Some(*line),
            DbcError::Io(_) => None,
        }
    }
}

/// A numeric literal as written in a DBC file
///
/// Literals without a fractional part or exponent stay integers; everything
/// else is stored as floating point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    /// Integer literal, e.g. `-40`
    Integer(i64),
    /// Floating-point literal, e.g. `0.25`
    Float(f64),
}

impl Number {
    /// Numeric value as f64
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(v) => *v as f64,
            Number::Float(v) => *v,
        }
    }

    /// Integer value, if the literal was an integer or a float with no fraction
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(v) => Some(*v),
            Number::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(*v as i64),
            Number::Float(_) => None,
        }
    }

    /// True if the literal was written as an integer
    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a.partial_cmp(b),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(v) => write!(f, "{}", v),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_conversions() {
        let int_val = Number::Integer(-40);
        assert_eq!(int_val.as_f64(), -40.0);
        assert_eq!(int_val.as_i64(), Some(-40));
        assert!(int_val.is_integer());

        let float_val = Number::Float(0.25);
        assert_eq!(float_val.as_f64(), 0.25);
        assert_eq!(float_val.as_i64(), None);
        assert!(!float_val.is_integer());

        assert_eq!(Number::Float(8.0).as_i64(), Some(8));
    }

    #[test]
    fn test_number_equality_across_variants() {
        assert_eq!(Number::Integer(-40), Number::Float(-40.0));
        assert_ne!(Number::Integer(1), Number::Float(1.5));
        assert!(Number::Integer(-40) < Number::Float(215.5));
    }

    #[test]
    fn test_error_line() {
        let err = DbcError::NumericLiteral {
            line: 7,
            token: "abc".to_string(),
        };
        assert_eq!(err.line(), Some(7));
        assert_eq!(err.to_string(), "line 7: invalid numeric literal \"abc\"");

        let io = DbcError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(io.line(), None);
    }
}
