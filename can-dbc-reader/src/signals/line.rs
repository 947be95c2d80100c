//! Line classification and field extraction
//!
//! Each input line is split on whitespace and classified by its first token.
//! Only `BO_` (message) and `SG_` (signal) lines carry data; every other line
//! is skipped. Fields are positional:
//!
//! ```text
//! BO_ <id> <genus>: <frame_bytes> <family>
//!  SG_ <name> <mux> <end_bit>|<length> (<factor>,<offset>) [<min>|<max>] <description>
//! ```
//!
//! In multiplexed signals the `:` is preceded by a tag (`M`, `m0`, `m3M`); the
//! tag is skipped and the remaining fields are read one position later.

use crate::signals::literal::{parse_number, parse_unsigned};
use crate::types::{DbcError, Number, Result};

/// Keyword opening a message definition
pub const MESSAGE_KEYWORD: &str = "BO_";
/// Keyword opening a signal definition
pub const SIGNAL_KEYWORD: &str = "SG_";

const MESSAGE_FIELDS: usize = 5;
const SIGNAL_FIELDS: usize = 7;

/// Classification of a single input line
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    /// `BO_` line starting a new message
    MessageStart(MessageHeader),
    /// `SG_` line adding a signal to the open message
    SignalEntry(SignalFields),
    /// Empty or whitespace-only line; closes the open message
    Blank,
    /// Any other line; ignored
    Skipped,
}

/// Fields extracted from a `BO_` line
#[derive(Debug, Clone, PartialEq)]
pub struct MessageHeader {
    pub arbitration_id: u32,
    pub genus: String,
    pub frame_bytes: u32,
    pub family: String,
}

/// Fields extracted from a `SG_` line
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFields {
    pub name: String,
    pub end_bit: u16,
    pub length: u16,
    pub factor: Number,
    pub offset: Number,
    pub minimum: Number,
    pub maximum: Number,
    pub description: String,
}

/// Classify one line of DBC text
///
/// `line_no` is only used for error reporting. `message_open` tells whether a
/// `BO_` line is currently in effect; a `SG_` line without one is a
/// [`DbcError::Structural`] error.
pub fn classify(line_no: usize, line: &str, message_open: bool) -> Result<LineKind> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first().copied() {
        None => Ok(LineKind::Blank),
        Some(MESSAGE_KEYWORD) => {
            require_fields(line_no, line, &tokens, MESSAGE_FIELDS)?;
            parse_message(line_no, &tokens).map(LineKind::MessageStart)
        }
        Some(SIGNAL_KEYWORD) => {
            if !message_open {
                return Err(DbcError::Structural {
                    line: line_no,
                    content: line.to_string(),
                });
            }
            let shift = usize::from(has_mux_tag(&tokens));
            require_fields(line_no, line, &tokens, SIGNAL_FIELDS + shift)?;
            parse_signal(line_no, &tokens, shift).map(LineKind::SignalEntry)
        }
        Some(_) => Ok(LineKind::Skipped),
    }
}

fn require_fields(line_no: usize, line: &str, tokens: &[&str], expected: usize) -> Result<()> {
    if tokens.len() < expected {
        return Err(DbcError::FieldCount {
            line: line_no,
            expected,
            found: tokens.len(),
            content: line.to_string(),
        });
    }
    Ok(())
}

fn parse_message(line_no: usize, tokens: &[&str]) -> Result<MessageHeader> {
    let arbitration_id = parse_unsigned(tokens[1]).ok_or_else(|| DbcError::NumericLiteral {
        line: line_no,
        token: tokens[1].to_string(),
    })?;
    let frame_bytes = parse_unsigned(tokens[3]).ok_or_else(|| DbcError::NumericLiteral {
        line: line_no,
        token: tokens[3].to_string(),
    })?;

    Ok(MessageHeader {
        arbitration_id,
        genus: tokens[2].strip_suffix(':').unwrap_or(tokens[2]).to_string(),
        frame_bytes,
        family: tokens[4].to_string(),
    })
}

/// True for `SG_ <name> <tag> : ...` where `<tag>` is a multiplexer marker
fn has_mux_tag(tokens: &[&str]) -> bool {
    if tokens.get(3).copied() != Some(":") {
        return false;
    }
    match tokens.get(2) {
        Some(&"M") => true,
        Some(tag) => tag
            .strip_prefix('m')
            .map(|rest| rest.strip_suffix('M').unwrap_or(rest))
            .is_some_and(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

fn parse_signal(line_no: usize, tokens: &[&str], shift: usize) -> Result<SignalFields> {
    let fields = &tokens[shift..];
    let (end_bit, length) = parse_bit_range(line_no, fields[3])?;
    let (factor, offset) = parse_pair(line_no, fields[4], &['(', ')'], ',')?;
    let (minimum, maximum) = parse_pair(line_no, fields[5], &['[', ']'], '|')?;

    Ok(SignalFields {
        name: tokens[1].to_string(),
        end_bit,
        length,
        factor,
        offset,
        minimum,
        maximum,
        description: fields[6].to_string(),
    })
}

/// Parse `<end_bit>@<length>` or `<end_bit>|<length>`
///
/// Both separators are normalised to `|`. Parts after the second one (such as
/// the byte order and sign marker in `0|16@1+`) are ignored.
pub fn parse_bit_range(line_no: usize, token: &str) -> Result<(u16, u16)> {
    let bit_format_error = |reason: &str| DbcError::BitFieldFormat {
        line: line_no,
        token: token.to_string(),
        reason: reason.to_string(),
    };

    let normalized = token.replace('@', "|");
    let mut parts = normalized.split('|');
    let (end_bit, length) = match (parts.next(), parts.next()) {
        (Some(end_bit), Some(length)) => (end_bit, length),
        _ => return Err(bit_format_error("missing '@' or '|' separator")),
    };

    let end_bit: u16 = end_bit
        .parse()
        .map_err(|_| bit_format_error("end bit is not an integer"))?;
    let length: u16 = length
        .parse()
        .map_err(|_| bit_format_error("length is not an integer"))?;

    if length == 0 {
        return Err(bit_format_error("length must be positive"));
    }

    Ok((end_bit, length))
}

/// Parse a bracketed pair such as `(0.1,-40)` or `[0|100]`
fn parse_pair(line_no: usize, token: &str, brackets: &[char], separator: char) -> Result<(Number, Number)> {
    let literal_error = |bad: &str| DbcError::NumericLiteral {
        line: line_no,
        token: bad.to_string(),
    };

    let inner: String = token.chars().filter(|c| !brackets.contains(c)).collect();
    let mut parts = inner.split(separator);
    let (first, second) = match (parts.next(), parts.next()) {
        (Some(first), Some(second)) => (first, second),
        _ => return Err(literal_error(token)),
    };

    let first = parse_number(first).ok_or_else(|| literal_error(first))?;
    let second = parse_number(second).ok_or_else(|| literal_error(second))?;
    Ok((first, second))
}
