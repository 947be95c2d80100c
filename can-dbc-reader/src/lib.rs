//! CAN DBC Reader Library
//!
//! Parses the message (`BO_`) and signal (`SG_`) definitions of a DBC file into
//! a lookup table keyed by arbitration ID, then by signal name.
//!
//! # Architecture
//!
//! - A line classifier splits each line into whitespace-delimited fields and
//!   recognises message lines, signal lines and blank lines
//! - A database builder attaches every signal to the most recently opened
//!   message; a blank line closes the message
//! - Parsing is all-or-nothing: a complete [`SignalDatabase`] or a [`DbcError`]
//!
//! The library does NOT:
//! - Decode raw frame payloads
//! - Resolve signal byte order
//! - Handle value tables, comments, attributes or multiplexed signal groups
//!   (those lines are skipped)
//!
//! # Example Usage
//!
//! ```
//! use can_dbc_reader::parse_dbc_str;
//!
//! let text = "\
//! BO_ 100 EngineData: 8 PowertrainECU
//!  SG_ RPM : 15|16 (0.25,0) [0|16383.75] rpm
//! ";
//!
//! let db = parse_dbc_str(text).unwrap();
//! let rpm = db.lookup(100).and_then(|msg| msg.signal("RPM")).unwrap();
//! assert_eq!(rpm.length, 16);
//! assert_eq!(rpm.factor.as_f64(), 0.25);
//! ```

// Public modules
pub mod config;
pub mod signals;
pub mod types;

// Re-export main types for convenience
pub use config::ParserConfig;
pub use signals::{
    parse_dbc_file, parse_dbc_reader, parse_dbc_str, DatabaseStats, DbcParser,
    MessageDefinition, SignalDatabase, SignalDefinition,
};
pub use types::{DbcError, Number, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
