//! Signal database and DBC parser
//!
//! This module contains the line classifier, the numeric literal parser and
//! the database builder that turns DBC text into a [`SignalDatabase`].

pub mod database;
pub mod dbc;
pub mod line;
pub mod literal;

// Re-export key types for convenience
pub use database::{DatabaseStats, MessageDefinition, SignalDatabase, SignalDefinition};
pub use dbc::{parse_dbc_file, parse_dbc_reader, parse_dbc_str, DbcParser};
pub use line::{classify, LineKind, MessageHeader, SignalFields};
pub use literal::parse_number;
