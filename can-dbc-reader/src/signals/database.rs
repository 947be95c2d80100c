//! Signal database
//!
//! The lookup table produced by the parser: arbitration ID to message, then
//! signal name to signal.

use crate::types::Number;
use serde::Serialize;
use std::collections::HashMap;

/// A CAN message (frame type) definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageDefinition {
    /// CAN arbitration ID
    pub arbitration_id: u32,
    /// Classification tag taken from the last field of the `BO_` line
    pub family: String,
    /// Message name, without its trailing colon
    pub genus: String,
    /// Declared payload length in bytes
    pub frame_bytes: u32,
    /// Signals in this message by name
    pub signals: HashMap<String, SignalDefinition>,
}

/// A CAN signal definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalDefinition {
    /// Signal name
    pub name: String,
    /// Bit position as written in the DBC file
    pub end_bit: u16,
    /// Length in bits (always > 0)
    pub length: u16,
    /// Scale factor to convert raw value to physical value
    pub factor: Number,
    /// Offset to add after scaling
    pub offset: Number,
    /// Minimum physical value
    pub minimum: Number,
    /// Maximum physical value
    pub maximum: Number,
    /// First whitespace-delimited token of the description field
    pub description: String,
    /// Last decoded value; filled in by a frame decoder, never by the parser
    pub current_value: Option<Number>,
}

impl SignalDefinition {
    /// Lowest bit covered by the signal, assuming `end_bit` is its highest bit
    ///
    /// Returns `None` when the signal would start before bit 0. Byte order is
    /// not taken into account.
    pub fn start_bit(&self) -> Option<u16> {
        (u32::from(self.end_bit) + 1)
            .checked_sub(u32::from(self.length))
            .map(|bit| bit as u16)
    }
}

impl MessageDefinition {
    /// Create a message with no signals
    pub fn new(arbitration_id: u32, genus: String, frame_bytes: u32, family: String) -> Self {
        Self {
            arbitration_id,
            family,
            genus,
            frame_bytes,
            signals: HashMap::new(),
        }
    }

    /// Get a signal by name
    pub fn signal(&self, name: &str) -> Option<&SignalDefinition> {
        self.signals.get(name)
    }

    /// All signal names, sorted
    pub fn signal_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.signals.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// The parsed DBC lookup table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignalDatabase {
    /// All message definitions by arbitration ID
    messages: HashMap<u32, MessageDefinition>,
}

impl SignalDatabase {
    /// Create a new empty signal database
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a message, returning the definition it replaced
    pub(crate) fn insert_message(&mut self, message: MessageDefinition) -> Option<MessageDefinition> {
        self.messages.insert(message.arbitration_id, message)
    }

    /// Keep only messages whose arbitration ID satisfies `keep`
    pub(crate) fn retain_messages<F: FnMut(u32) -> bool>(&mut self, mut keep: F) {
        self.messages.retain(|id, _| keep(*id));
    }

    /// Get the message definition for an arbitration ID
    pub fn lookup(&self, arbitration_id: u32) -> Option<&MessageDefinition> {
        self.messages.get(&arbitration_id)
    }

    /// Mutable access for decoders that record `current_value`
    pub fn lookup_mut(&mut self, arbitration_id: u32) -> Option<&mut MessageDefinition> {
        self.messages.get_mut(&arbitration_id)
    }

    /// True if a message with this arbitration ID exists
    pub fn contains(&self, arbitration_id: u32) -> bool {
        self.messages.contains_key(&arbitration_id)
    }

    /// All arbitration IDs in the database, sorted
    pub fn arbitration_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.messages.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all messages in no particular order
    pub fn messages(&self) -> impl Iterator<Item = &MessageDefinition> {
        self.messages.values()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Find all messages containing a specific signal name
    pub fn find_signal(&self, signal_name: &str) -> Vec<(u32, &SignalDefinition)> {
        let mut found: Vec<(u32, &SignalDefinition)> = self
            .messages
            .values()
            .filter_map(|msg| msg.signal(signal_name).map(|sig| (msg.arbitration_id, sig)))
            .collect();
        found.sort_unstable_by_key(|(id, _)| *id);
        found
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        DatabaseStats {
            num_messages: self.messages.len(),
            num_signals: self.messages.values().map(|msg| msg.signals.len()).sum(),
        }
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Total number of message definitions
    pub num_messages: usize,
    /// Total number of signal definitions
    pub num_signals: usize,
}
