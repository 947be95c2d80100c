//! Parser configuration types
//!
//! The default configuration is permissive: duplicate message IDs and signal
//! names overwrite earlier definitions and signal ranges are not checked.
//! Stricter validation is opt-in.

use serde::{Deserialize, Serialize};

/// Configuration for the DBC parser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Fail on a `BO_` line that reuses an already defined arbitration ID
    #[serde(default)]
    pub reject_duplicate_messages: bool,

    /// Fail on a `SG_` line that reuses a signal name within the same message
    #[serde(default)]
    pub reject_duplicate_signals: bool,

    /// Fail on signals whose minimum is greater than their maximum
    #[serde(default)]
    pub validate_ranges: bool,

    /// Optional: only keep messages with these arbitration IDs
    #[serde(default)]
    pub message_filter: Option<Vec<u32>>,
}

impl ParserConfig {
    /// Create a new parser configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every validation check enabled
    pub fn strict() -> Self {
        Self::new()
            .with_duplicate_messages_rejected(true)
            .with_duplicate_signals_rejected(true)
            .with_range_validation(true)
    }

    /// Builder method: reject duplicate arbitration IDs
    pub fn with_duplicate_messages_rejected(mut self, enabled: bool) -> Self {
        self.reject_duplicate_messages = enabled;
        self
    }

    /// Builder method: reject duplicate signal names
    pub fn with_duplicate_signals_rejected(mut self, enabled: bool) -> Self {
        self.reject_duplicate_signals = enabled;
        self
    }

    /// Builder method: check `minimum <= maximum` on every signal
    pub fn with_range_validation(mut self, enabled: bool) -> Self {
        self.validate_ranges = enabled;
        self
    }

    /// Builder method: set message filter
    pub fn with_message_filter(mut self, messages: Vec<u32>) -> Self {
        self.message_filter = Some(messages);
        self
    }

    /// Check if a message ID should be kept in the database
    pub fn should_keep_message(&self, arbitration_id: u32) -> bool {
        match &self.message_filter {
            Some(messages) => messages.contains(&arbitration_id),
            None => true,
        }
    }
}
