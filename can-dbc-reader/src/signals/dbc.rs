//! DBC file parser
//!
//! Builds a [`SignalDatabase`] from DBC text in a single pass. The only state
//! carried between lines is the arbitration ID of the most recently opened
//! message; a blank line closes it.

use crate::config::ParserConfig;
use crate::signals::database::{MessageDefinition, SignalDatabase, SignalDefinition};
use crate::signals::line::{classify, LineKind, MessageHeader, SignalFields};
use crate::types::{DbcError, Result};
use std::io::BufRead;
use std::path::Path;

/// Parse DBC text with the default (permissive) configuration
pub fn parse_dbc_str(text: &str) -> Result<SignalDatabase> {
    DbcParser::default().parse_str(text)
}

/// Parse DBC text read line by line from `reader`
pub fn parse_dbc_reader<R: BufRead>(reader: R) -> Result<SignalDatabase> {
    DbcParser::default().parse_reader(reader)
}

/// Parse a DBC file
pub fn parse_dbc_file(path: &Path) -> Result<SignalDatabase> {
    DbcParser::default().parse_file(path)
}

/// DBC parser with a fixed configuration
///
/// Every parse is all-or-nothing: either the complete database or the first
/// error encountered is returned.
#[derive(Debug, Clone, Default)]
pub struct DbcParser {
    config: ParserConfig,
}

impl DbcParser {
    /// Create a parser using `config`
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Get the parser configuration
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse DBC text held in memory
    pub fn parse_str(&self, text: &str) -> Result<SignalDatabase> {
        let mut builder = DatabaseBuilder::new(&self.config);
        for line in text.lines() {
            builder.push_line(line)?;
        }
        Ok(builder.finish())
    }

    /// Parse DBC text streamed from a reader
    pub fn parse_reader<R: BufRead>(&self, reader: R) -> Result<SignalDatabase> {
        let mut builder = DatabaseBuilder::new(&self.config);
        for line in reader.lines() {
            builder.push_line(&line?)?;
        }
        Ok(builder.finish())
    }

    /// Parse a DBC file
    ///
    /// Files that are not valid UTF-8 are decoded as Latin-1, which covers the
    /// Windows-1252 encoding many DBC editors produce.
    pub fn parse_file(&self, path: &Path) -> Result<SignalDatabase> {
        log::info!("Parsing DBC file: {:?}", path);

        let bytes = std::fs::read(path)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("DBC file {:?} is not UTF-8, trying Latin-1 encoding", path);
                err.into_bytes().iter().map(|&b| b as char).collect()
            }
        };

        self.parse_str(&text)
    }
}

/// Single-pass accumulator driven by classified lines
struct DatabaseBuilder<'a> {
    config: &'a ParserConfig,
    db: SignalDatabase,
    /// Arbitration ID of the message that signal lines attach to
    open_message: Option<u32>,
    line_no: usize,
}

impl<'a> DatabaseBuilder<'a> {
    fn new(config: &'a ParserConfig) -> Self {
        log::info!("Building signal database from DBC text");
        Self {
            config,
            db: SignalDatabase::new(),
            open_message: None,
            line_no: 0,
        }
    }

    fn push_line(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;
        let line = if self.line_no == 1 {
            line.strip_prefix('\u{feff}').unwrap_or(line)
        } else {
            line
        };

        match classify(self.line_no, line, self.open_message.is_some())? {
            LineKind::MessageStart(header) => self.open_message(header),
            LineKind::SignalEntry(fields) => self.add_signal(line, fields),
            LineKind::Blank => {
                self.open_message = None;
                Ok(())
            }
            LineKind::Skipped => {
                log::trace!("Skipping line {}: {:?}", self.line_no, line);
                Ok(())
            }
        }
    }

    fn open_message(&mut self, header: MessageHeader) -> Result<()> {
        let id = header.arbitration_id;

        if self.db.contains(id) {
            if self.config.reject_duplicate_messages {
                return Err(DbcError::DuplicateMessage {
                    line: self.line_no,
                    id,
                });
            }
            log::warn!(
                "Line {}: message {} redefined, replacing earlier definition",
                self.line_no,
                id
            );
        }

        log::debug!("Line {}: message {} ({})", self.line_no, id, header.genus);

        self.db.insert_message(MessageDefinition::new(
            id,
            header.genus,
            header.frame_bytes,
            header.family,
        ));
        self.open_message = Some(id);
        Ok(())
    }

    fn add_signal(&mut self, line: &str, fields: SignalFields) -> Result<()> {
        let line_no = self.line_no;
        let message = match self.open_message.and_then(|id| self.db.lookup_mut(id)) {
            Some(message) => message,
            None => {
                return Err(DbcError::Structural {
                    line: line_no,
                    content: line.to_string(),
                })
            }
        };

        if self.config.validate_ranges && fields.minimum > fields.maximum {
            return Err(DbcError::InvalidRange {
                line: line_no,
                name: fields.name,
                minimum: fields.minimum,
                maximum: fields.maximum,
            });
        }

        if message.signals.contains_key(&fields.name) {
            if self.config.reject_duplicate_signals {
                return Err(DbcError::DuplicateSignal {
                    line: line_no,
                    id: message.arbitration_id,
                    name: fields.name,
                });
            }
            log::warn!(
                "Line {}: signal '{}' redefined in message {}",
                line_no,
                fields.name,
                message.arbitration_id
            );
        }

        message.signals.insert(
            fields.name.clone(),
            SignalDefinition {
                name: fields.name,
                end_bit: fields.end_bit,
                length: fields.length,
                factor: fields.factor,
                offset: fields.offset,
                minimum: fields.minimum,
                maximum: fields.maximum,
                description: fields.description,
                current_value: None,
            },
        );
        Ok(())
    }

    fn finish(mut self) -> SignalDatabase {
        if self.config.message_filter.is_some() {
            let config = self.config;
            self.db.retain_messages(|id| config.should_keep_message(id));
        }

        let stats = self.db.stats();
        log::info!(
            "Parsed {} messages with {} signals from {} lines",
            stats.num_messages,
            stats.num_signals,
            self.line_no
        );

        self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Number;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    const TWO_MESSAGES: &str = r#"
BO_ 100 EngineData: 8 PowertrainECU
 SG_ RPM : 15|16 (0.25,0) [0|16383.75] "engine speed"
 SG_ Temp : 7|8 (1,-40) [-40|215] "coolant temp"

BO_ 200 BrakeData: 4 ChassisECU
 SG_ Pressure : 31|16 (0.1,0) [0|6553.5] "brake pressure"
"#;

    #[test]
    fn test_parse_two_messages() {
        let db = parse_dbc_str(TWO_MESSAGES).unwrap();

        assert_eq!(db.arbitration_ids(), vec![100, 200]);

        let engine = db.lookup(100).unwrap();
        assert_eq!(engine.genus, "EngineData");
        assert_eq!(engine.family, "PowertrainECU");
        assert_eq!(engine.frame_bytes, 8);
        assert_eq!(engine.signal_names(), vec!["RPM", "Temp"]);

        let rpm = engine.signal("RPM").unwrap();
        assert_eq!(rpm.end_bit, 15);
        assert_eq!(rpm.length, 16);
        assert_eq!(rpm.factor, Number::Float(0.25));
        assert_eq!(rpm.current_value, None);

        let temp = engine.signal("Temp").unwrap();
        assert_eq!(temp.offset.as_f64(), -40.0);

        let brake = db.lookup(200).unwrap();
        assert_eq!(brake.signals.len(), 1);
        let pressure = brake.signal("Pressure").unwrap();
        assert_eq!(pressure.length, 16);
        assert_eq!(pressure.factor.as_f64(), 0.1);
    }

    #[test]
    fn test_blank_line_closes_message() {
        let text = "BO_ 100 EngineData: 8 ECU\n SG_ A : 0|8 (1,0) [0|255] a\n\n SG_ B : 8|8 (1,0) [0|255] b\n";
        let err = parse_dbc_str(text).unwrap_err();
        assert!(matches!(err, DbcError::Structural { line: 4, .. }));
    }

    #[test]
    fn test_signal_before_any_message() {
        let err = parse_dbc_str(" SG_ A : 0|8 (1,0) [0|255] a").unwrap_err();
        assert!(matches!(err, DbcError::Structural { line: 1, .. }));
    }

    #[test]
    fn test_unrecognized_lines_keep_message_open() {
        let text = "BO_ 100 EngineData: 8 ECU\nCM_ \"comment\"\n SG_ A : 0|8 (1,0) [0|255] a\n";
        let db = parse_dbc_str(text).unwrap();
        assert!(db.lookup(100).unwrap().signal("A").is_some());
    }

    #[test]
    fn test_redefined_message_replaces_signals() {
        let text = "BO_ 100 First: 8 ECU\n SG_ A : 0|8 (1,0) [0|255] a\nBO_ 100 Second: 2 ECU\n SG_ B : 0|8 (1,0) [0|255] b\n";
        let db = parse_dbc_str(text).unwrap();

        let message = db.lookup(100).unwrap();
        assert_eq!(message.genus, "Second");
        assert_eq!(message.frame_bytes, 2);
        assert_eq!(message.signal_names(), vec!["B"]);
    }

    #[test]
    fn test_duplicate_signal_overwrites() {
        let text = "BO_ 100 EngineData: 8 ECU\n SG_ A : 0|8 (1,0) [0|255] first\n SG_ A : 8|4 (2,0) [0|30] second\n";
        let db = parse_dbc_str(text).unwrap();

        let signal = db.lookup(100).unwrap().signal("A").unwrap();
        assert_eq!(signal.length, 4);
        assert_eq!(signal.description, "second");
    }

    #[test]
    fn test_strict_config_rejects_duplicates() {
        let parser = DbcParser::new(ParserConfig::strict());

        let err = parser
            .parse_str("BO_ 1 A: 8 X\n\nBO_ 1 B: 8 X\n")
            .unwrap_err();
        assert!(matches!(err, DbcError::DuplicateMessage { line: 3, id: 1 }));

        let err = parser
            .parse_str("BO_ 1 A: 8 X\n SG_ S : 0|1 (1,0) [0|1] s\n SG_ S : 1|1 (1,0) [0|1] s\n")
            .unwrap_err();
        assert!(matches!(err, DbcError::DuplicateSignal { line: 3, id: 1, ref name } if name == "S"));
    }

    #[test]
    fn test_range_validation() {
        let text = "BO_ 1 A: 8 X\n SG_ S : 0|8 (1,0) [100|0] s\n";

        // Permissive by default
        assert!(parse_dbc_str(text).is_ok());

        let parser = DbcParser::new(ParserConfig::new().with_range_validation(true));
        let err = parser.parse_str(text).unwrap_err();
        assert!(matches!(err, DbcError::InvalidRange { line: 2, ref name, .. } if name == "S"));
    }

    #[test]
    fn test_message_filter() {
        let parser = DbcParser::new(ParserConfig::new().with_message_filter(vec![200]));
        let db = parser.parse_str(TWO_MESSAGES).unwrap();

        assert_eq!(db.arbitration_ids(), vec![200]);
        assert!(db.lookup(100).is_none());
    }

    #[test]
    fn test_message_filter_still_validates() {
        let parser = DbcParser::new(ParserConfig::new().with_message_filter(vec![200]));
        let err = parser
            .parse_str("BO_ 100 A: 8 X\n SG_ S : 0|8 (bad,0) [0|1] s\n")
            .unwrap_err();
        assert!(matches!(err, DbcError::NumericLiteral { line: 2, .. }));
    }

    #[test]
    fn test_parse_reader() {
        let db = parse_dbc_reader(Cursor::new(TWO_MESSAGES)).unwrap();
        assert_eq!(db.stats().num_signals, 3);
    }

    #[test]
    fn test_parse_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(TWO_MESSAGES.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let db = parse_dbc_file(temp_file.path()).unwrap();
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_parse_latin1_file() {
        // 0xB0 is the degree sign in Latin-1 and invalid as a lone UTF-8 byte
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"BO_ 5 Climate: 8 HVAC\n SG_ Cabin : 7|8 (0.5,-40) [-40|87.5] \xB0C\n")
            .unwrap();
        temp_file.flush().unwrap();

        let db = parse_dbc_file(temp_file.path()).unwrap();
        let cabin = db.lookup(5).unwrap().signal("Cabin").unwrap();
        assert_eq!(cabin.description, "\u{B0}C");
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let text = "\u{feff}BO_ 1 A: 8 X\n SG_ S : 0|8 (1,0) [0|255] s\n";

        let db = parse_dbc_str(text).unwrap();
        assert!(db.lookup(1).unwrap().signal("S").is_some());

        let db = parse_dbc_reader(Cursor::new(text)).unwrap();
        assert_eq!(db.stats().num_signals, 1);

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(text.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        let db = parse_dbc_file(temp_file.path()).unwrap();
        assert_eq!(db.arbitration_ids(), vec![1]);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_dbc_file(Path::new("/nonexistent/definitely/missing.dbc")).unwrap_err();
        assert!(matches!(err, DbcError::Io(_)));
    }
}
