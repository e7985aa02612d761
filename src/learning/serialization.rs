//! On-disk formats for value tables.
//!
//! Two formats are supported:
//! - a line-oriented text table, sorted by fingerprint, that diffs well and
//!   round-trips every value exactly;
//! - a MessagePack snapshot ([`SavedAgent`]) that also carries training
//!   metadata.

use std::io::{BufRead, Read, Write};

use serde::{Deserialize, Serialize};

use super::value_table::ValueTable;
use crate::{Error, Result, tictactoe::SymmetryMode};

/// First line of every text table, followed by the symmetry mode
pub const TEXT_HEADER_PREFIX: &str = "# tictactoe-rl value-table v1 symmetry=";

/// Information about how a saved table was produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Number of episodes trained
    pub episodes: Option<usize>,
    pub learning_rate: Option<f64>,
    /// Exploration schedule in its CLI form
    pub exploration: Option<String>,
    /// Random seed used (if any)
    pub seed: Option<u64>,
    /// Opponent trained against
    pub opponent: Option<String>,
    /// Timestamp when saved
    pub saved_at: Option<String>,
}

impl TrainingMetadata {
    /// Copy with `saved_at` set to the current UTC time
    pub fn stamped(mut self) -> Self {
        self.saved_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }
}

/// Versioned MessagePack snapshot of a value table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAgent {
    pub version: u32,
    pub symmetry: SymmetryMode,
    entries: Vec<(String, f64)>,
    pub metadata: TrainingMetadata,
}

impl SavedAgent {
    /// Current save format version
    pub const VERSION: u32 = 1;

    pub fn new(table: &ValueTable, metadata: TrainingMetadata) -> Self {
        Self {
            version: Self::VERSION,
            symmetry: table.symmetry(),
            entries: table
                .sorted_entries()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            metadata,
        }
    }

    /// Rebuild the table, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialization`] for an unsupported version or any
    /// invalid entry; for entries, `line` is the 1-based entry number.
    pub fn to_table(&self) -> Result<ValueTable> {
        if self.version != Self::VERSION {
            return Err(snapshot_error(format!(
                "unsupported save format version {}, expected {}",
                self.version,
                Self::VERSION
            )));
        }
        ValueTable::from_entries(self.symmetry, self.entries.iter().cloned())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| Error::SerializationContext {
            operation: "serialize value table to MessagePack".to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| snapshot_error(e.to_string()))
    }

    /// Decode a snapshot from a reader, as written by [`rmp_serde::encode::write`]
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        rmp_serde::decode::from_read(reader).map_err(|e| snapshot_error(e.to_string()))
    }
}

/// A corrupt or unsupported MessagePack snapshot
fn snapshot_error(message: String) -> Error {
    Error::Deserialization {
        line: 0,
        message: format!("MessagePack snapshot: {message}"),
    }
}

/// Write `table` in the text format.
///
/// Values use the shortest representation that parses back to the same
/// `f64`, so [`read_text`] restores the table exactly.
pub fn write_text<W: Write>(table: &ValueTable, mut writer: W) -> Result<()> {
    writeln!(writer, "{TEXT_HEADER_PREFIX}{}", table.symmetry())?;
    for (fingerprint, value) in table.sorted_entries() {
        writeln!(writer, "{fingerprint}\t{value}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a table written by [`write_text`].
///
/// Blank lines are skipped. Nothing is returned unless every line is valid.
///
/// # Errors
///
/// Returns [`Error::Deserialization`] with the 1-based line number of the
/// first problem: a bad header, a missing tab, an unparsable value, a value
/// outside `[0, 1]`, an invalid fingerprint or a duplicate key.
pub fn read_text<R: BufRead>(reader: R) -> Result<ValueTable> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(Error::Deserialization {
                line: 1,
                message: "empty input, expected header".to_string(),
            });
        }
    };
    let symmetry = header
        .trim_end()
        .strip_prefix(TEXT_HEADER_PREFIX)
        .ok_or_else(|| Error::Deserialization {
            line: 1,
            message: format!("expected header starting with '{TEXT_HEADER_PREFIX}'"),
        })?
        .parse::<SymmetryMode>()
        .map_err(|e| Error::Deserialization {
            line: 1,
            message: e.to_string(),
        })?;

    let mut parsed: Vec<(String, f64)> = Vec::new();
    let mut line_numbers: Vec<usize> = Vec::new();

    for (index, line) in lines.enumerate() {
        let line_number = index + 2;
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let malformed = |message: String| Error::Deserialization {
            line: line_number,
            message,
        };

        let (fingerprint, raw_value) = line
            .split_once('\t')
            .ok_or_else(|| malformed(format!("expected '<fingerprint>\\t<value>', got '{line}'")))?;
        let value: f64 = raw_value
            .trim()
            .parse()
            .map_err(|_| malformed(format!("'{raw_value}' is not a number")))?;

        parsed.push((fingerprint.to_string(), value));
        line_numbers.push(line_number);
    }

    // Entry numbers from validation map back to file lines
    ValueTable::from_entries(symmetry, parsed).map_err(|e| match e {
        Error::Deserialization { line, message } => Error::Deserialization {
            line: line_numbers.get(line - 1).copied().unwrap_or(line),
            message,
        },
        other => other,
    })
}
