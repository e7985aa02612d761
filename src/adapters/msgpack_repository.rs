//! MessagePack implementation of the value-table repository.
//!
//! This adapter implements the ValueTableRepository port using rmp_serde for
//! compact binary snapshots that also carry training metadata.

use std::{fs::File, io::BufReader, path::Path};

use super::save_atomically;
use crate::{
    Result,
    error::Error,
    learning::{SavedAgent, TrainingMetadata, ValueTable},
    ports::ValueTableRepository,
};

/// MessagePack-based repository.
///
/// Every save writes a [`SavedAgent`] snapshot stamped with the current time
/// and the metadata this repository was built with.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use tictactoe_rl::{
///     adapters::MsgPackRepository,
///     learning::{TrainingMetadata, ValueTable},
///     ports::ValueTableRepository,
/// };
///
/// let repo = MsgPackRepository::with_metadata(TrainingMetadata {
///     episodes: Some(1000),
///     ..TrainingMetadata::default()
/// });
/// repo.save(&ValueTable::default(), Path::new("trained.msgpack"))?;
///
/// let snapshot = repo.load_snapshot(Path::new("trained.msgpack"))?;
/// assert_eq!(snapshot.metadata.episodes, Some(1000));
/// # Ok::<(), tictactoe_rl::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MsgPackRepository {
    metadata: TrainingMetadata,
}

impl MsgPackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(metadata: TrainingMetadata) -> Self {
        Self { metadata }
    }

    /// Load the full snapshot, metadata included
    pub fn load_snapshot(&self, path: &Path) -> Result<SavedAgent> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        SavedAgent::from_reader(BufReader::new(file))
    }
}

impl ValueTableRepository for MsgPackRepository {
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()> {
        let snapshot = SavedAgent::new(table, self.metadata.clone().stamped());
        save_atomically(path, |mut writer| {
            rmp_serde::encode::write(&mut writer, &snapshot).map_err(|e| {
                Error::SerializationContext {
                    operation: "serialize value table to MessagePack".to_string(),
                    message: e.to_string(),
                }
            })
        })
    }

    fn load(&self, path: &Path) -> Result<ValueTable> {
        self.load_snapshot(path)?.to_table()
    }
}
