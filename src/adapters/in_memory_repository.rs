//! In-memory value-table repository for testing.
//!
//! Tables are kept in their text encoding, so a save/load cycle exercises the
//! same validation as a file on disk.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    Result,
    error::Error,
    learning::{ValueTable, read_text, write_text},
    ports::ValueTableRepository,
};

/// In-memory repository keyed by path.
///
/// Clones share the same storage, so a test can hand one clone to a trainer
/// and inspect the checkpoints through another.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use tictactoe_rl::{adapters::InMemoryRepository, learning::ValueTable, ports::ValueTableRepository};
///
/// let repo = InMemoryRepository::new();
/// repo.save(&ValueTable::default(), Path::new("checkpoint"))?;
/// assert!(repo.contains(Path::new("checkpoint")));
/// let loaded = repo.load(Path::new("checkpoint"))?;
/// assert!(loaded.is_empty());
/// # Ok::<(), tictactoe_rl::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    saves: Arc<Mutex<usize>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.storage
            .lock()
            .map_err(|_| Error::InvalidConfiguration {
                message: "in-memory repository lock poisoned".to_string(),
            })
    }

    /// Number of distinct paths currently stored
    pub fn count(&self) -> usize {
        self.storage().map(|storage| storage.len()).unwrap_or(0)
    }

    /// Total number of successful saves, including overwrites
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|saves| *saves).unwrap_or(0)
    }

    pub fn contains(&self, path: &Path) -> bool {
        let key = path.to_string_lossy().to_string();
        self.storage()
            .map(|storage| storage.contains_key(&key))
            .unwrap_or(false)
    }
}

impl ValueTableRepository for InMemoryRepository {
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()> {
        let mut bytes = Vec::new();
        write_text(table, &mut bytes)?;
        self.storage()?
            .insert(path.to_string_lossy().to_string(), bytes);
        if let Ok(mut saves) = self.saves.lock() {
            *saves += 1;
        }
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<ValueTable> {
        let key = path.to_string_lossy().to_string();
        let storage = self.storage()?;
        let bytes = storage.get(&key).ok_or_else(|| Error::Io {
            operation: format!("load value table from memory at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no table at this path"),
        })?;
        read_text(bytes.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tictactoe::{SymmetryMode, Trajectory};

    #[test]
    fn test_roundtrip_and_counts() {
        let repo = InMemoryRepository::new();
        let mut table = ValueTable::new(SymmetryMode::None);
        crate::learning::update(&mut table, &Trajectory::replay(&[0, 3, 1, 4, 2]).unwrap(), 0.2);

        repo.save(&table, Path::new("a")).unwrap();
        repo.save(&table, Path::new("a")).unwrap();
        assert_eq!(repo.count(), 1);
        assert_eq!(repo.save_count(), 2);
        assert_eq!(repo.load(Path::new("a")).unwrap(), table);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let repo = InMemoryRepository::new();
        assert!(repo.load(Path::new("missing")).is_err());
    }

    #[test]
    fn test_clones_share_storage() {
        let repo = InMemoryRepository::new();
        let clone = repo.clone();
        clone.save(&ValueTable::default(), Path::new("shared")).unwrap();
        assert!(repo.contains(Path::new("shared")));
    }
}
