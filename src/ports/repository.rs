//! Repository port for value-table persistence.

use std::path::Path;

use crate::{Result, learning::ValueTable};

/// Port for persisting and loading learned value tables.
///
/// Implementations must round-trip exactly: loading what was saved yields the
/// same fingerprints, the same values and the same symmetry mode.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use tictactoe_rl::{adapters::TextRepository, learning::ValueTable, ports::ValueTableRepository};
///
/// let repo = TextRepository::new();
/// let table = ValueTable::default();
/// repo.save(&table, Path::new("agent.tsv"))?;
/// let loaded = repo.load(Path::new("agent.tsv"))?;
/// assert_eq!(loaded, table);
/// # Ok::<(), tictactoe_rl::Error>(())
/// ```
pub trait ValueTableRepository {
    /// Save a table to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails.
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()>;

    /// Load a table from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are
    /// malformed. No partially loaded table is ever returned.
    fn load(&self, path: &Path) -> Result<ValueTable>;
}
