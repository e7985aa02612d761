//! Text-file implementation of the value-table repository.

use std::{fs::File, io::BufReader, path::Path};

use super::save_atomically;
use crate::{
    Result,
    error::Error,
    learning::{ValueTable, read_text, write_text},
    ports::ValueTableRepository,
};

/// Line-oriented text files: a header naming the symmetry mode, then one
/// `<fingerprint>\t<value>` line per entry in fingerprint order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRepository;

impl TextRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ValueTableRepository for TextRepository {
    fn save(&self, table: &ValueTable, path: &Path) -> Result<()> {
        save_atomically(path, |writer| write_text(table, writer))
    }

    fn load(&self, path: &Path) -> Result<ValueTable> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        read_text(BufReader::new(file))
    }
}
