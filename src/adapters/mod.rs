//! Adapters implementing domain ports.
//!
//! This module contains infrastructure implementations of the traits defined
//! in the ports module. Following hexagonal architecture, adapters depend on
//! domain ports, not the other way around.

use std::{
    io::{BufWriter, Write},
    path::Path,
};

use tempfile::NamedTempFile;

use crate::{Result, error::Error, learning::TrainingMetadata, ports::ValueTableRepository};

pub mod in_memory_repository;
pub mod msgpack_repository;
pub mod text_repository;

pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
pub use text_repository::TextRepository;

/// Pick a repository from the file extension: `.msgpack`/`.mpk` get the
/// binary snapshot format, anything else the text format.
///
/// `metadata` is only written by formats that carry it.
pub fn repository_for_path(
    path: &Path,
    metadata: TrainingMetadata,
) -> Box<dyn ValueTableRepository> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("msgpack" | "mpk") => Box::new(MsgPackRepository::with_metadata(metadata)),
        _ => Box::new(TextRepository::new()),
    }
}

/// Write `path` through a sibling temporary file that replaces it only once
/// `write` has succeeded, so an interrupted save keeps the previous file.
pub(crate) fn save_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(|source| Error::Io {
        operation: format!("create temporary file in {dir:?}"),
        source,
    })?;

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }

    file.persist(path).map_err(|e| Error::Io {
        operation: format!("replace file {path:?}"),
        source: e.error,
    })?;
    Ok(())
}
