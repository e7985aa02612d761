//! Subcommands of the `tictactoe` binary

pub mod evaluate;
pub mod play;
pub mod train;

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::{
    adapters::{MsgPackRepository, TextRepository},
    learning::{TrainingMetadata, ValueTable},
    ports::ValueTableRepository,
    tictactoe::Player,
};

/// Seat on the command line (`x` or `o`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Seat {
    X,
    O,
}

impl From<Seat> for Player {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::X => Player::X,
            Seat::O => Player::O,
        }
    }
}

fn is_msgpack(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("msgpack") || ext.eq_ignore_ascii_case("mpk"))
}

/// Load a saved table; MessagePack snapshots also return their metadata
pub(crate) fn load_agent(path: &Path) -> Result<(ValueTable, Option<TrainingMetadata>)> {
    if is_msgpack(path) {
        let snapshot = MsgPackRepository::new()
            .load_snapshot(path)
            .with_context(|| format!("Failed to load agent snapshot {}", path.display()))?;
        let table = snapshot
            .to_table()
            .with_context(|| format!("Invalid agent snapshot {}", path.display()))?;
        Ok((table, Some(snapshot.metadata)))
    } else {
        let table = TextRepository::new()
            .load(path)
            .with_context(|| format!("Failed to load value table {}", path.display()))?;
        Ok((table, None))
    }
}
