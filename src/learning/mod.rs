//! Tabular temporal-difference learning
//!
//! The agent keeps a [`ValueTable`] of afterstate values and plays
//! epsilon-greedily against it ([`td::choose_move`]). After each episode the
//! values are backed up along every player's own afterstates ([`td::update`]).

pub mod schedule;
pub mod serialization;
pub mod td;
pub mod value_table;

pub use schedule::ExplorationSchedule;
pub use serialization::{SavedAgent, TrainingMetadata, read_text, write_text};
pub use td::{TdConfig, choose_move, greedy_move, update, update_for};
pub use value_table::{DEFAULT_VALUE, ValueTable};
