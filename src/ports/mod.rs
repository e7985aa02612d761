//! Ports (trait boundaries) between the game core and its collaborators.
//!
//! Players, progress reporting and storage are all reached through these
//! traits; concrete implementations live in `players`, `pipeline::observers`
//! and `adapters`.

pub mod agent;
pub mod observer;
pub mod repository;

pub use agent::Agent;
pub use observer::Observer;
pub use repository::ValueTableRepository;
