//! Error types for the tictactoe-rl crate

use std::fmt;

use thiserror::Error;

/// Why a move was rejected by the rules engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMoveReason {
    /// Position is not in 0-8
    OutOfBounds,
    /// Cell already holds a piece
    Occupied,
    /// The game has already been decided
    GameOver,
}

impl fmt::Display for InvalidMoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidMoveReason::OutOfBounds => write!(f, "out of bounds (must be 0-8)"),
            InvalidMoveReason::Occupied => write!(f, "already occupied"),
            InvalidMoveReason::GameOver => write!(f, "game already over"),
        }
    }
}

/// Main error type for the crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid move: position {position} is {reason}")]
    InvalidMove {
        position: usize,
        reason: InvalidMoveReason,
    },

    #[error("no valid moves available")]
    NoValidMoves,

    #[error("wrong board length: expected {expected} cells, got {got} in '{context}'")]
    InvalidBoardLength {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid character '{character}' at position {position} in '{context}'")]
    InvalidCellCharacter {
        character: char,
        position: usize,
        context: String,
    },

    #[error("invalid piece counts: X={x_count}, O={o_count} (must be equal or X ahead by 1)")]
    InvalidPieceCounts { x_count: usize, o_count: usize },

    #[error("invalid player '{player}' in label '{label}' (expected 'X' or 'O')")]
    InvalidPlayerString { player: String, label: String },

    #[error("board index {index} is out of range (must be below 3^9)")]
    InvalidBoardIndex { index: u32 },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A stored value table could not be read back. `line` is 1-based for
    /// text tables and 0 for MessagePack snapshots, which have no lines.
    #[error("malformed value table at line {line}: {message}")]
    Deserialization { line: usize, message: String },

    #[error("input closed before a move was entered")]
    InputClosed,

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Shorthand used by the rules engine
    pub(crate) fn invalid_move(position: usize, reason: InvalidMoveReason) -> Self {
        Error::InvalidMove { position, reason }
    }

    /// Whether this error reports an illegal move
    pub fn is_invalid_move(&self) -> bool {
        matches!(self, Error::InvalidMove { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
