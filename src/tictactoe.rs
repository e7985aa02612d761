//! Tic-Tac-Toe game implementation

pub mod board;
pub mod lines;
pub mod rules;
pub mod symmetry;
pub mod trajectory;

pub use board::{BOARD_CELLS, BoardState, CanonicalContext, Cell, Player};
pub use lines::{LineAnalyzer, WINNING_LINES};
pub use rules::{GameState, GameStatus, apply_move, legal_moves};
pub use symmetry::{D4Transform, SymmetryMode};
pub use trajectory::{Trajectory, Transition};
