//! Rules engine: legal moves, move application and terminal detection

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    board::{BoardState, Player},
    lines::LineAnalyzer,
};
use crate::error::{Error, InvalidMoveReason, Result};

/// Terminal status of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Win(Player),
    Draw,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Terminal reward seen from `perspective`: 1 win, 0 loss, 0.5 draw.
    ///
    /// Returns `None` while the game is still running.
    pub fn reward_for(self, perspective: Player) -> Option<f64> {
        match self {
            GameStatus::InProgress => None,
            GameStatus::Win(winner) if winner == perspective => Some(1.0),
            GameStatus::Win(_) => Some(0.0),
            GameStatus::Draw => Some(0.5),
        }
    }

    /// Compute the status of an arbitrary board
    pub fn of(board: &BoardState) -> Self {
        if let Some((winner, _)) = LineAnalyzer::completed_line(&board.cells) {
            GameStatus::Win(winner)
        } else if board.is_full() {
            GameStatus::Draw
        } else {
            GameStatus::InProgress
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "in progress"),
            GameStatus::Win(player) => write!(f, "{player} wins"),
            GameStatus::Draw => write!(f, "draw"),
        }
    }
}

/// A board together with its terminal status.
///
/// Values are only produced by [`GameState::new`], [`GameState::from_board`]
/// and [`apply_move`], so `status` always agrees with `board`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    board: BoardState,
    status: GameStatus,
}

impl GameState {
    /// Empty board, X to move
    pub fn new() -> Self {
        Self {
            board: BoardState::new(),
            status: GameStatus::InProgress,
        }
    }

    /// Wrap an existing board, recomputing its status
    pub fn from_board(board: BoardState) -> Self {
        Self {
            board,
            status: GameStatus::of(&board),
        }
    }

    /// Parse a board string (see [`BoardState::from_string`])
    pub fn parse(s: &str) -> Result<Self> {
        Ok(Self::from_board(BoardState::from_string(s)?))
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn to_move(&self) -> Player {
        self.board.to_move
    }

    /// Rules-engine shorthand for [`legal_moves`]
    pub fn legal_moves(&self) -> Vec<usize> {
        legal_moves(self)
    }

    /// Rules-engine shorthand for [`apply_move`]
    pub fn apply(&self, position: usize) -> Result<GameState> {
        apply_move(self, position)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}

/// Indices of empty cells while the game is running, nothing once it is over
pub fn legal_moves(state: &GameState) -> Vec<usize> {
    if state.is_terminal() {
        return Vec::new();
    }
    state.board.empty_positions()
}

/// Apply a move for the player to move and recompute the status.
///
/// # Errors
///
/// Returns [`Error::InvalidMove`] if the game is already decided, the position
/// is outside 0-8, or the cell is occupied.
pub fn apply_move(state: &GameState, position: usize) -> Result<GameState> {
    if state.is_terminal() {
        return Err(Error::invalid_move(position, InvalidMoveReason::GameOver));
    }

    let board = state.board.place(position)?;
    Ok(GameState::from_board(board))
}
