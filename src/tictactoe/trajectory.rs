//! Episode records produced by the arbiter

use serde::{Deserialize, Serialize};

use super::{
    board::Player,
    rules::{GameState, GameStatus, apply_move},
};
use crate::Result;

/// One applied move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub before: GameState,
    pub position: usize,
    pub after: GameState,
}

impl Transition {
    /// Player who made the move
    pub fn mover(&self) -> Player {
        self.before.to_move()
    }
}

/// Ordered transitions of a single episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trajectory {
    start: GameState,
    transitions: Vec<Transition>,
}

impl Trajectory {
    pub fn new(start: GameState) -> Self {
        Self {
            start,
            transitions: Vec::with_capacity(9),
        }
    }

    /// Rebuild a trajectory by replaying positions from the empty board.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidMove`] on the first illegal position.
    pub fn replay(moves: &[usize]) -> Result<Self> {
        let mut trajectory = Self::new(GameState::new());
        for &position in moves {
            let after = apply_move(&trajectory.final_state(), position)?;
            trajectory.record(position, after);
        }
        Ok(trajectory)
    }

    /// Append a transition leaving the current final state
    pub(crate) fn record(&mut self, position: usize, after: GameState) {
        let before = self.final_state();
        self.transitions.push(Transition {
            before,
            position,
            after,
        });
    }

    pub fn start(&self) -> GameState {
        self.start
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// State after the last recorded move (the start state when empty)
    pub fn final_state(&self) -> GameState {
        self.transitions
            .last()
            .map_or(self.start, |transition| transition.after)
    }

    pub fn outcome(&self) -> GameStatus {
        self.final_state().status()
    }

    /// Positions in play order
    pub fn moves(&self) -> Vec<usize> {
        self.transitions.iter().map(|t| t.position).collect()
    }

    /// Transitions made by `player`, in play order
    pub fn moves_by(&self, player: Player) -> impl Iterator<Item = &Transition> + '_ {
        self.transitions
            .iter()
            .filter(move |transition| transition.mover() == player)
    }
}
