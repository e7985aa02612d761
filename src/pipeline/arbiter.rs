//! Game loop: alternates two agents through the rules engine

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::Agent,
    tictactoe::{GameState, GameStatus, Player, Trajectory, apply_move},
};

/// Where the arbiter is in the current match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    NotStarted,
    InProgress,
    /// Absorbing: `Win(X)`, `Win(O)` or `Draw`
    Finished(GameStatus),
}

impl fmt::Display for MatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPhase::NotStarted => write!(f, "not started"),
            MatchPhase::InProgress => write!(f, "in progress"),
            MatchPhase::Finished(status) => write!(f, "finished ({status})"),
        }
    }
}

/// Runs episodes between two agents.
///
/// Each call to [`play`](Self::play) starts a new match. An illegal move or
/// an agent error aborts the match and is returned unchanged; the phase then
/// stays [`MatchPhase::InProgress`] until the next match starts.
#[derive(Debug, Clone)]
pub struct Arbiter {
    phase: MatchPhase,
}

impl Arbiter {
    pub fn new() -> Self {
        Self {
            phase: MatchPhase::NotStarted,
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    /// Play a full game from the empty board, `x` moving first
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidMove`] if an agent picks an illegal
    /// position, or whatever error an agent reports.
    pub fn play<X, O>(&mut self, x: &mut X, o: &mut O) -> Result<Trajectory>
    where
        X: Agent + ?Sized,
        O: Agent + ?Sized,
    {
        self.play_from(GameState::new(), x, o)
    }

    /// Play on from a preset position until the game ends
    pub fn play_from<X, O>(&mut self, start: GameState, x: &mut X, o: &mut O) -> Result<Trajectory>
    where
        X: Agent + ?Sized,
        O: Agent + ?Sized,
    {
        self.phase = MatchPhase::InProgress;
        let mut trajectory = Trajectory::new(start);
        let mut state = start;

        while !state.is_terminal() {
            let mover = state.to_move();
            let position = match mover {
                Player::X => x.choose_move(&state)?,
                Player::O => o.choose_move(&state)?,
            };
            let next = apply_move(&state, position)?;
            debug!(
                "{} ({mover}) plays {position} -> {}",
                match mover {
                    Player::X => x.name(),
                    Player::O => o.name(),
                },
                next.board().encode()
            );
            trajectory.record(position, next);
            state = next;
        }

        let outcome = state.status();
        debug!(
            "game over after {} moves: {outcome} ({} vs {})",
            trajectory.len(),
            x.name(),
            o.name()
        );
        self.phase = MatchPhase::Finished(outcome);
        Ok(trajectory)
    }

    /// Play a game, then let each agent learn from it with its own seat
    pub fn play_and_learn<X, O>(&mut self, x: &mut X, o: &mut O) -> Result<Trajectory>
    where
        X: Agent + ?Sized,
        O: Agent + ?Sized,
    {
        let trajectory = self.play(x, o)?;
        x.learn(&trajectory, Player::X)?;
        o.learn(&trajectory, Player::O)?;
        Ok(trajectory)
    }
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new()
    }
}
