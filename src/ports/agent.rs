//! Agent port - the capability every player implements

use crate::{
    Result,
    tictactoe::{GameState, Player, Trajectory},
};

/// Anything that can take a seat at the board.
///
/// The arbiter only ever calls [`choose_move`](Agent::choose_move) on a
/// non-terminal state where it is this agent's turn. Implementations include
/// the random and minimax baselines, the TD learning agent, the MENACE
/// matchbox learner and a human reading from a terminal.
///
/// # Examples
///
/// ```
/// use tictactoe_rl::{Result, ports::Agent, tictactoe::GameState};
///
/// /// Always takes the lowest free cell.
/// struct FirstFree;
///
/// impl Agent for FirstFree {
///     fn choose_move(&mut self, state: &GameState) -> Result<usize> {
///         state
///             .legal_moves()
///             .first()
///             .copied()
///             .ok_or(tictactoe_rl::Error::NoValidMoves)
///     }
///
///     fn name(&self) -> &str {
///         "first-free"
///     }
/// }
/// ```
pub trait Agent {
    /// Pick a position (0-8) for the player to move in `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if no move can be produced. Returning an illegal
    /// position is not an error here; the arbiter rejects it.
    fn choose_move(&mut self, state: &GameState) -> Result<usize>;

    /// Name used in logs and reports
    fn name(&self) -> &str;

    /// Called once a game has finished, with the seat this agent played.
    ///
    /// The default does nothing, which suits fixed policies.
    fn learn(&mut self, _trajectory: &Trajectory, _role: Player) -> Result<()> {
        Ok(())
    }
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn choose_move(&mut self, state: &GameState) -> Result<usize> {
        (**self).choose_move(state)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn learn(&mut self, trajectory: &Trajectory, role: Player) -> Result<()> {
        (**self).learn(trajectory, role)
    }
}
