//! Temporal-difference policy and update rule over a [`ValueTable`]

use log::trace;
use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use super::{schedule::ExplorationSchedule, value_table::ValueTable};
use crate::{
    Error, Result,
    tictactoe::{GameState, Player, Trajectory},
};

/// Hyper-parameters of the TD learner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdConfig {
    /// Step size α of the value update
    pub learning_rate: f64,
    /// Exploration rate per episode
    pub schedule: ExplorationSchedule,
}

impl TdConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "learning rate must be in (0, 1], got {}",
                    self.learning_rate
                ),
            });
        }
        self.schedule.validate()
    }
}

impl Default for TdConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            schedule: ExplorationSchedule::default(),
        }
    }
}

/// Epsilon-greedy move choice.
///
/// With probability `exploration_rate` a legal move is drawn uniformly;
/// otherwise the move leading to the highest-valued afterstate for the mover
/// is taken, preferring the lowest index on ties.
///
/// # Errors
///
/// Returns [`Error::NoValidMoves`] when `state` has no legal move.
pub fn choose_move<R: Rng + ?Sized>(
    table: &ValueTable,
    state: &GameState,
    exploration_rate: f64,
    rng: &mut R,
) -> Result<usize> {
    let moves = state.legal_moves();
    if moves.is_empty() {
        return Err(Error::NoValidMoves);
    }

    if exploration_rate > 0.0 && rng.random::<f64>() < exploration_rate {
        return moves.choose(rng).copied().ok_or(Error::NoValidMoves);
    }

    greedy_among(table, state, &moves)
}

/// Highest-valued legal move with no exploration.
///
/// # Errors
///
/// Returns [`Error::NoValidMoves`] when `state` has no legal move.
pub fn greedy_move(table: &ValueTable, state: &GameState) -> Result<usize> {
    greedy_among(table, state, &state.legal_moves())
}

fn greedy_among(table: &ValueTable, state: &GameState, moves: &[usize]) -> Result<usize> {
    let mover = state.to_move();
    let mut best: Option<(usize, f64)> = None;
    for &position in moves {
        let after = state.apply(position)?;
        let value = table.value(&after, mover);
        if best.is_none_or(|(_, best_value)| value > best_value) {
            best = Some((position, value));
        }
    }
    best.map(|(position, _)| position).ok_or(Error::NoValidMoves)
}

/// Back up values for both players of a finished episode.
pub fn update(table: &mut ValueTable, trajectory: &Trajectory, learning_rate: f64) {
    update_for(table, trajectory, Player::X, learning_rate);
    update_for(table, trajectory, Player::O, learning_rate);
}

/// Back up values for the afterstates produced by `role` only.
///
/// The afterstates of `role` followed by the terminal state form a chain;
/// walking it backwards each state moves a fraction `learning_rate` towards
/// the value of its successor, both seen from `role`'s side.
pub fn update_for(table: &mut ValueTable, trajectory: &Trajectory, role: Player, learning_rate: f64) {
    let mut chain: Vec<GameState> = trajectory.moves_by(role).map(|t| t.after).collect();
    let final_state = trajectory.final_state();
    if final_state.is_terminal() && chain.last() != Some(&final_state) {
        chain.push(final_state);
    }

    for pair in chain.windows(2).rev() {
        let (state, next) = (&pair[0], &pair[1]);
        if state.is_terminal() {
            continue;
        }
        let current = table.value(state, role);
        let target = table.value(next, role);
        let updated = current + learning_rate * (target - current);
        trace!(
            "TD update {} for {role}: {current:.4} -> {updated:.4}",
            state.board().encode()
        );
        table.set(state, updated);
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::tictactoe::SymmetryMode;

    #[test]
    fn test_greedy_ties_take_lowest_index() {
        let table = ValueTable::new(SymmetryMode::None);
        assert_eq!(greedy_move(&table, &GameState::new()).unwrap(), 0);
    }

    #[test]
    fn test_greedy_takes_immediate_win() {
        let table = ValueTable::default();
        let state = GameState::parse("XX.OO....").unwrap();
        assert_eq!(greedy_move(&table, &state).unwrap(), 2);
    }

    #[test]
    fn test_full_exploration_still_returns_legal_moves() {
        let table = ValueTable::default();
        let state = GameState::parse("XOX.O....").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let position = choose_move(&table, &state, 1.0, &mut rng).unwrap();
            assert!(state.legal_moves().contains(&position));
        }
    }

    #[test]
    fn test_terminal_state_has_no_move() {
        let table = ValueTable::default();
        let state = GameState::parse("XXXOO....").unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            choose_move(&table, &state, 0.0, &mut rng),
            Err(Error::NoValidMoves)
        ));
    }

    #[test]
    fn test_win_backs_up_to_winner_afterstates() {
        // X: 0, 1, 2 wins along the top row; O: 3, 4
        let trajectory = Trajectory::replay(&[0, 3, 1, 4, 2]).unwrap();
        let mut table = ValueTable::new(SymmetryMode::None);
        update(&mut table, &trajectory, 0.5);

        let x_second = trajectory.transitions()[2].after;
        let x_first = trajectory.transitions()[0].after;
        let o_last = trajectory.transitions()[3].after;
        let o_first = trajectory.transitions()[1].after;

        // Processed from the end: 0.5 + 0.5 * (1.0 - 0.5)
        assert_eq!(table.stored_value(&x_second), 0.75);
        assert_eq!(table.stored_value(&x_first), 0.625);
        // O's last afterstate moves towards the loss
        assert_eq!(table.stored_value(&o_last), 0.25);
        assert_eq!(table.stored_value(&o_first), 0.375);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_update_for_touches_one_side() {
        let trajectory = Trajectory::replay(&[0, 3, 1, 4, 2]).unwrap();
        let mut table = ValueTable::new(SymmetryMode::None);
        update_for(&mut table, &trajectory, Player::O, 0.5);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.stored_value(&trajectory.transitions()[0].after),
            0.5
        );
    }

    #[test]
    fn test_draw_keeps_neutral_values() {
        let trajectory = Trajectory::replay(&[0, 4, 8, 1, 7, 6, 2, 5, 3]).unwrap();
        assert!(trajectory.outcome().is_terminal());
        let mut table = ValueTable::new(SymmetryMode::None);
        update(&mut table, &trajectory, 0.3);
        for transition in &trajectory.transitions()[..8] {
            assert_eq!(table.stored_value(&transition.after), 0.5);
        }
    }

    #[test]
    fn test_validate_rejects_bad_learning_rate() {
        let config = TdConfig {
            learning_rate: 0.0,
            ..TdConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(TdConfig::default().validate().is_ok());
    }
}
