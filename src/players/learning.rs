//! Player backed by a learned value table

use rand::Rng;

use crate::{
    Result,
    learning::{ValueTable, td},
    ports::Agent,
    tictactoe::GameState,
};

/// Epsilon-greedy TD policy over a borrowed [`ValueTable`].
///
/// The table is only read here; updates happen after the episode, once the
/// player has been dropped and the table can be borrowed mutably. The RNG is
/// borrowed too, so one generator can drive many episodes.
pub struct LearningAgentPlayer<'a, R: Rng + ?Sized> {
    name: String,
    table: &'a ValueTable,
    rng: &'a mut R,
    exploration_rate: f64,
}

impl<'a, R: Rng + ?Sized> LearningAgentPlayer<'a, R> {
    pub fn new(
        name: impl Into<String>,
        table: &'a ValueTable,
        rng: &'a mut R,
        exploration_rate: f64,
    ) -> Self {
        Self {
            name: name.into(),
            table,
            rng,
            exploration_rate,
        }
    }

    /// Pure exploitation, as used when playing a trained agent
    pub fn greedy(name: impl Into<String>, table: &'a ValueTable, rng: &'a mut R) -> Self {
        Self::new(name, table, rng, 0.0)
    }

    pub fn exploration_rate(&self) -> f64 {
        self.exploration_rate
    }
}

impl<R: Rng + ?Sized> Agent for LearningAgentPlayer<'_, R> {
    fn choose_move(&mut self, state: &GameState) -> Result<usize> {
        td::choose_move(self.table, state, self.exploration_rate, &mut *self.rng)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::tictactoe::{SymmetryMode, Trajectory};

    #[test]
    fn test_greedy_player_follows_table() {
        let mut table = ValueTable::new(SymmetryMode::D4);
        // Teach that the centre opening wins for X
        let trajectory = Trajectory::replay(&[4, 0, 2, 1, 6]).unwrap();
        for _ in 0..10 {
            td::update(&mut table, &trajectory, 0.5);
        }

        let mut rng = StdRng::seed_from_u64(1);
        let mut player = LearningAgentPlayer::greedy("td", &table, &mut rng);
        assert_eq!(player.choose_move(&GameState::new()).unwrap(), 4);
        assert_eq!(player.exploration_rate(), 0.0);
    }
}
