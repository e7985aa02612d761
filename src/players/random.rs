//! Uniform random baseline

use rand::{Rng, SeedableRng, random, rngs::StdRng};

use crate::{Error, Result, ports::Agent, tictactoe::GameState};

/// Random policy player (baseline)
pub struct RandomPlayer {
    name: String,
    rng: StdRng,
}

impl RandomPlayer {
    /// Create a random player seeded from system entropy
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_seed(name, random())
    }

    /// Create a random player with a deterministic seed
    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomPlayer {
    fn choose_move(&mut self, state: &GameState) -> Result<usize> {
        let moves = state.legal_moves();
        if moves.is_empty() {
            return Err(Error::NoValidMoves);
        }
        let index = self.rng.random_range(0..moves.len());
        Ok(moves[index])
    }

    fn name(&self) -> &str {
        &self.name
    }
}
