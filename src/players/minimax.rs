//! Exhaustive minimax player

use std::collections::HashMap;

use crate::{
    Error, Result,
    ports::Agent,
    tictactoe::{GameState, GameStatus, Player},
};

/// Optimal player (minimax over the full game tree).
///
/// Scores are from X's side: +1 X wins, -1 O wins, 0 draw. Positions are
/// memoised by their base-3 index, so the tree is solved once per player.
/// Among equally good moves the lowest index is played.
pub struct MinimaxPlayer {
    name: String,
    cache: HashMap<u32, i32>,
}

impl MinimaxPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache: HashMap::new(),
        }
    }

    /// Game-theoretic value of `state` under perfect play, from X's side
    pub fn value(&mut self, state: &GameState) -> i32 {
        let key = state.board().to_index();
        if let Some(&value) = self.cache.get(&key) {
            return value;
        }

        let value = match state.status() {
            GameStatus::Win(Player::X) => 1,
            GameStatus::Win(Player::O) => -1,
            GameStatus::Draw => 0,
            GameStatus::InProgress => {
                let maximizing = state.to_move() == Player::X;
                let mut best = if maximizing { i32::MIN } else { i32::MAX };
                for position in state.legal_moves() {
                    if let Ok(next) = state.apply(position) {
                        let child = self.value(&next);
                        best = if maximizing {
                            best.max(child)
                        } else {
                            best.min(child)
                        };
                    }
                }
                best
            }
        };

        self.cache.insert(key, value);
        value
    }

    /// Every legal move with the value of the position it leads to
    pub fn evaluate_moves(&mut self, state: &GameState) -> Vec<(usize, i32)> {
        let mut moves_with_values = Vec::new();
        for position in state.legal_moves() {
            if let Ok(next) = state.apply(position) {
                moves_with_values.push((position, self.value(&next)));
            }
        }
        moves_with_values
    }
}

impl Agent for MinimaxPlayer {
    fn choose_move(&mut self, state: &GameState) -> Result<usize> {
        let is_x = state.to_move() == Player::X;
        let mut best: Option<(usize, i32)> = None;
        for (position, value) in self.evaluate_moves(state) {
            let better = match best {
                None => true,
                Some((_, best_value)) if is_x => value > best_value,
                Some((_, best_value)) => value < best_value,
            };
            if better {
                best = Some((position, value));
            }
        }
        best.map(|(position, _)| position).ok_or(Error::NoValidMoves)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
