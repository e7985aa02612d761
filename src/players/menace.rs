//! MENACE: the Matchbox Educable Noughts And Crosses Engine
//!
//! One matchbox per canonical position, holding beads for each free cell.
//! Moves are drawn with probability proportional to bead counts and, after the
//! game, every bead drawn is reinforced by the result.

use std::collections::{BTreeMap, HashMap};

use log::warn;
use rand::{Rng, SeedableRng, random, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::Agent,
    tictactoe::{GameState, Player, Trajectory},
};

/// Bead changes applied after a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReinforcementValues {
    pub win: i16,
    pub draw: i16,
    pub loss: i16,
}

impl Default for ReinforcementValues {
    fn default() -> Self {
        // Michie's original values
        ReinforcementValues {
            win: 3,
            draw: 1,
            loss: -1,
        }
    }
}

/// Beads for one canonical position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchbox {
    /// Canonical move -> bead count, ordered for deterministic sampling
    beads: BTreeMap<usize, u32>,
    /// Count every move starts with and is restocked to
    base_beads: u32,
}

impl Matchbox {
    /// Fresh matchbox for a position with the given free cells.
    ///
    /// Each move starts with half the number of free cells (at least one).
    pub fn new(valid_moves: &[usize]) -> Self {
        let base_beads = (valid_moves.len() / 2).max(1) as u32;
        Matchbox {
            beads: valid_moves.iter().map(|&pos| (pos, base_beads)).collect(),
            base_beads,
        }
    }

    pub fn base_beads(&self) -> u32 {
        self.base_beads
    }

    pub fn bead_count(&self, position: usize) -> Option<u32> {
        self.beads.get(&position).copied()
    }

    pub fn total_beads(&self) -> u32 {
        self.beads.values().sum()
    }

    /// Draw a move with probability proportional to its beads
    pub fn sample_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        let total = self.total_beads();
        if total == 0 {
            return None;
        }
        let mut threshold = rng.random_range(0..total);
        for (&position, &count) in &self.beads {
            if threshold < count {
                return Some(position);
            }
            threshold -= count;
        }
        None
    }

    /// Add or remove beads for one move; an emptied box is restocked
    pub fn reinforce(&mut self, position: usize, delta: i16) {
        if let Some(count) = self.beads.get_mut(&position) {
            if delta >= 0 {
                *count = count.saturating_add(u32::from(delta.unsigned_abs()));
            } else {
                *count = count.saturating_sub(u32::from(delta.unsigned_abs()));
            }
        }

        if self.total_beads() == 0 {
            self.restock();
        }
    }

    /// Reset every move to the starting bead count
    pub fn restock(&mut self) {
        for count in self.beads.values_mut() {
            *count = self.base_beads;
        }
    }
}

/// Matchbox learner.
///
/// Matchboxes are created the first time a position is met. Learning uses
/// the finished trajectory, so no per-game bookkeeping is kept between
/// [`choose_move`](Agent::choose_move) and [`learn`](Agent::learn).
pub struct MenacePlayer {
    name: String,
    rng: StdRng,
    matchboxes: HashMap<String, Matchbox>,
    reinforcement: ReinforcementValues,
    games_trained: usize,
}

impl MenacePlayer {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_seed(name, random())
    }

    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::seed_from_u64(seed),
            matchboxes: HashMap::new(),
            reinforcement: ReinforcementValues::default(),
            games_trained: 0,
        }
    }

    pub fn with_reinforcement(mut self, reinforcement: ReinforcementValues) -> Self {
        self.reinforcement = reinforcement;
        self
    }

    pub fn matchbox_count(&self) -> usize {
        self.matchboxes.len()
    }

    pub fn games_trained(&self) -> usize {
        self.games_trained
    }

    /// Beads currently backing `position` in `state`, in board coordinates
    pub fn beads(&self, state: &GameState, position: usize) -> Option<u32> {
        let context = state.board().canonical_context();
        self.matchboxes
            .get(context.encoding())
            .and_then(|matchbox| matchbox.bead_count(context.map_move_to_canonical(position)))
    }
}

impl Agent for MenacePlayer {
    fn choose_move(&mut self, state: &GameState) -> Result<usize> {
        if state.legal_moves().is_empty() {
            return Err(Error::NoValidMoves);
        }

        let context = state.board().canonical_context();
        let matchbox = self
            .matchboxes
            .entry(context.encoding().to_string())
            .or_insert_with(|| Matchbox::new(&context.state.empty_positions()));

        if matchbox.total_beads() == 0 {
            warn!("{}: restocking empty matchbox {}", self.name, context.encoding());
            matchbox.restock();
        }

        let canonical_move = matchbox
            .sample_move(&mut self.rng)
            .ok_or(Error::NoValidMoves)?;
        Ok(context.map_canonical_to_original(canonical_move))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn learn(&mut self, trajectory: &Trajectory, role: Player) -> Result<()> {
        let delta = match trajectory.outcome().reward_for(role) {
            None => return Ok(()),
            Some(reward) if reward >= 1.0 => self.reinforcement.win,
            Some(reward) if reward <= 0.0 => self.reinforcement.loss,
            Some(_) => self.reinforcement.draw,
        };

        for transition in trajectory.moves_by(role) {
            let context = transition.before.board().canonical_context();
            if let Some(matchbox) = self.matchboxes.get_mut(context.encoding()) {
                matchbox.reinforce(context.map_move_to_canonical(transition.position), delta);
            }
        }

        self.games_trained += 1;
        Ok(())
    }
}
