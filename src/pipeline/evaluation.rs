//! Head-to-head evaluation of an agent against a fixed opponent

use std::{fmt, path::Path, str::FromStr};

use log::info;
use serde::{Deserialize, Serialize};

use super::arbiter::Arbiter;
use crate::{
    Error, Result,
    ports::Agent,
    tictactoe::{GameStatus, Player},
};

/// Which seat the evaluated agent takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seats {
    AgentAsX,
    AgentAsO,
    /// X in even games, O in odd games
    #[default]
    Alternate,
}

impl Seats {
    fn agent_seat(self, game: usize) -> Player {
        match self {
            Seats::AgentAsX => Player::X,
            Seats::AgentAsO => Player::O,
            Seats::Alternate if game.is_multiple_of(2) => Player::X,
            Seats::Alternate => Player::O,
        }
    }
}

impl fmt::Display for Seats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seats::AgentAsX => write!(f, "x"),
            Seats::AgentAsO => write!(f, "o"),
            Seats::Alternate => write!(f, "alternate"),
        }
    }
}

impl FromStr for Seats {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Seats::AgentAsX),
            "o" => Ok(Seats::AgentAsO),
            "alternate" | "both" => Ok(Seats::Alternate),
            other => Err(Error::InvalidConfiguration {
                message: format!("unknown seating '{other}' (expected 'x', 'o' or 'alternate')"),
            }),
        }
    }
}

/// Wins, draws and losses from one side's point of view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
}

impl Record {
    pub fn games(&self) -> usize {
        self.wins + self.draws + self.losses
    }

    fn add(&mut self, outcome: GameStatus, seat: Player) {
        match outcome {
            GameStatus::Win(winner) if winner == seat => self.wins += 1,
            GameStatus::Win(_) => self.losses += 1,
            GameStatus::Draw | GameStatus::InProgress => self.draws += 1,
        }
    }
}

/// Result of an evaluation run, counted for the evaluated agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub agent: String,
    pub opponent: String,
    pub seats: Seats,
    pub games: usize,
    pub wins: usize,
    pub draws: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub draw_rate: f64,
    pub loss_rate: f64,
    /// Games played as X
    pub as_x: Record,
    /// Games played as O
    pub as_o: Record,
}

impl EvaluationResult {
    fn new(agent: &str, opponent: &str, seats: Seats, as_x: Record, as_o: Record) -> Self {
        let games = as_x.games() + as_o.games();
        let wins = as_x.wins + as_o.wins;
        let draws = as_x.draws + as_o.draws;
        let losses = as_x.losses + as_o.losses;
        let rate = |count: usize| {
            if games > 0 {
                count as f64 / games as f64
            } else {
                0.0
            }
        };

        Self {
            agent: agent.to_string(),
            opponent: opponent.to_string(),
            seats,
            games,
            wins,
            draws,
            losses,
            win_rate: rate(wins),
            draw_rate: rate(draws),
            loss_rate: rate(losses),
            as_x,
            as_o,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Play `games` games between `agent` and `opponent` without learning.
///
/// # Errors
///
/// Any arbiter error (including an illegal move) aborts the evaluation.
pub fn evaluate<A, B>(
    agent: &mut A,
    opponent: &mut B,
    games: usize,
    seats: Seats,
) -> Result<EvaluationResult>
where
    A: Agent + ?Sized,
    B: Agent + ?Sized,
{
    let mut arbiter = Arbiter::new();
    let mut as_x = Record::default();
    let mut as_o = Record::default();

    for game in 0..games {
        let seat = seats.agent_seat(game);
        let trajectory = match seat {
            Player::X => arbiter.play(&mut *agent, &mut *opponent)?,
            Player::O => arbiter.play(&mut *opponent, &mut *agent)?,
        };
        match seat {
            Player::X => as_x.add(trajectory.outcome(), seat),
            Player::O => as_o.add(trajectory.outcome(), seat),
        }
    }

    let result = EvaluationResult::new(agent.name(), opponent.name(), seats, as_x, as_o);
    info!(
        "{} vs {}: {} games, W {} / D {} / L {}",
        result.agent, result.opponent, result.games, result.wins, result.draws, result.losses
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::players::{MinimaxPlayer, RandomPlayer};

    #[test]
    fn test_minimax_self_evaluation_is_all_draws() {
        let mut a = MinimaxPlayer::new("a");
        let mut b = MinimaxPlayer::new("b");
        let result = evaluate(&mut a, &mut b, 4, Seats::Alternate).unwrap();
        assert_eq!(result.draws, 4);
        assert_eq!(result.as_x.games(), 2);
        assert_eq!(result.as_o.games(), 2);
        assert_eq!(result.draw_rate, 1.0);
    }

    #[test]
    fn test_fixed_seat_counts() {
        let mut minimax = MinimaxPlayer::new("minimax");
        let mut random = RandomPlayer::with_seed("random", 4);
        let result = evaluate(&mut minimax, &mut random, 30, Seats::AgentAsO).unwrap();
        assert_eq!(result.as_x.games(), 0);
        assert_eq!(result.as_o.games(), 30);
        assert_eq!(result.losses, 0);
        assert!((result.win_rate + result.draw_rate + result.loss_rate - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_result_json_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("eval.json");
        let mut a = RandomPlayer::with_seed("a", 1);
        let mut b = RandomPlayer::with_seed("b", 2);
        let result = evaluate(&mut a, &mut b, 10, Seats::Alternate).unwrap();
        result.save(&path).unwrap();
        assert_eq!(EvaluationResult::load(&path).unwrap(), result);
    }

    #[test]
    fn test_seats_parse() {
        assert_eq!("X".parse::<Seats>().unwrap(), Seats::AgentAsX);
        assert_eq!("both".parse::<Seats>().unwrap(), Seats::Alternate);
        assert!("middle".parse::<Seats>().is_err());
    }
}
