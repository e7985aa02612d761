//! Play command - A human at the terminal against a trained table

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use rand::{SeedableRng, random, rngs::StdRng};

use super::{Seat, load_agent};
use crate::{
    learning::ValueTable,
    pipeline::Arbiter,
    players::{HumanPlayer, LearningAgentPlayer},
    tictactoe::{GameStatus, Player, Trajectory},
};

#[derive(Parser, Debug)]
#[command(about = "Play against a trained agent")]
pub struct PlayArgs {
    /// Saved value table to play against
    #[arg(long)]
    pub agent: PathBuf,

    /// Seat of the human player
    #[arg(long, value_enum, default_value = "x")]
    pub human: Seat,

    /// Seed for the agent's tie-breaking
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Play one game on the given streams and return it
pub fn play_game<R: BufRead, W: Write>(
    table: &ValueTable,
    human_seat: Player,
    seed: u64,
    input: R,
    output: W,
) -> Result<Trajectory> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut agent = LearningAgentPlayer::greedy("agent", table, &mut rng);
    let mut human = HumanPlayer::new("you", input, output);
    let mut arbiter = Arbiter::new();

    let trajectory = match human_seat {
        Player::X => arbiter.play(&mut human, &mut agent)?,
        Player::O => arbiter.play(&mut agent, &mut human)?,
    };
    Ok(trajectory)
}

fn verdict(outcome: GameStatus, human_seat: Player) -> &'static str {
    match outcome {
        GameStatus::Win(winner) if winner == human_seat => "You win!",
        GameStatus::Win(_) => "The agent wins.",
        GameStatus::Draw | GameStatus::InProgress => "It's a draw.",
    }
}

pub fn execute(args: PlayArgs) -> Result<()> {
    let (table, _) = load_agent(&args.agent)?;
    let human_seat = Player::from(args.human);
    let seed = args.seed.unwrap_or_else(random);

    println!(
        "Loaded {} positions from {}. You play {human_seat}.",
        table.len(),
        args.agent.display()
    );
    println!("Cells are numbered 0-8 left to right, top to bottom.");

    let stdin = io::stdin();
    let trajectory = play_game(&table, human_seat, seed, stdin.lock(), io::stdout())
        .context("Game aborted")?;

    println!("\n{}\n", trajectory.final_state().board());
    println!("{}", verdict(trajectory.outcome(), human_seat));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::tictactoe::SymmetryMode;

    #[test]
    fn test_scripted_human_game_finishes() {
        let table = ValueTable::new(SymmetryMode::D4);
        // Enough distinct cells to cover any game as X
        let input = Cursor::new("0 0\n0 1\n0 2\n1 0\n1 1\n1 2\n2 0\n2 1\n2 2\n");
        let mut output = Vec::new();
        let trajectory = play_game(&table, Player::X, 3, input, &mut output).unwrap();
        assert!(trajectory.outcome().is_terminal());
        assert!(String::from_utf8(output).unwrap().contains("Enter your move"));
    }

    #[test]
    fn test_closed_input_aborts() {
        let table = ValueTable::default();
        let result = play_game(&table, Player::O, 1, Cursor::new(""), Vec::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_verdict() {
        assert_eq!(verdict(GameStatus::Win(Player::O), Player::O), "You win!");
        assert_eq!(verdict(GameStatus::Win(Player::X), Player::O), "The agent wins.");
        assert_eq!(verdict(GameStatus::Draw, Player::X), "It's a draw.");
    }
}
