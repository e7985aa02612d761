//! Evaluate command - Measure a trained table against a baseline opponent

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use rand::{SeedableRng, random, rngs::StdRng};

use super::load_agent;
use crate::{
    cli::output::{print_evaluation, print_kv, print_metadata, print_section},
    pipeline::{EvaluationResult, OpponentKind, Seats, evaluate},
    players::{LearningAgentPlayer, MinimaxPlayer, RandomPlayer},
    ports::Agent,
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a trained agent")]
pub struct EvaluateArgs {
    /// Saved value table to evaluate
    #[arg(long)]
    pub agent: PathBuf,

    /// Opponent to evaluate against (random or minimax)
    #[arg(long, short = 'o', default_value = "random")]
    pub opponent: OpponentKind,

    /// Number of evaluation games
    #[arg(long, short = 'g', default_value_t = 1000)]
    pub games: usize,

    /// Seat of the agent: x, o or alternate
    #[arg(long, default_value = "alternate")]
    pub seats: Seats,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export results to a JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let (table, metadata) = load_agent(&args.agent)?;

    print_section("Loaded Agent");
    print_kv("File", &args.agent.display().to_string());
    print_kv("Table entries", &table.len().to_string());
    if let Some(metadata) = &metadata {
        print_metadata(metadata);
    }

    let seed = args.seed.unwrap_or_else(random);
    let mut opponent: Box<dyn Agent> = match args.opponent {
        OpponentKind::Random => Box::new(RandomPlayer::with_seed("random", seed.wrapping_add(1))),
        OpponentKind::Minimax => Box::new(MinimaxPlayer::new("minimax")),
        OpponentKind::SelfPlay => {
            bail!("Cannot evaluate against 'self'; choose 'random' or 'minimax'")
        }
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let mut agent = LearningAgentPlayer::greedy("agent", &table, &mut rng);
    let result = evaluate(&mut agent, &mut *opponent, args.games, args.seats)?;
    print_evaluation(&result);

    if let Some(path) = &args.export {
        export_results(&result, path)?;
        println!("\nResults exported to: {}", path.display());
    }

    Ok(())
}

fn export_results(result: &EvaluationResult, path: &Path) -> Result<()> {
    result
        .save(path)
        .with_context(|| format!("Failed to export results to {}", path.display()))
}
