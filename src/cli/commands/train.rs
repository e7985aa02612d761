//! Train command - Train a value table by self-play or against a fixed opponent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use super::{Seat, load_agent};
use crate::{
    adapters::repository_for_path,
    cli::{
        config::load_training_config,
        output::{print_kv, print_section, print_training_summary},
    },
    learning::{ExplorationSchedule, ValueTable},
    pipeline::{LoggingObserver, OpponentKind, ProgressObserver, Trainer, TrainingConfig},
    tictactoe::SymmetryMode,
};

#[derive(Parser, Debug)]
#[command(about = "Train a value table", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Number of training episodes
    #[arg(long, short = 'n')]
    pub episodes: Option<usize>,

    /// Step size of the TD update, in (0, 1]
    #[arg(long, short = 'a')]
    pub learning_rate: Option<f64>,

    /// Exploration schedule: `0.1`, `linear:START,END,EPISODES` or `exp:START,DECAY,MIN`
    #[arg(long, short = 'e')]
    pub exploration: Option<ExplorationSchedule>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Opponent to train against (self, random or minimax)
    #[arg(long, short = 'o')]
    pub opponent: Option<OpponentKind>,

    /// Seat of the learner against a fixed opponent
    #[arg(long, value_enum)]
    pub agent_player: Option<Seat>,

    /// State fingerprinting for a fresh table (d4 or none)
    #[arg(long)]
    pub symmetry: Option<SymmetryMode>,

    /// Where to save the trained table (`.msgpack` for a binary snapshot)
    #[arg(long, short = 'O', default_value = "value_table.tsv")]
    pub output: PathBuf,

    /// Continue training a previously saved table
    #[arg(long)]
    pub resume: Option<PathBuf>,

    /// Save the table to the output path every N episodes
    #[arg(long)]
    pub checkpoint_every: Option<usize>,

    /// JSON training configuration; flags override its fields
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

impl TrainArgs {
    /// Merge the config file (if any) with the command-line overrides
    pub fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => load_training_config(path)?,
            None => TrainingConfig::default(),
        };

        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        if let Some(exploration) = self.exploration {
            config.exploration = exploration;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(opponent) = self.opponent {
            config.opponent = opponent;
        }
        if let Some(seat) = self.agent_player {
            config.agent_player = seat.into();
        }
        if let Some(symmetry) = self.symmetry {
            config.symmetry = symmetry;
        }
        if let Some(every) = self.checkpoint_every {
            config.checkpoint_every = Some(every);
        }

        config.validate().context("Invalid training configuration")?;
        Ok(config)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let mut config = args.training_config()?;

    // Episodes already behind a resumed table, when its file records them
    let mut prior_episodes = 0;
    let mut table = match &args.resume {
        Some(path) => {
            let (table, metadata) = load_agent(path)?;
            prior_episodes = metadata.and_then(|m| m.episodes).unwrap_or(0);
            info!(
                "resuming from {} ({} entries, {prior_episodes} episodes)",
                path.display(),
                table.len()
            );
            if table.symmetry() != config.symmetry {
                warn!(
                    "{} uses symmetry {}; ignoring configured {}",
                    path.display(),
                    table.symmetry(),
                    config.symmetry
                );
                config.symmetry = table.symmetry();
            }
            table
        }
        None => ValueTable::new(config.symmetry),
    };

    let mut trainer = Trainer::new(config)?;
    let config = trainer.config().clone();

    print_section("Training Configuration");
    print_kv("Episodes", &config.episodes.to_string());
    print_kv("Opponent", &config.opponent.to_string());
    if config.opponent != OpponentKind::SelfPlay {
        print_kv("Agent plays", &config.agent_player.to_string());
    }
    print_kv("Learning rate", &config.learning_rate.to_string());
    print_kv("Exploration", &config.exploration.to_string());
    print_kv("Symmetry", &config.symmetry.to_string());
    print_kv("Seed", &trainer.seed().to_string());
    print_kv("Output", &args.output.display().to_string());

    if !args.no_progress {
        trainer = trainer.with_observer(Box::new(ProgressObserver::new()));
    }
    trainer = trainer.with_observer(Box::new(LoggingObserver::new(
        (config.episodes / 10).max(1),
    )));
    if config.checkpoint_every.is_some() {
        let repository = repository_for_path(
            &args.output,
            config.metadata(prior_episodes + config.episodes),
        );
        trainer = trainer.with_checkpoints(repository, args.output.clone());
    }

    let summary = trainer.train(&mut table)?;
    print_training_summary(&summary);

    repository_for_path(&args.output, config.metadata(prior_episodes + summary.episodes))
        .save(&table, &args.output)
        .with_context(|| format!("Failed to save value table to {}", args.output.display()))?;
    println!("\nSaved value table to: {}", args.output.display());

    Ok(())
}
