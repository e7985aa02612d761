//! CLI infrastructure for the `tictactoe` binary
//!
//! This module provides the command-line interface for training, playing
//! against and evaluating value-table agents.

pub mod commands;
pub mod config;
pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use crate::logging::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "tictactoe")]
#[command(version, about = "Tic-Tac-Toe with a temporal-difference learning agent", long_about = None)]
pub struct Cli {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    /// Write log lines to this file instead of stdout
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a value table
    Train(Box<commands::train::TrainArgs>),

    /// Play against a trained agent
    Play(commands::play::PlayArgs),

    /// Evaluate a trained agent against a baseline
    Evaluate(commands::evaluate::EvaluateArgs),
}

/// Set up logging and dispatch to the chosen subcommand
pub fn run(cli: Cli) -> Result<()> {
    setup_logger(cli.log_level, cli.log_file.as_deref()).context("Failed to set up logging")?;

    match cli.command {
        Commands::Train(args) => commands::train::execute(*args),
        Commands::Play(args) => commands::play::execute(args),
        Commands::Evaluate(args) => commands::evaluate::execute(args),
    }
}
