//! tictactoe CLI - train, play against and evaluate TD value tables

use anyhow::Result;
use clap::Parser;
use tictactoe_rl::cli::{Cli, run};

fn main() -> Result<()> {
    run(Cli::parse())
}
