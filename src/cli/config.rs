//! Training configuration files for CLI commands
//!
//! A config file is a JSON rendering of [`TrainingConfig`]; missing fields take
//! their defaults and command-line flags override whatever the file sets.

use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};

use crate::pipeline::TrainingConfig;

/// Read a [`TrainingConfig`] from a JSON file and validate it
pub fn load_training_config(path: &Path) -> Result<TrainingConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open config file {}", path.display()))?;
    let config: TrainingConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

/// Write `config` as pretty-printed JSON
pub fn save_training_config(config: &TrainingConfig, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create config file {}", path.display()))?;
    serde_json::to_writer_pretty(file, config)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}
