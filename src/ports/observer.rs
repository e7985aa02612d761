//! Observer port - progress reporting during training
//!
//! Observers receive training events without the trainer knowing whether they
//! draw a progress bar, write log lines or accumulate metrics.

use crate::{
    Result,
    pipeline::training::{EpisodeReport, TrainingSummary},
};

/// Observer for training runs.
///
/// Call order:
/// 1. `on_training_start(total_episodes)` once
/// 2. `on_episode_end(report)` after every finished episode, once its
///    learning update has been applied
/// 3. `on_training_end(summary)` once, also for runs stopped early
///
/// All methods default to doing nothing.
pub trait Observer {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    fn on_episode_end(&mut self, _report: &EpisodeReport) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        Ok(())
    }
}
