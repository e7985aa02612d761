//! Observer implementations for training runs
//!
//! Observers allow composable reporting during training without coupling the
//! trainer to a terminal, a log file or a metrics sink.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use serde::{Deserialize, Serialize};

use super::training::{EpisodeReport, TrainingSummary};
use crate::{
    Result,
    ports::Observer,
    tictactoe::{GameStatus, Player},
};

/// Running X / O / draw tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    x_wins: usize,
    o_wins: usize,
    draws: usize,
}

impl Tally {
    fn add(&mut self, outcome: GameStatus) {
        match outcome {
            GameStatus::Win(Player::X) => self.x_wins += 1,
            GameStatus::Win(Player::O) => self.o_wins += 1,
            GameStatus::Draw | GameStatus::InProgress => self.draws += 1,
        }
    }

    fn message(&self) -> String {
        format!("X:{} O:{} D:{}", self.x_wins, self.o_wins, self.draws)
    }
}

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    tally: Tally,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            tally: Tally::default(),
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.tally.add(report.outcome);
        if let Some(pb) = &self.progress_bar {
            pb.set_position(report.episode as u64 + 1);
            if report.episode.is_multiple_of(64) {
                pb.set_message(format!(
                    "{} eps:{:.3}",
                    self.tally.message(),
                    report.exploration_rate
                ));
            }
        }
        Ok(())
    }

    fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            let message = self.tally.message();
            if summary.stopped {
                pb.abandon_with_message(format!("{message} (stopped)"));
            } else {
                pb.finish_with_message(message);
            }
        }
        Ok(())
    }
}

/// Writes a periodic `info!` line; the terminal-free counterpart of
/// [`ProgressObserver`].
pub struct LoggingObserver {
    interval: usize,
    total: usize,
    tally: Tally,
}

impl LoggingObserver {
    /// Log every `interval` episodes (at least 1)
    pub fn new(interval: usize) -> Self {
        Self {
            interval: interval.max(1),
            total: 0,
            tally: Tally::default(),
        }
    }
}

impl Observer for LoggingObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        self.total = total_episodes;
        self.tally = Tally::default();
        Ok(())
    }

    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.tally.add(report.outcome);
        let done = report.episode + 1;
        if done.is_multiple_of(self.interval) {
            info!(
                "episode {done}/{} after {:.1?}: {} exploration {:.3}",
                self.total,
                report.elapsed,
                self.tally.message(),
                report.exploration_rate
            );
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
#[derive(Debug, Default)]
pub struct MetricsObserver {
    tally: Tally,
    total_episodes: usize,
    total_moves: usize,
    last_exploration_rate: Option<f64>,
    elapsed: Duration,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn rate(&self, count: usize) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            count as f64 / self.total_episodes as f64
        }
    }

    /// Get average game length
    pub fn avg_game_length(&self) -> f64 {
        if self.total_episodes == 0 {
            0.0
        } else {
            self.total_moves as f64 / self.total_episodes as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_episodes: self.total_episodes,
            x_wins: self.tally.x_wins,
            o_wins: self.tally.o_wins,
            draws: self.tally.draws,
            x_win_rate: self.rate(self.tally.x_wins),
            o_win_rate: self.rate(self.tally.o_wins),
            draw_rate: self.rate(self.tally.draws),
            avg_game_length: self.avg_game_length(),
            final_exploration_rate: self.last_exploration_rate,
            elapsed_secs: self.elapsed.as_secs_f64(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_episodes: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    pub x_win_rate: f64,
    pub o_win_rate: f64,
    pub draw_rate: f64,
    pub avg_game_length: f64,
    pub final_exploration_rate: Option<f64>,
    pub elapsed_secs: f64,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
        self.total_episodes += 1;
        self.total_moves += report.moves;
        self.tally.add(report.outcome);
        self.last_exploration_rate = Some(report.exploration_rate);
        self.elapsed = report.elapsed;
        Ok(())
    }
}
