//! Game loop, training and evaluation pipeline
//!
//! This module provides:
//! - The arbiter that plays one episode between two agents
//! - The TD trainer with observers, checkpoints and cooperative stopping
//! - Head-to-head evaluation against fixed opponents
//! - Observers for progress bars, log lines and metrics

pub mod arbiter;
pub mod evaluation;
pub mod observers;
pub mod training;

pub use arbiter::{Arbiter, MatchPhase};
pub use evaluation::{EvaluationResult, Record, Seats, evaluate};
pub use observers::{LoggingObserver, MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{
    EpisodeReport, OpponentKind, StopHandle, Trainer, TrainingConfig, TrainingSummary, train_new,
};

pub use crate::ports::{Agent, Observer};
