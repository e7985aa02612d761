//! Tic-Tac-Toe engine with a temporal-difference learning agent
//!
//! This crate provides:
//! - A rules engine with base-3 state encoding and D4 symmetry reduction
//! - A tabular TD(0) value learner with epsilon-greedy exploration
//! - Baseline players (random, minimax, human, MENACE) behind one `Agent` trait
//! - A trainer with observers, checkpoints and cooperative stopping
//! - Text and MessagePack persistence for value tables
//!
//! ```
//! use tictactoe_rl::{
//!     pipeline::{Seats, TrainingConfig, evaluate, train_new},
//!     players::{LearningAgentPlayer, RandomPlayer},
//! };
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let (table, _) = train_new(TrainingConfig::default().with_episodes(200).with_seed(7))?;
//! let mut rng = StdRng::seed_from_u64(1);
//! let mut agent = LearningAgentPlayer::greedy("td", &table, &mut rng);
//! let mut random = RandomPlayer::with_seed("random", 2);
//! let result = evaluate(&mut agent, &mut random, 10, Seats::Alternate)?;
//! assert_eq!(result.games, 10);
//! # Ok::<(), tictactoe_rl::Error>(())
//! ```

pub mod adapters;
pub mod cli;
pub mod error;
pub mod learning;
pub mod logging;
pub mod pipeline;
pub mod players;
pub mod ports;
pub mod tictactoe;

pub use error::{Error, Result};
