//! Concrete players implementing the [`Agent`](crate::ports::Agent) port

pub mod human;
pub mod learning;
pub mod menace;
pub mod minimax;
pub mod random;

pub use human::HumanPlayer;
pub use learning::LearningAgentPlayer;
pub use menace::{Matchbox, MenacePlayer, ReinforcementValues};
pub use minimax::MinimaxPlayer;
pub use random::RandomPlayer;
