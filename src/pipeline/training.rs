//! Training loop for the TD agent

use std::{
    fmt,
    path::PathBuf,
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use log::{info, warn};
use rand::{SeedableRng, random, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::arbiter::Arbiter;
use crate::{
    Error, Result,
    learning::{ExplorationSchedule, TdConfig, TrainingMetadata, ValueTable, td},
    players::{LearningAgentPlayer, MinimaxPlayer, RandomPlayer},
    ports::{Agent, Observer, ValueTableRepository},
    tictactoe::{GameStatus, Player, SymmetryMode, Trajectory},
};

/// Who the learner plays against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpponentKind {
    /// Both seats share the table being learned
    #[default]
    SelfPlay,
    Random,
    Minimax,
}

impl OpponentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OpponentKind::SelfPlay => "self",
            OpponentKind::Random => "random",
            OpponentKind::Minimax => "minimax",
        }
    }
}

impl fmt::Display for OpponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpponentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self" | "self-play" | "self_play" | "selfplay" => Ok(OpponentKind::SelfPlay),
            "random" => Ok(OpponentKind::Random),
            "minimax" | "optimal" => Ok(OpponentKind::Minimax),
            other => Err(Error::InvalidConfiguration {
                message: format!(
                    "unknown opponent '{other}' (expected 'self', 'random' or 'minimax')"
                ),
            }),
        }
    }
}

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of episodes to play
    pub episodes: usize,

    /// Step size α of the TD update
    pub learning_rate: f64,

    /// Exploration rate per episode
    pub exploration: ExplorationSchedule,

    /// Random seed; drawn from entropy when absent
    pub seed: Option<u64>,

    pub opponent: OpponentKind,

    /// Seat of the learner when the opponent is fixed
    pub agent_player: Player,

    /// Fingerprinting used by freshly created tables
    pub symmetry: SymmetryMode,

    /// Save the table every N episodes (needs a checkpoint target)
    pub checkpoint_every: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let td = TdConfig::default();
        Self {
            episodes: 20_000,
            learning_rate: td.learning_rate,
            exploration: td.schedule,
            seed: None,
            opponent: OpponentKind::SelfPlay,
            agent_player: Player::X,
            symmetry: SymmetryMode::D4,
            checkpoint_every: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_exploration(mut self, exploration: ExplorationSchedule) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_opponent(mut self, opponent: OpponentKind) -> Self {
        self.opponent = opponent;
        self
    }

    pub fn with_agent_player(mut self, agent_player: Player) -> Self {
        self.agent_player = agent_player;
        self
    }

    pub fn with_symmetry(mut self, symmetry: SymmetryMode) -> Self {
        self.symmetry = symmetry;
        self
    }

    pub fn with_checkpoint_every(mut self, checkpoint_every: usize) -> Self {
        self.checkpoint_every = Some(checkpoint_every);
        self
    }

    pub fn td_config(&self) -> TdConfig {
        TdConfig {
            learning_rate: self.learning_rate,
            schedule: self.exploration,
        }
    }

    /// Check ranges of every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        self.td_config().validate()?;
        if self.checkpoint_every == Some(0) {
            return Err(Error::InvalidConfiguration {
                message: "checkpoint interval must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Metadata describing a table trained with this configuration
    pub fn metadata(&self, episodes: usize) -> TrainingMetadata {
        TrainingMetadata {
            episodes: Some(episodes),
            learning_rate: Some(self.learning_rate),
            exploration: Some(self.exploration.to_string()),
            seed: self.seed,
            opponent: Some(self.opponent.to_string()),
            saved_at: None,
        }
    }
}

/// What observers learn about each finished episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    /// 0-based episode index
    pub episode: usize,
    pub outcome: GameStatus,
    /// Exploration rate used during the episode
    pub exploration_rate: f64,
    /// Number of moves played
    pub moves: usize,
    /// Time since training started
    pub elapsed: Duration,
}

/// Result of a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Episodes actually completed
    pub episodes: usize,
    pub x_wins: usize,
    pub o_wins: usize,
    pub draws: usize,
    /// Entries in the value table at the end of the run
    pub table_size: usize,
    pub elapsed: Duration,
    /// Whether the run ended early through a [`StopHandle`]
    pub stopped: bool,
}

impl TrainingSummary {
    pub fn wins_for(&self, player: Player) -> usize {
        match player {
            Player::X => self.x_wins,
            Player::O => self.o_wins,
        }
    }

    pub fn draw_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.draws as f64 / self.episodes as f64
        }
    }

    fn record(&mut self, outcome: GameStatus) {
        self.episodes += 1;
        match outcome {
            GameStatus::Win(Player::X) => self.x_wins += 1,
            GameStatus::Win(Player::O) => self.o_wins += 1,
            GameStatus::Draw | GameStatus::InProgress => self.draws += 1,
        }
    }
}

/// Cooperative cancellation, checked between episodes
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where periodic checkpoints go
struct CheckpointTarget {
    repository: Box<dyn ValueTableRepository>,
    path: PathBuf,
}

/// Trains a [`ValueTable`] by playing episodes through the [`Arbiter`].
pub struct Trainer {
    config: TrainingConfig,
    seed: u64,
    observers: Vec<Box<dyn Observer>>,
    stop: StopHandle,
    checkpoint: Option<CheckpointTarget>,
    custom_opponent: Option<Box<dyn Agent>>,
}

impl Trainer {
    /// Create a trainer, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for out-of-range parameters.
    pub fn new(mut config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(random);
        config.seed = Some(seed);
        Ok(Self {
            config,
            seed,
            observers: Vec::new(),
            stop: StopHandle::new(),
            checkpoint: None,
            custom_opponent: None,
        })
    }

    /// Add an observer to the trainer
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Save the table to `path` every `checkpoint_every` episodes
    pub fn with_checkpoints(
        mut self,
        repository: Box<dyn ValueTableRepository>,
        path: impl Into<PathBuf>,
    ) -> Self {
        self.checkpoint = Some(CheckpointTarget {
            repository,
            path: path.into(),
        });
        self
    }

    /// Train against `opponent` instead of the configured [`OpponentKind`].
    ///
    /// The learner sits in `agent_player`'s seat and only its afterstates are
    /// updated; the opponent's own [`Agent::learn`] runs after every episode.
    pub fn with_opponent(mut self, opponent: Box<dyn Agent>) -> Self {
        self.custom_opponent = Some(opponent);
        self
    }

    /// Use an externally owned stop flag
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Configuration in effect, with the seed filled in
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Seed actually used, drawn at construction when none was configured
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run the configured number of episodes, updating `table` after each.
    ///
    /// Self-play updates both sides of every episode; against a fixed
    /// opponent only the learner's afterstates are updated.
    ///
    /// # Errors
    ///
    /// Any agent, rules, observer or checkpoint error aborts the run. Updates
    /// from episodes completed before the error stay in `table`.
    pub fn train(&mut self, table: &mut ValueTable) -> Result<TrainingSummary> {
        let config = self.config.clone();
        info!(
            "training {} episodes vs {} (alpha={}, exploration={}, seed={}, symmetry={})",
            config.episodes,
            config.opponent,
            config.learning_rate,
            config.exploration,
            self.seed,
            table.symmetry()
        );

        let mut rng_agent = StdRng::seed_from_u64(self.seed);
        let mut rng_other = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        let mut built: Option<Box<dyn Agent>> = match config.opponent {
            _ if self.custom_opponent.is_some() => None,
            OpponentKind::SelfPlay => None,
            OpponentKind::Random => Some(Box::new(RandomPlayer::with_seed(
                "random",
                self.seed.wrapping_add(1),
            ))),
            OpponentKind::Minimax => Some(Box::new(MinimaxPlayer::new("minimax"))),
        };
        let mut opponent = self
            .custom_opponent
            .as_deref_mut()
            .or(built.as_deref_mut());
        if let Some(opponent) = &opponent {
            info!("fixed opponent {} with learner as {}", opponent.name(), config.agent_player);
        }

        let mut arbiter = Arbiter::new();
        let mut summary = TrainingSummary::default();
        let started = Instant::now();

        for observer in &mut self.observers {
            observer.on_training_start(config.episodes)?;
        }

        for episode in 0..config.episodes {
            if self.stop.is_stopped() {
                warn!("training stopped after {episode} of {} episodes", config.episodes);
                summary.stopped = true;
                break;
            }

            let exploration_rate = config.exploration.rate(episode);
            let trajectory: Trajectory = match opponent.as_mut() {
                None => {
                    let mut x =
                        LearningAgentPlayer::new("td-x", &*table, &mut rng_agent, exploration_rate);
                    let mut o =
                        LearningAgentPlayer::new("td-o", &*table, &mut rng_other, exploration_rate);
                    arbiter.play(&mut x, &mut o)?
                }
                Some(opponent) => {
                    let mut agent =
                        LearningAgentPlayer::new("td", &*table, &mut rng_agent, exploration_rate);
                    match config.agent_player {
                        Player::X => arbiter.play(&mut agent, &mut **opponent)?,
                        Player::O => arbiter.play(&mut **opponent, &mut agent)?,
                    }
                }
            };

            match opponent.as_mut() {
                Some(opponent) => {
                    td::update_for(table, &trajectory, config.agent_player, config.learning_rate);
                    opponent.learn(&trajectory, config.agent_player.opponent())?;
                }
                None => td::update(table, &trajectory, config.learning_rate),
            }

            let outcome = trajectory.outcome();
            summary.record(outcome);

            let report = EpisodeReport {
                episode,
                outcome,
                exploration_rate,
                moves: trajectory.len(),
                elapsed: started.elapsed(),
            };
            for observer in &mut self.observers {
                observer.on_episode_end(&report)?;
            }

            if let (Some(every), Some(target)) = (config.checkpoint_every, &self.checkpoint)
                && (episode + 1).is_multiple_of(every)
            {
                target.repository.save(table, &target.path)?;
                info!(
                    "checkpoint after {} episodes: {} entries -> {}",
                    episode + 1,
                    table.len(),
                    target.path.display()
                );
            }
        }

        summary.table_size = table.len();
        summary.elapsed = started.elapsed();

        for observer in &mut self.observers {
            observer.on_training_end(&summary)?;
        }

        info!(
            "training finished: {} episodes, X {} / O {} / draws {}, {} table entries in {:.2?}",
            summary.episodes,
            summary.x_wins,
            summary.o_wins,
            summary.draws,
            summary.table_size,
            summary.elapsed
        );
        Ok(summary)
    }
}

/// Train a fresh table with the configured symmetry mode.
///
/// # Examples
///
/// ```
/// use tictactoe_rl::pipeline::{TrainingConfig, train_new};
///
/// let config = TrainingConfig::default().with_episodes(50).with_seed(1);
/// let (table, summary) = train_new(config)?;
/// assert_eq!(summary.episodes, 50);
/// assert!(!table.is_empty());
/// # Ok::<(), tictactoe_rl::Error>(())
/// ```
pub fn train_new(config: TrainingConfig) -> Result<(ValueTable, TrainingSummary)> {
    let mut table = ValueTable::new(config.symmetry);
    let summary = Trainer::new(config)?.train(&mut table)?;
    Ok((table, summary))
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::adapters::InMemoryRepository;

    /// Records every callback it receives
    #[derive(Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
        stop_after: Option<(usize, StopHandle)>,
    }

    impl Observer for Recorder {
        fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
            self.log.borrow_mut().push(format!("start {total_episodes}"));
            Ok(())
        }

        fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
            self.log.borrow_mut().push(format!("episode {}", report.episode));
            if let Some((limit, stop)) = &self.stop_after
                && report.episode + 1 >= *limit
            {
                stop.stop();
            }
            Ok(())
        }

        fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
            self.log.borrow_mut().push(format!("end {}", summary.episodes));
            Ok(())
        }
    }

    #[test]
    fn test_observer_call_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder {
            log: Rc::clone(&log),
            stop_after: None,
        };
        let config = TrainingConfig::default().with_episodes(3).with_seed(5);
        let mut table = ValueTable::default();
        Trainer::new(config)
            .unwrap()
            .with_observer(Box::new(recorder))
            .train(&mut table)
            .unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["start 3", "episode 0", "episode 1", "episode 2", "end 3"]
        );
    }

    #[test]
    fn test_same_seed_same_table() {
        let config = TrainingConfig::default().with_episodes(200).with_seed(99);
        let (first, first_summary) = train_new(config.clone()).unwrap();
        let (second, second_summary) = train_new(config).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first_summary.wins_for(Player::X),
            second_summary.wins_for(Player::X)
        );
        assert_eq!(first_summary.wins_for(Player::O), first_summary.o_wins);
        assert_eq!(first_summary.table_size, first.len());
    }

    #[test]
    fn test_stop_handle_ends_run_at_episode_boundary() {
        let config = TrainingConfig::default().with_episodes(100).with_seed(1);
        let trainer = Trainer::new(config).unwrap();
        let stop = trainer.stop_handle();
        let recorder = Recorder {
            log: Rc::default(),
            stop_after: Some((10, stop)),
        };
        let mut table = ValueTable::default();
        let summary = trainer
            .with_observer(Box::new(recorder))
            .train(&mut table)
            .unwrap();

        assert!(summary.stopped);
        assert_eq!(summary.episodes, 10);
        assert_eq!(summary.x_wins + summary.o_wins + summary.draws, 10);
    }

    #[test]
    fn test_external_stop_before_first_episode() {
        let stop = StopHandle::new();
        stop.stop();
        let mut table = ValueTable::default();
        let summary = Trainer::new(TrainingConfig::default().with_episodes(50).with_seed(2))
            .unwrap()
            .with_stop_handle(stop.clone())
            .train(&mut table)
            .unwrap();

        assert!(stop.is_stopped());
        assert!(summary.stopped);
        assert_eq!(summary.episodes, 0);
        assert_eq!(summary.draw_rate(), 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_checkpoints_saved_on_interval() {
        let repo = InMemoryRepository::new();
        let config = TrainingConfig::default()
            .with_episodes(25)
            .with_seed(3)
            .with_checkpoint_every(10);
        let mut table = ValueTable::default();
        Trainer::new(config)
            .unwrap()
            .with_checkpoints(Box::new(repo.clone()), "checkpoint.tsv")
            .train(&mut table)
            .unwrap();

        assert_eq!(repo.save_count(), 2);
        let saved = repo.load(std::path::Path::new("checkpoint.tsv")).unwrap();
        assert!(saved.len() <= table.len());
    }

    #[test]
    fn test_fixed_opponent_updates_only_learner_side() {
        let config = TrainingConfig::default()
            .with_episodes(50)
            .with_seed(8)
            .with_opponent(OpponentKind::Random)
            .with_agent_player(Player::O)
            .with_symmetry(SymmetryMode::None);
        let (table, summary) = train_new(config).unwrap();
        assert_eq!(summary.episodes, 50);
        // O's afterstates have equal piece counts
        for (fingerprint, _) in table.sorted_entries() {
            assert!(fingerprint.ends_with("_X"), "{fingerprint}");
        }
    }

    /// Always claims the centre, legal or not
    struct CentreOnly;

    impl Agent for CentreOnly {
        fn choose_move(&mut self, _state: &crate::tictactoe::GameState) -> Result<usize> {
            Ok(4)
        }

        fn name(&self) -> &str {
            "centre-only"
        }
    }

    #[test]
    fn test_illegal_opponent_aborts_training() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder {
            log: Rc::clone(&log),
            stop_after: None,
        };
        let config = TrainingConfig::default()
            .with_episodes(10)
            .with_seed(3)
            .with_agent_player(Player::O);
        let mut table = ValueTable::default();
        let result = Trainer::new(config)
            .unwrap()
            .with_opponent(Box::new(CentreOnly))
            .with_observer(Box::new(recorder))
            .train(&mut table);

        assert!(result.is_err_and(|e| e.is_invalid_move()));
        assert_eq!(*log.borrow(), vec!["start 10".to_string()]);
        assert!(table.is_empty());
    }

    #[test]
    fn test_custom_opponent_is_used() {
        let config = TrainingConfig::default()
            .with_episodes(30)
            .with_seed(12)
            .with_symmetry(SymmetryMode::None);
        let mut table = ValueTable::new(SymmetryMode::None);
        let summary = Trainer::new(config)
            .unwrap()
            .with_opponent(Box::new(crate::players::MenacePlayer::with_seed("menace", 1)))
            .train(&mut table)
            .unwrap();
        assert_eq!(summary.episodes, 30);
        // Only X's afterstates are learned
        for (fingerprint, _) in table.sorted_entries() {
            assert!(fingerprint.ends_with("_O"), "{fingerprint}");
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(Trainer::new(TrainingConfig::default().with_learning_rate(1.5)).is_err());
        assert!(Trainer::new(TrainingConfig::default().with_checkpoint_every(0)).is_err());
        assert!(
            Trainer::new(
                TrainingConfig::default().with_exploration(ExplorationSchedule::constant(-0.1))
            )
            .is_err()
        );
    }

    #[test]
    fn test_opponent_kind_parsing() {
        assert_eq!("self".parse::<OpponentKind>().unwrap(), OpponentKind::SelfPlay);
        assert_eq!("Minimax".parse::<OpponentKind>().unwrap(), OpponentKind::Minimax);
        assert!("alphazero".parse::<OpponentKind>().is_err());
    }
}
