//! Statistical checks that the learners actually learn
//!
//! Every run uses fixed seeds, so the numbers below are reproducible.

use std::{cell::RefCell, rc::Rc};

use rand::{SeedableRng, rngs::StdRng};
use tictactoe_rl::{
    Result,
    learning::{ExplorationSchedule, ValueTable},
    pipeline::{
        Arbiter, EpisodeReport, EvaluationResult, Observer, OpponentKind, Seats, Trainer,
        TrainingConfig, evaluate, train_new,
    },
    players::{LearningAgentPlayer, MenacePlayer, MinimaxPlayer, RandomPlayer},
    tictactoe::{GameStatus, Player, SymmetryMode},
};

fn evaluate_table(table: &ValueTable, opponent_seed: u64, games: usize) -> EvaluationResult {
    let mut rng = StdRng::seed_from_u64(99);
    let mut agent = LearningAgentPlayer::greedy("td", table, &mut rng);
    let mut random = RandomPlayer::with_seed("random", opponent_seed);
    evaluate(&mut agent, &mut random, games, Seats::Alternate).unwrap()
}

mod td_self_play {
    use super::*;

    #[test]
    fn test_self_play_agent_rarely_loses_to_random() {
        let config = TrainingConfig::default()
            .with_episodes(30_000)
            .with_learning_rate(0.1)
            .with_exploration(ExplorationSchedule::Linear {
                start: 0.5,
                end: 0.05,
                episodes: 20_000,
            })
            .with_seed(2024);
        let (table, summary) = train_new(config).unwrap();
        assert_eq!(summary.episodes, 30_000);

        let result = evaluate_table(&table, 7, 1000);
        assert_eq!(result.games, 1000);
        assert!(
            result.loss_rate <= 0.10,
            "lost {} of {} games against random",
            result.losses,
            result.games
        );
        assert!(result.win_rate > result.loss_rate);
    }

    #[test]
    fn test_trained_agent_beats_untrained_agent() {
        let config = TrainingConfig::default().with_episodes(10_000).with_seed(31);
        let (trained, _) = train_new(config).unwrap();
        let untrained = ValueTable::new(SymmetryMode::D4);

        let trained_result = evaluate_table(&trained, 5, 600);
        let untrained_result = evaluate_table(&untrained, 5, 600);
        assert!(
            trained_result.loss_rate < untrained_result.loss_rate,
            "trained {} vs untrained {}",
            trained_result.loss_rate,
            untrained_result.loss_rate
        );
    }

    /// Collects the exploration rate of every episode
    struct RateLog(Rc<RefCell<Vec<f64>>>);

    impl Observer for RateLog {
        fn on_episode_end(&mut self, report: &EpisodeReport) -> Result<()> {
            self.0.borrow_mut().push(report.exploration_rate);
            Ok(())
        }
    }

    #[test]
    fn test_exploration_decays_over_the_run() {
        let rates = Rc::new(RefCell::new(Vec::new()));
        let config = TrainingConfig::default()
            .with_episodes(3_000)
            .with_exploration(ExplorationSchedule::Exponential {
                start: 0.4,
                decay: 0.999,
                min: 0.02,
            })
            .with_seed(17);
        let mut table = ValueTable::default();
        Trainer::new(config)
            .unwrap()
            .with_observer(Box::new(RateLog(Rc::clone(&rates))))
            .train(&mut table)
            .unwrap();

        let rates = rates.borrow();
        assert_eq!(rates.len(), 3_000);
        assert_eq!(rates[0], 0.4);
        assert!(rates.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(rates[2_999], 0.02);
    }
}

mod fixed_opponents {
    use super::*;

    #[test]
    fn test_training_against_random_as_o() {
        let config = TrainingConfig::default()
            .with_episodes(15_000)
            .with_opponent(OpponentKind::Random)
            .with_agent_player(Player::O)
            .with_seed(8);
        let (table, _) = train_new(config).unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let mut agent = LearningAgentPlayer::greedy("td", &table, &mut rng);
        let mut random = RandomPlayer::with_seed("random", 77);
        let trained = evaluate(&mut agent, &mut random, 500, Seats::AgentAsO).unwrap();

        let mut baseline = RandomPlayer::with_seed("baseline", 3);
        let mut random = RandomPlayer::with_seed("random", 77);
        let untrained = evaluate(&mut baseline, &mut random, 500, Seats::AgentAsO).unwrap();

        assert!(trained.loss_rate < untrained.loss_rate);
    }

    #[test]
    fn test_minimax_pair_always_draws() {
        let mut arbiter = Arbiter::new();
        let mut x = MinimaxPlayer::new("x");
        let mut o = MinimaxPlayer::new("o");
        for _ in 0..3 {
            let trajectory = arbiter.play(&mut x, &mut o).unwrap();
            assert_eq!(trajectory.outcome(), GameStatus::Draw);
        }
    }

    #[test]
    fn test_minimax_never_loses_to_trained_agent() {
        let (table, _) = train_new(TrainingConfig::default().with_episodes(2_000).with_seed(4)).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let mut agent = LearningAgentPlayer::greedy("td", &table, &mut rng);
        let mut minimax = MinimaxPlayer::new("minimax");
        let result = evaluate(&mut minimax, &mut agent, 20, Seats::Alternate).unwrap();
        assert_eq!(result.losses, 0);
    }
}

mod menace {
    use super::*;

    #[test]
    fn test_menace_improves_against_random() {
        let mut untrained = MenacePlayer::with_seed("menace", 10);
        let mut random = RandomPlayer::with_seed("random", 20);
        let before = evaluate(&mut untrained, &mut random, 1000, Seats::AgentAsX).unwrap();

        let mut menace = MenacePlayer::with_seed("menace", 10);
        let mut trainer_random = RandomPlayer::with_seed("random", 30);
        let mut arbiter = Arbiter::new();
        for _ in 0..4_000 {
            arbiter
                .play_and_learn(&mut menace, &mut trainer_random)
                .unwrap();
        }
        assert_eq!(menace.games_trained(), 4_000);

        let mut random = RandomPlayer::with_seed("random", 20);
        let after = evaluate(&mut menace, &mut random, 1000, Seats::AgentAsX).unwrap();
        assert!(
            after.win_rate > before.win_rate + 0.05,
            "win rate {} -> {}",
            before.win_rate,
            after.win_rate
        );
    }
}
