//! Two-player learning on tic-tac-toe: greedy self-play ties and the trained
//! second player holds off a random opener

use std::{io, sync::Arc};

use tabular_q::{
    games::TicTacToe,
    pipeline::{EvaluationLoop, GreedyBot, RandomBot},
    ports::{Game, ValueLearner},
    q_learning::{SolverConfig, TabularQLearningSolver},
};

fn tic_tac_toe() -> Arc<dyn Game> {
    Arc::new(TicTacToe::new())
}

fn trained(config: SolverConfig, episodes: usize) -> TabularQLearningSolver {
    let mut solver = TabularQLearningSolver::new(tic_tac_toe(), config).unwrap();
    for _ in 0..episodes {
        solver.run_iteration().unwrap();
    }
    solver
}

#[test]
fn test_greedy_self_play_draws() {
    let game = tic_tac_toe();
    let mut draws = 0;
    for seed in 0..10 {
        let solver = trained(SolverConfig::default().with_lambda(0.1).with_seed(seed), 999);
        let mut bot = GreedyBot::new(solver.value_table());
        let result = EvaluationLoop::new(Some(seed))
            .self_play(&*game, &mut bot, 1)
            .unwrap();
        assert_eq!(result.total_rewards[0], -result.total_rewards[1]);
        if result.total_rewards[0] == 0.0 {
            draws += 1;
        }
    }
    assert!(draws >= 7, "only {draws} of 10 seeds drew");
}

#[test]
fn test_trained_second_player_rarely_loses_to_random() {
    let game = tic_tac_toe();
    let solver = trained(
        SolverConfig::default()
            .with_learning_rate(0.1)
            .with_lambda(0.1)
            .with_seed(0),
        50_000,
    );
    let mut opener = RandomBot::new(Some(42));
    let mut agent = GreedyBot::new(solver.value_table());
    let mut evaluation = EvaluationLoop::new(Some(42));

    let (mut wins, mut losses) = (0, 0);
    for _ in 0..200 {
        let result = evaluation
            .interactive(&*game, &mut opener, 0, &mut agent, 1, &mut io::sink())
            .unwrap();
        assert!(result.terminal);
        match result.returns[1] {
            r if r > 0.0 => wins += 1,
            r if r < 0.0 => losses += 1,
            _ => {}
        }
    }
    assert!(wins > losses, "{wins} wins against {losses} losses");
    assert!(losses <= 10, "lost {losses} of 200 games");
}
