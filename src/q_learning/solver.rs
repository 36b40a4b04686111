//! Tabular Q-learning with optional eligibility traces
//!
//! Each episode is a full self-play game. Every decision player acts
//! epsilon-greedily on the shared table and the update bootstraps from the
//! best successor value, negated when the turn passes to the opponent so that
//! alternating zero-sum games learn from the mover's perspective:
//!
//! Q(s,a) ← Q(s,a) + α[r + γ·sign·max_a' Q(s',a') - Q(s,a)]
//!
//! With λ > 0 every traced pair receives the same TD error scaled by its
//! trace, and traces decay by γ·(±λ) per step.

use std::{collections::HashMap, sync::Arc};

use log::debug;
use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    policy::{best_action, best_value},
    ports::{
        game::{Game, State},
        learner::{EpisodeResult, ValueLearner},
    },
    q_learning::ValueTable,
    types::{Action, INVALID_ACTION, PlayerId, StateKey},
    utils::{build_rng, resolve_chance},
};

/// Hyper-parameters of [`TabularQLearningSolver`].
///
/// # Examples
///
/// ```
/// use tabular_q::q_learning::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_learning_rate(0.1)
///     .with_lambda(0.1)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Probability of a uniformly random exploratory action
    pub epsilon: f64,
    /// Step size α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount_factor: f64,
    /// Trace decay λ; 0 disables eligibility traces
    pub lambda: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl SolverConfig {
    pub const DEFAULT_EPSILON: f64 = 0.1;
    pub const DEFAULT_LEARNING_RATE: f64 = 0.01;
    pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.99;
    pub const DEFAULT_LAMBDA: f64 = 0.0;

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] naming the first parameter
    /// outside its range.
    pub fn validate(&self) -> Result<()> {
        let check = |name: &str, value: f64, ok: bool| {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(Error::InvalidConfiguration {
                    message: format!("{name} = {value} is out of range"),
                })
            }
        };
        check("epsilon", self.epsilon, (0.0..=1.0).contains(&self.epsilon))?;
        check(
            "learning_rate",
            self.learning_rate,
            self.learning_rate > 0.0 && self.learning_rate <= 1.0,
        )?;
        check(
            "discount_factor",
            self.discount_factor,
            (0.0..=1.0).contains(&self.discount_factor),
        )?;
        check("lambda", self.lambda, (0.0..=1.0).contains(&self.lambda))
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: Self::DEFAULT_EPSILON,
            learning_rate: Self::DEFAULT_LEARNING_RATE,
            discount_factor: Self::DEFAULT_DISCOUNT_FACTOR,
            lambda: Self::DEFAULT_LAMBDA,
            seed: None,
        }
    }
}

/// One value table plus the bookkeeping needed to update it.
#[derive(Debug, Clone, Default)]
struct TdTable {
    values: ValueTable,
    traces: HashMap<(StateKey, Action), f64>,
    legal_actions: HashMap<StateKey, Vec<Action>>,
}

impl TdTable {
    fn record_legal(&mut self, state: &StateKey, legal: &[Action]) {
        if !self.legal_actions.contains_key(state) {
            self.legal_actions.insert(state.clone(), legal.to_vec());
        }
    }

    fn best_action(&self, state: &StateKey) -> Action {
        match self.legal_actions.get(state) {
            Some(legal) => best_action(&self.values, state, legal),
            None => INVALID_ACTION,
        }
    }

    /// Move Q(state, action) toward `target`.
    ///
    /// `trace_decay` is `None` for one-step updates.
    fn update(
        &mut self,
        state: &StateKey,
        action: Action,
        target: f64,
        learning_rate: f64,
        trace_decay: Option<f64>,
    ) {
        let td_error = target - self.values.get(state, action);
        match trace_decay {
            None => *self.values.value_mut(state, action) += learning_rate * td_error,
            Some(decay) => {
                *self.traces.entry((state.clone(), action)).or_insert(0.0) += 1.0;
                let Self { values, traces, .. } = self;
                for ((traced_state, traced_action), trace) in traces.iter_mut() {
                    *values.value_mut(traced_state, *traced_action) +=
                        learning_rate * td_error * *trace;
                    *trace *= decay;
                }
            }
        }
    }
}

/// Value-update collaborator: tabular Q-learning by self-play.
///
/// Keeps two tables updated in lockstep: one keyed by full state and one
/// keyed by the acting player's information state. For perfect-information
/// games they are identical.
pub struct TabularQLearningSolver {
    game: Arc<dyn Game>,
    config: SolverConfig,
    rng: StdRng,
    state_table: TdTable,
    info_table: TdTable,
    episodes: usize,
    last_returns: Vec<f64>,
}

impl TabularQLearningSolver {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for out-of-range parameters.
    pub fn new(game: Arc<dyn Game>, config: SolverConfig) -> Result<Self> {
        config.validate()?;
        let num_players = game.num_players();
        Ok(Self {
            rng: build_rng(config.seed),
            game,
            config,
            state_table: TdTable::default(),
            info_table: TdTable::default(),
            episodes: 0,
            last_returns: vec![0.0; num_players],
        })
    }

    /// Start from previously learned state-keyed values, e.g. a checkpoint.
    ///
    /// Legal actions for `best_action_from_state` are learned as states are
    /// revisited.
    pub fn with_value_table(mut self, table: ValueTable) -> Self {
        self.state_table.values = table;
        self
    }

    /// Start from previously learned information-state values.
    ///
    /// For perfect-information games a state-keyed checkpoint can seed both
    /// tables.
    pub fn with_info_state_value_table(mut self, table: ValueTable) -> Self {
        self.info_table.values = table;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn game(&self) -> &Arc<dyn Game> {
        &self.game
    }

    /// Completed episodes.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Player 0's return in the most recent episode.
    pub fn last_reward(&self) -> f64 {
        self.last_returns.first().copied().unwrap_or(0.0)
    }

    /// Every player's return in the most recent episode.
    pub fn last_returns(&self) -> &[f64] {
        &self.last_returns
    }

    /// Greedy action for an information-state key seen during training.
    pub fn best_action_from_info_state(&self, key: &StateKey) -> Action {
        self.info_table.best_action(key)
    }

    fn epsilon_greedy(&mut self, state: &StateKey, legal: &[Action]) -> Action {
        if self.rng.random::<f64>() < self.config.epsilon {
            legal[self.rng.random_range(0..legal.len())]
        } else {
            best_action(&self.state_table.values, state, legal)
        }
    }

    fn trace_decay(&self, same_player: bool) -> Option<f64> {
        if self.config.lambda == 0.0 {
            return None;
        }
        let lambda = if same_player {
            self.config.lambda
        } else {
            -self.config.lambda
        };
        Some(self.config.discount_factor * lambda)
    }
}

/// Best value of the successor in `table`'s key space, 0 at terminal states.
fn successor_value(table: &TdTable, next: &dyn State, info_state: bool) -> f64 {
    let Some(player) = next.current_player().decision_index() else {
        return 0.0;
    };
    let key = if info_state {
        next.information_state_key(player)
    } else {
        next.state_key()
    };
    best_value(&table.values, &key, &next.legal_actions()).unwrap_or(0.0)
}

impl ValueLearner for TabularQLearningSolver {
    fn run_iteration(&mut self) -> Result<EpisodeResult> {
        let mut episode = EpisodeResult::new(self.game.num_players());
        let mut state = self.game.new_initial_state();
        resolve_chance(&mut state, &mut self.rng)?;

        while !state.is_terminal() {
            let player = state.current_player().decision_index().ok_or_else(|| {
                Error::UnsupportedPlayer {
                    player: state.current_player().to_string(),
                    context: "tabular Q-learning only handles sequential decision nodes"
                        .to_string(),
                }
            })?;
            let legal = state.legal_actions();
            if legal.is_empty() {
                return Err(Error::NoLegalActions {
                    state: state.state_key().into_string(),
                });
            }

            let key = state.state_key();
            let info_key = state.information_state_key(player);
            self.state_table.record_legal(&key, &legal);
            self.info_table.record_legal(&info_key, &legal);

            let action = self.epsilon_greedy(&key, &legal);
            let mut next = state.child(action)?;
            resolve_chance(&mut next, &mut self.rng)?;

            let rewards = next.rewards();
            episode.accumulate(&rewards);
            episode.steps += 1;
            let reward = rewards.get(player).copied().unwrap_or(0.0);

            let same_player = next.current_player() == PlayerId::Decision(player);
            let sign = if same_player { 1.0 } else { -1.0 };
            let decay = self.trace_decay(same_player);
            let gamma = self.config.discount_factor;
            let alpha = self.config.learning_rate;

            let target = reward + gamma * sign * successor_value(&self.state_table, &*next, false);
            self.state_table.update(&key, action, target, alpha, decay);

            let info_target =
                reward + gamma * sign * successor_value(&self.info_table, &*next, true);
            self.info_table
                .update(&info_key, action, info_target, alpha, decay);

            state = next;
        }

        self.state_table.traces.clear();
        self.info_table.traces.clear();
        self.episodes += 1;
        episode.terminal = true;
        self.last_returns = episode.returns.clone();
        debug!(
            "episode {} finished after {} steps with returns {:?}",
            self.episodes, episode.steps, episode.returns
        );
        Ok(episode)
    }

    fn value_table(&self) -> &ValueTable {
        &self.state_table.values
    }

    fn info_state_value_table(&self) -> &ValueTable {
        &self.info_table.values
    }

    fn best_action_from_state(&self, key: &StateKey) -> Action {
        self.state_table.best_action(key)
    }

    fn name(&self) -> &str {
        "tabular-q-learning"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Catch, TicTacToe};

    fn solver(game: Arc<dyn Game>, config: SolverConfig) -> TabularQLearningSolver {
        TabularQLearningSolver::new(game, config).unwrap()
    }

    #[test]
    fn test_default_config_matches_reference_constants() {
        let config = SolverConfig::default();
        assert_eq!(config.epsilon, 0.1);
        assert_eq!(config.learning_rate, 0.01);
        assert_eq!(config.discount_factor, 0.99);
        assert_eq!(config.lambda, 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let game: Arc<dyn Game> = Arc::new(TicTacToe::new());
        for config in [
            SolverConfig::default().with_epsilon(1.5),
            SolverConfig::default().with_learning_rate(0.0),
            SolverConfig::default().with_discount_factor(-0.1),
            SolverConfig::default().with_lambda(f64::NAN),
        ] {
            assert!(matches!(
                TabularQLearningSolver::new(game.clone(), config),
                Err(Error::InvalidConfiguration { .. })
            ));
        }
    }

    #[test]
    fn test_single_iteration_records_values() {
        let mut solver = solver(
            Arc::new(TicTacToe::new()),
            SolverConfig::default().with_seed(7),
        );
        let episode = solver.run_iteration().unwrap();
        assert!(episode.terminal);
        assert!(episode.steps >= 5);
        assert!(!solver.value_table().is_empty());
        assert_eq!(solver.episodes(), 1);
        // zero-sum returns
        assert_eq!(episode.returns[0], -episode.returns[1]);
        assert_eq!(solver.last_reward(), episode.returns[0]);
    }

    #[test]
    fn test_perfect_information_tables_agree() {
        let mut solver = solver(
            Arc::new(TicTacToe::new()),
            SolverConfig::default().with_seed(3).with_lambda(0.1),
        );
        for _ in 0..20 {
            solver.run_iteration().unwrap();
        }
        assert_eq!(solver.value_table(), solver.info_state_value_table());
    }

    #[test]
    fn test_best_action_from_state_uses_greedy_rule() {
        let mut solver = solver(
            Arc::new(Catch::new()),
            SolverConfig::default().with_seed(11),
        );
        for _ in 0..50 {
            solver.run_iteration().unwrap();
        }
        let table = solver.value_table();
        for key in table.state_keys() {
            let legal = solver.state_table.legal_actions[key].clone();
            assert_eq!(
                solver.best_action_from_state(key),
                best_action(table, key, &legal)
            );
        }
        assert_eq!(
            solver.best_action_from_state(&StateKey::new("never-seen")),
            INVALID_ACTION
        );
    }

    #[test]
    fn test_terminal_update_moves_toward_reward() {
        // lr 1 with no exploration: the final step's value becomes the reward
        let mut solver = solver(
            Arc::new(Catch::new()),
            SolverConfig::default()
                .with_epsilon(0.0)
                .with_learning_rate(1.0)
                .with_seed(5),
        );
        let episode = solver.run_iteration().unwrap();
        let terminal_reward = episode.returns[0];
        let recorded: Vec<f64> = solver.value_table().iter().map(|(_, _, v)| v).collect();
        assert!(recorded.contains(&terminal_reward));
    }
}
