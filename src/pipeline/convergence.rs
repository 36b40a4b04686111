//! Convergence metrics evaluated during training

use std::sync::Arc;

use log::debug;

use crate::{
    Result,
    analysis::exploitability,
    policy::{GreedyPolicyExtractor, PolicyMaterializer, StateSpace, TabularPolicy},
    ports::{Game, ValueLearner},
};

/// Scores a learner's current tables; lower is better.
pub trait ConvergenceMetric {
    /// Label used in reports, e.g. `exploitability`.
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Coverage violations and unreachable states are fatal to training.
    fn evaluate(&mut self, learner: &dyn ValueLearner) -> Result<f64>;
}

/// Exploitability of the greedy policy over visited information states,
/// with every unvisited state left at the uniform baseline.
pub struct ExploitabilityEvaluator {
    game: Arc<dyn Game>,
    space: StateSpace,
    baseline: TabularPolicy,
}

impl ExploitabilityEvaluator {
    /// Enumerates the game's decision states once up front.
    ///
    /// # Errors
    ///
    /// Returns an error if the game has nodes the enumeration cannot handle.
    pub fn new(game: Arc<dyn Game>) -> Result<Self> {
        let space = StateSpace::enumerate(&*game)?;
        let baseline = TabularPolicy::uniform(&space);
        debug!(
            "{}: {} decision states, {} terminal states",
            game.name(),
            space.len(),
            space.terminal_states()
        );
        Ok(Self {
            game,
            space,
            baseline,
        })
    }

    pub fn state_space(&self) -> &StateSpace {
        &self.space
    }

    pub fn baseline(&self) -> &TabularPolicy {
        &self.baseline
    }

    /// Materialized greedy-over-uniform policy for the learner's current
    /// information-state table.
    ///
    /// # Errors
    ///
    /// Same conditions as [`ConvergenceMetric::evaluate`].
    pub fn greedy_policy(&self, learner: &dyn ValueLearner) -> Result<TabularPolicy> {
        let choice =
            GreedyPolicyExtractor::new(&self.space).extract_visited(learner.info_state_value_table())?;
        PolicyMaterializer::new(&self.baseline).materialize(&choice)
    }
}

impl ConvergenceMetric for ExploitabilityEvaluator {
    fn name(&self) -> &str {
        "exploitability"
    }

    fn evaluate(&mut self, learner: &dyn ValueLearner) -> Result<f64> {
        let choice =
            GreedyPolicyExtractor::new(&self.space).extract_visited(learner.info_state_value_table())?;
        let materializer = PolicyMaterializer::new(&self.baseline);
        let policy = materializer.overlay(&choice)?;
        exploitability(&*self.game, &policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        games::Catch,
        q_learning::{SolverConfig, TabularQLearningSolver},
    };

    #[test]
    fn test_untrained_learner_scores_uniform_baseline() {
        let game: Arc<dyn Game> = Arc::new(Catch::with_size(4, 3).unwrap());
        let mut evaluator = ExploitabilityEvaluator::new(game.clone()).unwrap();
        let solver = TabularQLearningSolver::new(game.clone(), SolverConfig::default()).unwrap();

        let untrained = evaluator.evaluate(&solver).unwrap();
        let uniform = exploitability(&*game, evaluator.baseline()).unwrap();
        assert_eq!(untrained, uniform);
        assert_eq!(evaluator.greedy_policy(&solver).unwrap(), *evaluator.baseline());
    }

    #[test]
    fn test_lazy_and_eager_policies_score_alike() {
        let game: Arc<dyn Game> = Arc::new(Catch::with_size(4, 3).unwrap());
        let mut evaluator = ExploitabilityEvaluator::new(game.clone()).unwrap();
        let mut solver = TabularQLearningSolver::new(
            game.clone(),
            SolverConfig::default().with_learning_rate(0.5).with_seed(9),
        )
        .unwrap();
        for _ in 0..200 {
            solver.run_iteration().unwrap();
        }
        let lazy = evaluator.evaluate(&solver).unwrap();
        let eager = exploitability(&*game, &evaluator.greedy_policy(&solver).unwrap()).unwrap();
        assert!((lazy - eager).abs() < 1e-12);
    }
}
