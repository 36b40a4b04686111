//! Learner port - abstraction for the value-update algorithm
//!
//! The training loop drives any implementation of [`ValueLearner`] one
//! episode at a time and only ever reads the tables it exposes.

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    q_learning::ValueTable,
    types::{Action, StateKey},
};

/// Outcome of a single play-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    /// Reward accumulated by each player over the episode
    pub returns: Vec<f64>,
    /// Number of decision steps taken
    pub steps: usize,
    /// Whether the episode reached a terminal state
    pub terminal: bool,
}

impl EpisodeResult {
    pub fn new(num_players: usize) -> Self {
        Self {
            returns: vec![0.0; num_players],
            steps: 0,
            terminal: false,
        }
    }

    /// Add a per-step reward vector to the running totals.
    pub fn accumulate(&mut self, rewards: &[f64]) {
        for (total, reward) in self.returns.iter_mut().zip(rewards) {
            *total += reward;
        }
    }
}

/// Value-update collaborator driven by the training loop.
///
/// # Tie-breaking
///
/// [`ValueLearner::best_action_from_state`] must agree with
/// [`crate::policy::best_action`]: among equally valued legal actions the
/// later one in legal-action order wins.
pub trait ValueLearner {
    /// Play one complete episode, updating the value tables.
    ///
    /// # Errors
    ///
    /// Any error is fatal to the training run.
    fn run_iteration(&mut self) -> Result<EpisodeResult>;

    /// Values keyed by full state.
    fn value_table(&self) -> &ValueTable;

    /// Values keyed by the acting player's information state.
    ///
    /// Perfect-information learners can return the state-keyed table.
    fn info_state_value_table(&self) -> &ValueTable {
        self.value_table()
    }

    /// Greedy action for a previously visited state key, or
    /// [`crate::types::INVALID_ACTION`] when the key is unknown or has no
    /// legal actions.
    fn best_action_from_state(&self, key: &StateKey) -> Action;

    /// Learner name, used in logs and errors.
    fn name(&self) -> &str;
}
