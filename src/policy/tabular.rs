//! Full-coverage tabular policies and greedy overlays

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{greedy::ActionChoice, state_space::StateSpace};
use crate::{
    Error, Result,
    types::{Action, ActionsAndProbs, StateKey},
};

/// Read access to a state -> action distribution mapping.
pub trait Policy {
    /// Distribution at `state`, `None` if the policy does not cover it.
    fn action_probabilities(&self, state: &StateKey) -> Option<ActionsAndProbs>;
}

/// Explicit distribution for every covered state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabularPolicy {
    table: BTreeMap<StateKey, ActionsAndProbs>,
}

impl TabularPolicy {
    /// Uniform distribution over the legal actions of every decision state.
    pub fn uniform(space: &StateSpace) -> Self {
        let table = space
            .iter()
            .map(|(state, point)| {
                let probability = 1.0 / point.legal_actions.len() as f64;
                let distribution = point
                    .legal_actions
                    .iter()
                    .map(|&action| (action, probability))
                    .collect();
                (state.clone(), distribution)
            })
            .collect();
        Self { table }
    }

    pub fn get(&self, state: &StateKey) -> Option<&[(Action, f64)]> {
        self.table.get(state).map(Vec::as_slice)
    }

    pub fn contains(&self, state: &StateKey) -> bool {
        self.table.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Covered states and their distributions in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &[(Action, f64)])> {
        self.table
            .iter()
            .map(|(state, distribution)| (state, distribution.as_slice()))
    }
}

impl Policy for TabularPolicy {
    fn action_probabilities(&self, state: &StateKey) -> Option<ActionsAndProbs> {
        self.table.get(state).cloned()
    }
}

/// Probability 1 on `chosen`, 0 on every other baseline action.
fn degenerate(baseline: &[(Action, f64)], chosen: Action) -> ActionsAndProbs {
    baseline
        .iter()
        .map(|&(action, _)| (action, if action == chosen { 1.0 } else { 0.0 }))
        .collect()
}

/// Composes a greedy [`ActionChoice`] over a total baseline policy.
///
/// The baseline must cover every reachable decision state; the overlay only
/// covers what training visited. Overlay states become degenerate on the
/// chosen action and every other state keeps its baseline distribution.
pub struct PolicyMaterializer<'b> {
    baseline: &'b TabularPolicy,
}

impl<'b> PolicyMaterializer<'b> {
    pub fn new(baseline: &'b TabularPolicy) -> Self {
        Self { baseline }
    }

    /// Eagerly build the combined policy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PolicyCoverage`] if the overlay names a state the
    /// baseline does not cover, or an action outside the baseline's actions
    /// at that state.
    pub fn materialize(&self, overlay: &ActionChoice) -> Result<TabularPolicy> {
        self.check_coverage(overlay)?;
        let table = self
            .baseline
            .table
            .iter()
            .map(|(state, distribution)| {
                let distribution = match overlay.get(state) {
                    Some(chosen) => degenerate(distribution, chosen),
                    None => distribution.clone(),
                };
                (state.clone(), distribution)
            })
            .collect();
        Ok(TabularPolicy { table })
    }

    /// Read-through view: overlay lookup, else baseline lookup.
    ///
    /// Coverage is validated once here, so lookups never fail for states the
    /// baseline covers.
    ///
    /// # Errors
    ///
    /// Same conditions as [`PolicyMaterializer::materialize`].
    pub fn overlay<'o>(&self, overlay: &'o ActionChoice) -> Result<OverlayPolicy<'b, 'o>> {
        self.check_coverage(overlay)?;
        Ok(OverlayPolicy {
            baseline: self.baseline,
            overlay,
        })
    }

    fn check_coverage(&self, overlay: &ActionChoice) -> Result<()> {
        for (state, chosen) in overlay.iter() {
            let distribution = self
                .baseline
                .get(state)
                .ok_or_else(|| Error::PolicyCoverage {
                    state: state.to_string(),
                    detail: "state is absent from the baseline policy".to_string(),
                })?;
            if !distribution.iter().any(|&(action, _)| action == chosen) {
                return Err(Error::PolicyCoverage {
                    state: state.to_string(),
                    detail: format!("action {chosen} is not in the baseline distribution"),
                });
            }
        }
        Ok(())
    }
}

/// Lazily combined policy produced by [`PolicyMaterializer::overlay`].
pub struct OverlayPolicy<'b, 'o> {
    baseline: &'b TabularPolicy,
    overlay: &'o ActionChoice,
}

impl Policy for OverlayPolicy<'_, '_> {
    fn action_probabilities(&self, state: &StateKey) -> Option<ActionsAndProbs> {
        let distribution = self.baseline.get(state)?;
        Some(match self.overlay.get(state) {
            Some(chosen) => degenerate(distribution, chosen),
            None => distribution.to_vec(),
        })
    }
}
