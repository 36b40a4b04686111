//! Greedy action extraction from a value table

use std::collections::BTreeMap;

use log::warn;

use super::state_space::StateSpace;
use crate::{
    Error, Result,
    q_learning::ValueTable,
    types::{Action, INVALID_ACTION, StateKey},
};

/// Highest-valued action at `state` among `legal_actions`.
///
/// Actions are scanned in the order given (the game's ascending legal-action
/// order). The running best starts at negative infinity, so arbitrarily
/// negative values are still selectable, and it is replaced whenever a
/// candidate is **greater than or equal to** it. Among equally valued actions
/// the later one therefore wins: with every value still at the default 0 the
/// last legal action is chosen.
///
/// Returns [`INVALID_ACTION`] when `legal_actions` is empty.
pub fn best_action(table: &ValueTable, state: &StateKey, legal_actions: &[Action]) -> Action {
    let mut best = INVALID_ACTION;
    let mut best_value = f64::NEG_INFINITY;
    for &action in legal_actions {
        let value = table.get(state, action);
        if value >= best_value {
            best_value = value;
            best = action;
        }
    }
    best
}

/// Value of the greedy action, `None` when there are no legal actions.
pub fn best_value(table: &ValueTable, state: &StateKey, legal_actions: &[Action]) -> Option<f64> {
    legal_actions
        .iter()
        .map(|&action| table.get(state, action))
        .reduce(f64::max)
}

/// Greedy choice per state, rebuilt on every extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionChoice {
    choices: BTreeMap<StateKey, Action>,
}

impl ActionChoice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, state: StateKey, action: Action) {
        self.choices.insert(state, action);
    }

    pub fn get(&self, state: &StateKey) -> Option<Action> {
        self.choices.get(state).copied()
    }

    pub fn contains(&self, state: &StateKey) -> bool {
        self.choices.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Choices in state-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, Action)> {
        self.choices.iter().map(|(state, &action)| (state, action))
    }
}

impl FromIterator<(StateKey, Action)> for ActionChoice {
    fn from_iter<I: IntoIterator<Item = (StateKey, Action)>>(iter: I) -> Self {
        Self {
            choices: iter.into_iter().collect(),
        }
    }
}

/// Turns a value table into an [`ActionChoice`] over visited states.
///
/// Legal actions come from the reachable [`StateSpace`], never from the
/// table, so a choice is always legal where it is made.
pub struct GreedyPolicyExtractor<'a> {
    space: &'a StateSpace,
}

impl<'a> GreedyPolicyExtractor<'a> {
    pub fn new(space: &'a StateSpace) -> Self {
        Self { space }
    }

    /// Extract the greedy action for every key in `visited`.
    ///
    /// States without legal actions are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnreachableState`] if a key is not a reachable
    /// decision state of the game.
    pub fn extract<'k, I>(&self, table: &ValueTable, visited: I) -> Result<ActionChoice>
    where
        I: IntoIterator<Item = &'k StateKey>,
    {
        let mut choice = ActionChoice::new();
        for state in visited {
            let legal = self
                .space
                .legal_actions(state)
                .ok_or_else(|| Error::UnreachableState {
                    state: state.to_string(),
                })?;
            let action = best_action(table, state, legal);
            if action == INVALID_ACTION {
                warn!("skipping state '{state}' with no legal actions");
                continue;
            }
            choice.insert(state.clone(), action);
        }
        Ok(choice)
    }

    /// Extract over every state the table has recorded a value for.
    pub fn extract_visited(&self, table: &ValueTable) -> Result<ActionChoice> {
        self.extract(table, table.state_keys())
    }
}
