//! Sparse (state, action) value table

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{Action, StateKey};

/// Q-value that any unrecorded (state, action) pair reads as.
pub const DEFAULT_VALUE: f64 = 0.0;

/// Sparse mapping from (state key, action) to an expected-return estimate.
///
/// Reads of unrecorded pairs return [`DEFAULT_VALUE`]; a recorded zero and a
/// missing entry are distinguishable through [`ValueTable::contains`].
/// Only the value-update algorithm and the checkpoint reader write to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueTable {
    values: HashMap<StateKey, BTreeMap<Action, f64>>,
}

impl ValueTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from explicit `(state, action, value)` entries.
    ///
    /// Later duplicates overwrite earlier ones.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (StateKey, Action, f64)>,
    {
        entries.into_iter().collect()
    }

    /// Value of `action` at `state`, or [`DEFAULT_VALUE`] when unrecorded.
    pub fn get(&self, state: &StateKey, action: Action) -> f64 {
        self.values
            .get(state)
            .and_then(|actions| actions.get(&action))
            .copied()
            .unwrap_or(DEFAULT_VALUE)
    }

    /// Whether a value was ever recorded for the pair.
    pub fn contains(&self, state: &StateKey, action: Action) -> bool {
        self.values
            .get(state)
            .is_some_and(|actions| actions.contains_key(&action))
    }

    /// Number of recorded (state, action) pairs.
    pub fn len(&self) -> usize {
        self.values.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keys of every state with at least one recorded value.
    pub fn state_keys(&self) -> impl Iterator<Item = &StateKey> {
        self.values.keys()
    }

    /// Recorded `(action, value)` pairs for one state, in action order.
    pub fn actions_for(&self, state: &StateKey) -> impl Iterator<Item = (Action, f64)> + '_ {
        self.values
            .get(state)
            .into_iter()
            .flat_map(|actions| actions.iter().map(|(&action, &value)| (action, value)))
    }

    /// Every recorded entry, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, Action, f64)> {
        self.values.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(&action, &value)| (state, action, value))
        })
    }

    /// Every recorded entry sorted by state key, then action.
    pub fn sorted_entries(&self) -> Vec<(&StateKey, Action, f64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|(s1, a1, _), (s2, a2, _)| s1.cmp(s2).then(a1.cmp(a2)));
        entries
    }

    /// Mutable slot for a pair, recording [`DEFAULT_VALUE`] if absent.
    pub(crate) fn value_mut(&mut self, state: &StateKey, action: Action) -> &mut f64 {
        self.values
            .entry(state.clone())
            .or_default()
            .entry(action)
            .or_insert(DEFAULT_VALUE)
    }

    pub(crate) fn insert(&mut self, state: StateKey, action: Action, value: f64) {
        self.values.entry(state).or_default().insert(action, value);
    }
}

impl FromIterator<(StateKey, Action, f64)> for ValueTable {
    fn from_iter<I: IntoIterator<Item = (StateKey, Action, f64)>>(iter: I) -> Self {
        let mut table = ValueTable::new();
        for (state, action, value) in iter {
            table.insert(state, action, value);
        }
        table
    }
}
