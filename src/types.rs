//! Core identifiers shared by the value table, policies and games.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Game-specific action identifier.
///
/// Actions are only meaningful together with the state they are legal in.
pub type Action = i64;

/// Sentinel returned when a state has no legal action to choose.
pub const INVALID_ACTION: Action = -1;

/// Probability distribution over actions, in the game's legal-action order.
pub type ActionsAndProbs = Vec<(Action, f64)>;

/// Canonical identity of a game state used for value and policy lookups.
///
/// Two states with equal keys are the same state as far as the value table
/// and every policy are concerned.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateKey(String);

impl StateKey {
    /// Wrap a key produced by a game implementation.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Parse a key read from external input such as a checkpoint file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedStateKey`] if the key is empty or
    /// spans more than one line.
    pub fn parse(value: &str) -> Result<Self, crate::Error> {
        if value.is_empty() {
            return Err(crate::Error::MalformedStateKey {
                key: value.to_string(),
                reason: "key is empty".to_string(),
            });
        }
        if value.contains(['\n', '\r']) {
            return Err(crate::Error::MalformedStateKey {
                key: value.to_string(),
                reason: "key contains a line break".to_string(),
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for StateKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StateKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StateKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Who acts at a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    /// A regular decision-making player, indexed from zero.
    Decision(usize),
    /// Nature samples from the state's chance outcomes.
    Chance,
    /// All players act at once.
    Simultaneous,
    /// The game is over.
    Terminal,
}

impl PlayerId {
    /// Index of the deciding player, if this is a decision node.
    pub fn decision_index(self) -> Option<usize> {
        match self {
            PlayerId::Decision(player) => Some(player),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerId::Decision(player) => write!(f, "{player}"),
            PlayerId::Chance => f.write_str("chance"),
            PlayerId::Simultaneous => f.write_str("simultaneous"),
            PlayerId::Terminal => f.write_str("terminal"),
        }
    }
}
