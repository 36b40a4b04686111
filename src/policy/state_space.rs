//! Enumeration of every reachable decision state of a game

use std::collections::{BTreeMap, HashSet};

use crate::{
    Error, Result,
    ports::game::{Game, State},
    types::{Action, PlayerId, StateKey},
};

/// A reachable state where a player has to choose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionPoint {
    /// Index of the player to move
    pub player: usize,
    /// Legal actions in the game's order
    pub legal_actions: Vec<Action>,
}

/// All reachable decision states, keyed by the acting player's
/// information-state key.
///
/// Terminal and chance states are traversed but never recorded, so no policy
/// built from a `StateSpace` can contain them.
#[derive(Debug, Clone, Default)]
pub struct StateSpace {
    points: BTreeMap<StateKey, DecisionPoint>,
    terminal_states: usize,
}

impl StateSpace {
    /// Walk the full game tree from the initial state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlayer`] on simultaneous-move nodes and
    /// propagates failures from applying legal actions.
    pub fn enumerate(game: &dyn Game) -> Result<Self> {
        let mut space = StateSpace::default();
        let mut seen = HashSet::new();
        let mut stack: Vec<Box<dyn State>> = vec![game.new_initial_state()];

        while let Some(state) = stack.pop() {
            if !seen.insert(state.state_key()) {
                continue;
            }
            if state.is_terminal() {
                space.terminal_states += 1;
                continue;
            }

            let legal = state.legal_actions();
            match state.current_player() {
                PlayerId::Decision(player) => {
                    if !legal.is_empty() {
                        space
                            .points
                            .entry(state.information_state_key(player))
                            .or_insert_with(|| DecisionPoint {
                                player,
                                legal_actions: legal.clone(),
                            });
                    }
                }
                PlayerId::Chance => {}
                other => {
                    return Err(Error::UnsupportedPlayer {
                        player: other.to_string(),
                        context: format!(
                            "cannot enumerate states of '{}' through state '{}'",
                            game.name(),
                            state.state_key()
                        ),
                    });
                }
            }

            for action in legal {
                stack.push(state.child(action)?);
            }
        }

        Ok(space)
    }

    pub fn get(&self, state: &StateKey) -> Option<&DecisionPoint> {
        self.points.get(state)
    }

    pub fn legal_actions(&self, state: &StateKey) -> Option<&[Action]> {
        self.points
            .get(state)
            .map(|point| point.legal_actions.as_slice())
    }

    pub fn contains(&self, state: &StateKey) -> bool {
        self.points.contains_key(state)
    }

    /// Number of decision states.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distinct terminal states seen during enumeration.
    pub fn terminal_states(&self) -> usize {
        self.terminal_states
    }

    /// Decision states in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &DecisionPoint)> {
        self.points.iter()
    }
}
