//! Game port - the rules engine the harness trains and plays against
//!
//! The harness never inspects game internals. Everything it needs, from
//! legal-move enumeration to terminal rewards, goes through these traits so
//! new games plug in without touching the training or policy code.

use std::fmt;

use crate::{
    Result,
    types::{Action, PlayerId, StateKey},
};

/// A finite game with an enumerable state space.
pub trait Game: Send + Sync {
    /// Registry name of the game.
    fn name(&self) -> &str;

    /// Number of decision-making players.
    fn num_players(&self) -> usize;

    /// Fresh state at the root of the game.
    fn new_initial_state(&self) -> Box<dyn State>;
}

/// A single position of a [`Game`].
///
/// `Display` must produce a stable, human-readable dump of the state; it is
/// what interactive play shows after every move.
pub trait State: fmt::Display + Send {
    /// Who acts at this state.
    fn current_player(&self) -> PlayerId;

    /// Legal actions in ascending order. Empty at terminal states.
    ///
    /// At chance nodes these are the chance outcomes.
    fn legal_actions(&self) -> Vec<Action>;

    /// Apply an action in place.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IllegalAction`] when `action` is not legal here.
    fn apply_action(&mut self, action: Action) -> Result<()>;

    fn is_terminal(&self) -> bool;

    /// Number of decision-making players.
    fn num_players(&self) -> usize;

    /// Cumulative return per player so far (final utilities at terminal).
    fn returns(&self) -> Vec<f64>;

    /// Reward per player from the most recent transition.
    ///
    /// The default suits games that only pay out at the end.
    fn rewards(&self) -> Vec<f64> {
        if self.is_terminal() {
            self.returns()
        } else {
            vec![0.0; self.num_players()]
        }
    }

    /// Canonical identity of the full state.
    fn state_key(&self) -> StateKey;

    /// Identity of the state as observed by `player`.
    ///
    /// Perfect-information games keep the default, which is the state key.
    fn information_state_key(&self, _player: usize) -> StateKey {
        self.state_key()
    }

    /// Outcome distribution at chance nodes, empty elsewhere.
    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        Vec::new()
    }

    fn clone_box(&self) -> Box<dyn State>;

    /// Copy of this state with `action` applied.
    fn child(&self, action: Action) -> Result<Box<dyn State>> {
        let mut next = self.clone_box();
        next.apply_action(action)?;
        Ok(next)
    }
}

impl Clone for Box<dyn State> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
