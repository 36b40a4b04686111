//! Bot port - anything that picks an action at a decision node.

use crate::{Result, ports::game::State, types::Action};

/// Chooses actions for whichever player it is asked to play.
///
/// Implementations range from greedy table lookups to a blocking human
/// prompt.
pub trait Bot {
    /// Pick a legal action for the player to move in `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if no legal action can be produced.
    fn step(&mut self, state: &dyn State) -> Result<Action>;

    fn name(&self) -> &str;
}
