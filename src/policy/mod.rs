//! Policy derivation from value tables
//!
//! - [`best_action`] / [`GreedyPolicyExtractor`]: greedy choice with a
//!   later-action-wins tie-break
//! - [`StateSpace`]: every reachable decision state and its legal actions
//! - [`TabularPolicy`] / [`PolicyMaterializer`]: total policies built by
//!   overlaying greedy choices on a uniform baseline

pub mod greedy;
pub mod state_space;
pub mod tabular;

pub use greedy::{ActionChoice, GreedyPolicyExtractor, best_action, best_value};
pub use state_space::{DecisionPoint, StateSpace};
pub use tabular::{OverlayPolicy, Policy, PolicyMaterializer, TabularPolicy};
