//! Ports (trait boundaries) for external collaborators.
//!
//! The harness core depends only on these traits. Games, learners,
//! observers, bots and checkpoint storage are adapters plugged in from
//! outside.

pub mod bot;
pub mod game;
pub mod learner;
pub mod observer;
pub mod repository;

pub use bot::Bot;
pub use game::{Game, State};
pub use learner::{EpisodeResult, ValueLearner};
pub use observer::Observer;
pub use repository::ValueTableRepository;
