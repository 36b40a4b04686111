//! Tabular Q-learning harness
//!
//! This crate provides:
//! - A sparse (state, action) value table and a tabular Q-learning solver
//! - Greedy policy extraction and overlay onto a uniform baseline policy
//! - Training and evaluation loops with checkpointing and exploitability
//! - Bundled games (tic-tac-toe, catch) behind a game-agnostic port

pub mod adapters;
pub mod analysis;
pub mod cli;
pub mod error;
pub mod games;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod q_learning;
pub mod types;
pub mod utils;

pub use error::{Error, Result};
pub use types::{Action, INVALID_ACTION, PlayerId, StateKey};
