//! CLI infrastructure for the tabular Q-learning harness
//!
//! A single command trains a learner, writes its value table and then plays
//! with the result.

pub mod commands;
pub mod output;
