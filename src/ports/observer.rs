//! Observer port - abstraction for training observation
//!
//! Observers receive training events without the loop knowing how they are
//! reported. Every method defaults to a no-op.
//!
//! # Event Sequence
//!
//! 1. `on_training_start(total_episodes)` - once
//! 2. per episode: `on_episode_end`, then `on_checkpoint` and
//!    `on_evaluation` on their cadence
//! 3. `on_training_end(summary)` - once, after the final checkpoint

use std::path::Path;

use crate::{Result, pipeline::TrainingSummary, ports::learner::EpisodeResult};

pub trait Observer: Send {
    /// `total_episodes` is `None` for open-ended runs.
    fn on_training_start(&mut self, _total_episodes: Option<usize>) -> Result<()> {
        Ok(())
    }

    /// `episode` counts completed episodes, starting at 1.
    fn on_episode_end(&mut self, _episode: usize, _result: &EpisodeResult) -> Result<()> {
        Ok(())
    }

    fn on_checkpoint(&mut self, _episode: usize, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn on_evaluation(&mut self, _episode: usize, _metric: f64) -> Result<()> {
        Ok(())
    }

    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        Ok(())
    }

    /// Polled after every episode; returning `true` ends the run.
    ///
    /// This is the only way an open-ended run terminates.
    fn should_stop(&self, _episode: usize) -> bool {
        false
    }
}
