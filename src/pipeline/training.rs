//! Training loop for value learners
//!
//! One episode per step, with checkpointing and convergence evaluation on
//! fixed cadences. The loop owns no learning logic of its own; it only reads
//! the learner's tables between episodes.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::convergence::ConvergenceMetric;
use crate::{
    Error, Result,
    ports::{EpisodeResult, Observer, ValueLearner, ValueTableRepository},
};

/// Training configuration
///
/// # Examples
///
/// ```
/// use tabular_q::pipeline::TrainingConfig;
///
/// let config = TrainingConfig::default().with_checkpoint_every(100);
/// assert_eq!(config.iterations, Some(1000));
/// assert_eq!(config.evaluate_every, Some(10));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Episode budget; `None` runs until an observer requests a stop
    pub iterations: Option<usize>,

    /// Checkpoint cadence in episodes; `None` writes only the final checkpoint
    pub checkpoint_every: Option<usize>,

    /// Evaluation cadence in episodes; `None` disables evaluation
    pub evaluate_every: Option<usize>,

    /// Checkpoint destination, overwritten on every checkpoint
    pub checkpoint_path: PathBuf,
}

impl TrainingConfig {
    pub const DEFAULT_ITERATIONS: usize = 1000;
    pub const DEFAULT_EVALUATE_EVERY: usize = 10;
    pub const DEFAULT_CHECKPOINT_PATH: &'static str = "q_table.csv";

    pub fn with_iterations(mut self, iterations: Option<usize>) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_checkpoint_every(mut self, episodes: usize) -> Self {
        self.checkpoint_every = Some(episodes);
        self
    }

    pub fn with_evaluate_every(mut self, episodes: Option<usize>) -> Self {
        self.evaluate_every = episodes;
        self
    }

    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = path.into();
        self
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for a zero cadence.
    pub fn validate(&self) -> Result<()> {
        for (name, cadence) in [
            ("checkpoint_every", self.checkpoint_every),
            ("evaluate_every", self.evaluate_every),
        ] {
            if cadence == Some(0) {
                return Err(Error::InvalidConfiguration {
                    message: format!("{name} must be at least 1"),
                });
            }
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: Some(Self::DEFAULT_ITERATIONS),
            checkpoint_every: None,
            evaluate_every: Some(Self::DEFAULT_EVALUATE_EVERY),
            checkpoint_path: PathBuf::from(Self::DEFAULT_CHECKPOINT_PATH),
        }
    }
}

/// Where the loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Training,
    Checkpointing,
    Evaluating,
    Done,
    /// A run returned an error; no further phases follow.
    Failed,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Completed episodes
    pub episodes: usize,

    /// Checkpoints written, including the final one
    pub checkpoints: usize,

    /// `(episode, metric)` for every evaluation, in order
    pub evaluations: Vec<(usize, f64)>,

    /// Recorded (state, action) pairs in the state-keyed table at the end
    pub table_size: usize,

    /// Mean per-player return over all episodes
    pub mean_returns: Vec<f64>,
}

impl TrainingSummary {
    /// Most recent evaluation metric.
    pub fn final_metric(&self) -> Option<f64> {
        self.evaluations.last().map(|&(_, metric)| metric)
    }

    /// Evaluation metrics without their episode numbers.
    pub fn metric_history(&self) -> Vec<f64> {
        self.evaluations.iter().map(|&(_, metric)| metric).collect()
    }

    /// Save summary to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| Error::Io {
            operation: format!("create summary {path:?}"),
            source,
        })?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load summary from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::Io {
            operation: format!("open summary {path:?}"),
            source,
        })?;
        Ok(serde_json::from_reader(file)?)
    }
}

/// Drives a [`ValueLearner`] through its episode budget.
pub struct TrainingLoop {
    config: TrainingConfig,
    repository: Box<dyn ValueTableRepository>,
    metric: Option<Box<dyn ConvergenceMetric>>,
    observers: Vec<Box<dyn Observer>>,
    phase: Phase,
}

impl TrainingLoop {
    pub fn new(config: TrainingConfig, repository: Box<dyn ValueTableRepository>) -> Self {
        Self {
            config,
            repository,
            metric: None,
            observers: Vec::new(),
            phase: Phase::Idle,
        }
    }

    /// Metric computed every `evaluate_every` episodes.
    pub fn with_metric(mut self, metric: Box<dyn ConvergenceMetric>) -> Self {
        self.metric = Some(metric);
        self
    }

    /// Add an observer to the loop
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run the configured number of episodes.
    ///
    /// # Errors
    ///
    /// Any learner failure is wrapped in [`Error::LearnerFailed`] and aborts
    /// the run. Checkpoint, evaluation and observer errors abort it as-is.
    /// After an aborted run [`phase`](Self::phase) is [`Phase::Failed`]; an
    /// invalid configuration is rejected while still [`Phase::Idle`].
    pub fn run(&mut self, learner: &mut dyn ValueLearner) -> Result<TrainingSummary> {
        self.config.validate()?;
        let outcome = self.train(learner);
        if outcome.is_err() {
            self.phase = Phase::Failed;
        }
        outcome
    }

    fn train(&mut self, learner: &mut dyn ValueLearner) -> Result<TrainingSummary> {
        self.phase = Phase::Training;
        info!(
            "training {} for {}",
            learner.name(),
            self.config
                .iterations
                .map_or_else(|| "an open-ended run".to_string(), |n| format!("{n} episodes"))
        );
        for observer in &mut self.observers {
            observer.on_training_start(self.config.iterations)?;
        }

        let mut episode = 0;
        let mut totals: Vec<f64> = Vec::new();
        let mut checkpoints = 0;
        let mut last_checkpoint = None;
        let mut evaluations = Vec::new();

        loop {
            if self.config.iterations.is_some_and(|budget| episode >= budget) {
                break;
            }

            let result = match learner.run_iteration() {
                Ok(result) => result,
                Err(err) => {
                    return Err(Error::LearnerFailed {
                        learner: learner.name().to_string(),
                        episode: episode + 1,
                        message: err.to_string(),
                    });
                }
            };
            episode += 1;
            accumulate(&mut totals, &result);

            for observer in &mut self.observers {
                observer.on_episode_end(episode, &result)?;
            }

            if is_due(self.config.checkpoint_every, episode) {
                self.checkpoint(learner, episode)?;
                checkpoints += 1;
                last_checkpoint = Some(episode);
            }

            if is_due(self.config.evaluate_every, episode) {
                if let Some(metric) = self.metric.as_mut() {
                    self.phase = Phase::Evaluating;
                    let value = metric.evaluate(&*learner)?;
                    debug!("episode {episode}: {} {value}", metric.name());
                    evaluations.push((episode, value));
                    for observer in &mut self.observers {
                        observer.on_evaluation(episode, value)?;
                    }
                }
            }
            self.phase = Phase::Training;

            if self.observers.iter().any(|o| o.should_stop(episode)) {
                info!("stop requested after episode {episode}");
                break;
            }
        }

        if last_checkpoint != Some(episode) {
            self.checkpoint(learner, episode)?;
            checkpoints += 1;
        }

        let mean_returns = if episode == 0 {
            Vec::new()
        } else {
            totals.iter().map(|total| total / episode as f64).collect()
        };
        let summary = TrainingSummary {
            episodes: episode,
            checkpoints,
            evaluations,
            table_size: learner.value_table().len(),
            mean_returns,
        };

        self.phase = Phase::Done;
        for observer in &mut self.observers {
            observer.on_training_end(&summary)?;
        }
        info!(
            "training finished: {} episodes, {} values, {} checkpoints",
            summary.episodes, summary.table_size, summary.checkpoints
        );
        Ok(summary)
    }

    fn checkpoint(&mut self, learner: &dyn ValueLearner, episode: usize) -> Result<()> {
        self.phase = Phase::Checkpointing;
        let path = self.config.checkpoint_path.as_path();
        self.repository.save(learner.value_table(), path)?;
        debug!("episode {episode}: checkpoint written to {path:?}");
        for observer in &mut self.observers {
            observer.on_checkpoint(episode, path)?;
        }
        self.phase = Phase::Training;
        Ok(())
    }
}

fn is_due(cadence: Option<usize>, episode: usize) -> bool {
    cadence.is_some_and(|every| every > 0 && episode % every == 0)
}

fn accumulate(totals: &mut Vec<f64>, result: &EpisodeResult) {
    if totals.len() < result.returns.len() {
        totals.resize(result.returns.len(), 0.0);
    }
    for (total, value) in totals.iter_mut().zip(&result.returns) {
        *total += value;
    }
}
