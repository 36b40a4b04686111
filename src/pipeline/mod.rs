//! Training and evaluation pipeline
//!
//! This module provides:
//! - [`TrainingLoop`]: episodes, checkpoints and convergence evaluation
//! - [`EvaluationLoop`]: self-play scoring and interactive games
//! - Bots and observers plugged into both

pub mod bots;
pub mod convergence;
pub mod evaluation;
pub mod observers;
pub mod training;

pub use bots::{GreedyBot, HumanBot, PolicyBot, RandomBot};
pub use convergence::{ConvergenceMetric, ExploitabilityEvaluator};
pub use evaluation::{EvaluationLoop, EvaluationResult};
pub use observers::{LogObserver, ProgressObserver, ReportObserver, StopAfter, StopAtMetric};
pub use training::{Phase, TrainingConfig, TrainingLoop, TrainingSummary};

pub use crate::ports::{Observer, ValueLearner};
