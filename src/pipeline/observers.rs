//! Observer implementations for the training loop
//!
//! Observers allow composable reporting during training without coupling the
//! loop to specific output formats.

use std::{io::Write, path::Path};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};

use super::training::TrainingSummary;
use crate::{
    Error, Result,
    ports::{EpisodeResult, Observer},
};

/// Progress bar observer - Shows training progress
///
/// Open-ended runs get a spinner instead of a bar.
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    last_metric: Option<f64>,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            last_metric: None,
        }
    }

    fn message(&self) -> String {
        match self.last_metric {
            Some(metric) => format!("metric {metric:.4}"),
            None => String::new(),
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

fn template_error(e: impl std::fmt::Display) -> Error {
    Error::ProgressBarTemplate {
        message: e.to_string(),
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: Option<usize>) -> Result<()> {
        let pb = match total_episodes {
            Some(total) => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes {msg}")
                        .map_err(template_error)?
                        .progress_chars("=>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("[{elapsed_precise}] {spinner} {pos} episodes {msg}")
                        .map_err(template_error)?,
                );
                pb
            }
        };
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, _result: &EpisodeResult) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode as u64);
        }
        Ok(())
    }

    fn on_evaluation(&mut self, _episode: usize, metric: f64) -> Result<()> {
        self.last_metric = Some(metric);
        if let Some(pb) = &self.progress_bar {
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Writes one line per evaluation: `episode {n}: {label} {metric}`.
pub struct ReportObserver<W> {
    label: String,
    writer: W,
}

impl<W: Write + Send> ReportObserver<W> {
    pub fn new(label: impl Into<String>, writer: W) -> Self {
        Self {
            label: label.into(),
            writer,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl ReportObserver<std::io::Stdout> {
    pub fn stdout(label: impl Into<String>) -> Self {
        Self::new(label, std::io::stdout())
    }
}

impl<W: Write + Send> Observer for ReportObserver<W> {
    fn on_evaluation(&mut self, episode: usize, metric: f64) -> Result<()> {
        writeln!(self.writer, "episode {episode}: {} {metric:.6}", self.label).map_err(
            |source| Error::Io {
                operation: "write evaluation report".to_string(),
                source,
            },
        )
    }
}

/// Forwards loop events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_training_start(&mut self, total_episodes: Option<usize>) -> Result<()> {
        info!("training started, budget {total_episodes:?}");
        Ok(())
    }

    fn on_checkpoint(&mut self, episode: usize, path: &Path) -> Result<()> {
        debug!("checkpoint at episode {episode}: {path:?}");
        Ok(())
    }

    fn on_evaluation(&mut self, episode: usize, metric: f64) -> Result<()> {
        info!("episode {episode}: metric {metric}");
        Ok(())
    }

    fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
        info!(
            "training ended after {} episodes, mean returns {:?}",
            summary.episodes, summary.mean_returns
        );
        Ok(())
    }
}

/// Requests a stop once `episodes` have completed.
///
/// The natural terminator for open-ended runs.
#[derive(Debug, Clone, Copy)]
pub struct StopAfter {
    episodes: usize,
}

impl StopAfter {
    pub fn new(episodes: usize) -> Self {
        Self { episodes }
    }
}

impl Observer for StopAfter {
    fn should_stop(&self, episode: usize) -> bool {
        episode >= self.episodes
    }
}

/// Requests a stop once an evaluation reaches `target` or below.
#[derive(Debug, Clone, Copy)]
pub struct StopAtMetric {
    target: f64,
    reached: bool,
}

impl StopAtMetric {
    pub fn new(target: f64) -> Self {
        Self {
            target,
            reached: false,
        }
    }
}

impl Observer for StopAtMetric {
    fn on_evaluation(&mut self, episode: usize, metric: f64) -> Result<()> {
        if metric <= self.target && !self.reached {
            info!("metric {metric} reached target {} at episode {episode}", self.target);
            self.reached = true;
        }
        Ok(())
    }

    fn should_stop(&self, _episode: usize) -> bool {
        self.reached
    }
}
