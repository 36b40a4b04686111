//! Shared fixtures for the integration tests: tiny games, a scripted
//! learner and a recording observer.

#![allow(dead_code)]

use std::{
    fmt,
    path::Path,
    sync::{Arc, Mutex},
};

use tabular_q::{
    Action, Error, PlayerId, Result, StateKey,
    pipeline::TrainingSummary,
    ports::{EpisodeResult, Game, Observer, State, ValueLearner},
    q_learning::ValueTable,
};

/// Single-player game with two decision states.
///
/// ```text
/// S0 --0--> S1 --{0,1,2}--> T1a / T1b / T1c
///    --1--> T0
/// ```
///
/// Exiting from S0 pays 0.5; from S1 action 2 pays 1, others 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoStepGame;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwoStepState {
    S0,
    S1,
    Exit,
    Done(Action),
}

impl Game for TwoStepGame {
    fn name(&self) -> &str {
        "two_step"
    }

    fn num_players(&self) -> usize {
        1
    }

    fn new_initial_state(&self) -> Box<dyn State> {
        Box::new(TwoStepState::S0)
    }
}

impl fmt::Display for TwoStepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state_key())
    }
}

impl State for TwoStepState {
    fn current_player(&self) -> PlayerId {
        match self {
            TwoStepState::S0 | TwoStepState::S1 => PlayerId::Decision(0),
            _ => PlayerId::Terminal,
        }
    }

    fn legal_actions(&self) -> Vec<Action> {
        match self {
            TwoStepState::S0 => vec![0, 1],
            TwoStepState::S1 => vec![0, 1, 2],
            _ => Vec::new(),
        }
    }

    fn apply_action(&mut self, action: Action) -> Result<()> {
        *self = match (*self, action) {
            (TwoStepState::S0, 0) => TwoStepState::S1,
            (TwoStepState::S0, 1) => TwoStepState::Exit,
            (TwoStepState::S1, 0..=2) => TwoStepState::Done(action),
            _ => {
                return Err(Error::IllegalAction {
                    action,
                    state: self.state_key().into_string(),
                });
            }
        };
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        matches!(self, TwoStepState::Exit | TwoStepState::Done(_))
    }

    fn num_players(&self) -> usize {
        1
    }

    fn returns(&self) -> Vec<f64> {
        match self {
            TwoStepState::Exit => vec![0.5],
            TwoStepState::Done(2) => vec![1.0],
            _ => vec![0.0],
        }
    }

    fn state_key(&self) -> StateKey {
        StateKey::new(match self {
            TwoStepState::S0 => "S0".to_string(),
            TwoStepState::S1 => "S1".to_string(),
            TwoStepState::Exit => "T0".to_string(),
            TwoStepState::Done(action) => format!("T1-{action}"),
        })
    }

    fn clone_box(&self) -> Box<dyn State> {
        Box::new(*self)
    }
}

pub fn key(s: &str) -> StateKey {
    StateKey::new(s)
}

/// One decision per player in turn, each choosing 0 or 1; pays nothing.
#[derive(Debug, Clone, Copy)]
pub struct TurnTakingGame {
    pub players: usize,
}

#[derive(Debug, Clone)]
pub struct TurnTakingState {
    players: usize,
    moves: Vec<Action>,
}

impl Game for TurnTakingGame {
    fn name(&self) -> &str {
        "turn_taking"
    }

    fn num_players(&self) -> usize {
        self.players
    }

    fn new_initial_state(&self) -> Box<dyn State> {
        Box::new(TurnTakingState {
            players: self.players,
            moves: Vec::new(),
        })
    }
}

impl fmt::Display for TurnTakingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "moves {:?}", self.moves)
    }
}

impl State for TurnTakingState {
    fn current_player(&self) -> PlayerId {
        if self.is_terminal() {
            PlayerId::Terminal
        } else {
            PlayerId::Decision(self.moves.len())
        }
    }

    fn legal_actions(&self) -> Vec<Action> {
        if self.is_terminal() { Vec::new() } else { vec![0, 1] }
    }

    fn apply_action(&mut self, action: Action) -> Result<()> {
        if self.is_terminal() || !(0..=1).contains(&action) {
            return Err(Error::IllegalAction {
                action,
                state: self.state_key().into_string(),
            });
        }
        self.moves.push(action);
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.moves.len() == self.players
    }

    fn num_players(&self) -> usize {
        self.players
    }

    fn returns(&self) -> Vec<f64> {
        vec![0.0; self.players]
    }

    fn state_key(&self) -> StateKey {
        let moves: String = self.moves.iter().map(|a| a.to_string()).collect();
        StateKey::new(format!("m:{moves}"))
    }

    fn clone_box(&self) -> Box<dyn State> {
        Box::new(self.clone())
    }
}

/// Root is a simultaneous-move node.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimultaneousGame;

#[derive(Debug, Clone, Copy)]
pub struct SimultaneousState;

impl Game for SimultaneousGame {
    fn name(&self) -> &str {
        "simultaneous"
    }

    fn num_players(&self) -> usize {
        2
    }

    fn new_initial_state(&self) -> Box<dyn State> {
        Box::new(SimultaneousState)
    }
}

impl fmt::Display for SimultaneousState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("simultaneous root")
    }
}

impl State for SimultaneousState {
    fn current_player(&self) -> PlayerId {
        PlayerId::Simultaneous
    }

    fn legal_actions(&self) -> Vec<Action> {
        vec![0, 1]
    }

    fn apply_action(&mut self, _action: Action) -> Result<()> {
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        false
    }

    fn num_players(&self) -> usize {
        2
    }

    fn returns(&self) -> Vec<f64> {
        vec![0.0, 0.0]
    }

    fn state_key(&self) -> StateKey {
        StateKey::new("sim")
    }

    fn clone_box(&self) -> Box<dyn State> {
        Box::new(*self)
    }
}

/// Learner whose table gains one entry per episode; optionally fails on a
/// given episode.
pub struct ScriptedLearner {
    episodes: usize,
    fail_on: Option<usize>,
    table: ValueTable,
}

impl ScriptedLearner {
    pub fn new() -> Self {
        Self {
            episodes: 0,
            fail_on: None,
            table: ValueTable::new(),
        }
    }

    pub fn failing_on(episode: usize) -> Self {
        Self {
            fail_on: Some(episode),
            ..Self::new()
        }
    }

    pub fn episodes(&self) -> usize {
        self.episodes
    }
}

impl ValueLearner for ScriptedLearner {
    fn run_iteration(&mut self) -> Result<EpisodeResult> {
        if self.fail_on == Some(self.episodes + 1) {
            return Err(Error::NoLegalActions {
                state: "broken".to_string(),
            });
        }
        self.episodes += 1;
        self.table = ValueTable::from_entries(
            (0..self.episodes).map(|i| (StateKey::new(format!("s{i:04}")), 0, i as f64)),
        );
        Ok(EpisodeResult {
            returns: vec![1.0, -1.0],
            steps: 1,
            terminal: true,
        })
    }

    fn value_table(&self) -> &ValueTable {
        &self.table
    }

    fn best_action_from_state(&self, _key: &StateKey) -> Action {
        0
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Shared list of observed events as short strings like `checkpoint 10`.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Arc<Mutex<Vec<String>>>,
    pub stop_at: Option<usize>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stopping_at(episode: usize) -> Self {
        Self {
            stop_at: Some(episode),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Events other than `episode n`.
    pub fn milestones(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|event| !event.starts_with("episode"))
            .collect()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Observer for RecordingObserver {
    fn on_training_start(&mut self, total_episodes: Option<usize>) -> Result<()> {
        self.push(format!("start {total_episodes:?}"));
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, _result: &EpisodeResult) -> Result<()> {
        self.push(format!("episode {episode}"));
        Ok(())
    }

    fn on_checkpoint(&mut self, episode: usize, _path: &Path) -> Result<()> {
        self.push(format!("checkpoint {episode}"));
        Ok(())
    }

    fn on_evaluation(&mut self, episode: usize, _metric: f64) -> Result<()> {
        self.push(format!("evaluate {episode}"));
        Ok(())
    }

    fn on_training_end(&mut self, summary: &TrainingSummary) -> Result<()> {
        self.push(format!("end {}", summary.episodes));
        Ok(())
    }

    fn should_stop(&self, episode: usize) -> bool {
        self.stop_at.is_some_and(|stop| episode >= stop)
    }
}

/// Metric returning the table size, for cadence tests.
pub struct TableSizeMetric;

impl tabular_q::pipeline::ConvergenceMetric for TableSizeMetric {
    fn name(&self) -> &str {
        "table_size"
    }

    fn evaluate(&mut self, learner: &dyn ValueLearner) -> Result<f64> {
        Ok(learner.value_table().len() as f64)
    }
}
