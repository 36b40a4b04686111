//! Catch
//!
//! A single-player game on a `rows x columns` grid. A chance node drops the
//! ball into a uniformly random column of the top row; every player action
//! then moves the paddle (left, stay, right) along the bottom row while the
//! ball falls one row. Catching the ball pays +1, missing it -1.

use std::fmt;

use crate::{
    Error, Result,
    ports::game::{Game, State},
    types::{Action, PlayerId, StateKey},
};

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLUMNS: usize = 5;

/// Paddle moves one column left.
pub const LEFT: Action = 0;
/// Paddle stays put.
pub const STAY: Action = 1;
/// Paddle moves one column right.
pub const RIGHT: Action = 2;

#[derive(Debug, Clone, Copy)]
pub struct Catch {
    rows: usize,
    columns: usize,
}

impl Catch {
    pub const NAME: &'static str = "catch";

    pub fn new() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            columns: DEFAULT_COLUMNS,
        }
    }

    /// Custom grid size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the grid has fewer than two
    /// rows or no columns.
    pub fn with_size(rows: usize, columns: usize) -> Result<Self> {
        if rows < 2 || columns == 0 {
            return Err(Error::InvalidConfiguration {
                message: format!("catch grid must be at least 2x1, got {rows}x{columns}"),
            });
        }
        Ok(Self { rows, columns })
    }
}

impl Default for Catch {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for Catch {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn num_players(&self) -> usize {
        1
    }

    fn new_initial_state(&self) -> Box<dyn State> {
        Box::new(CatchState::new(self.rows, self.columns))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatchState {
    rows: usize,
    columns: usize,
    ball: Option<(usize, usize)>,
    paddle: usize,
}

impl CatchState {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            ball: None,
            paddle: columns / 2,
        }
    }

    /// `(row, column)` of the ball once it has been dropped.
    pub fn ball(&self) -> Option<(usize, usize)> {
        self.ball
    }

    pub fn paddle(&self) -> usize {
        self.paddle
    }

    fn cell_char(&self, row: usize, column: usize) -> char {
        if self.ball == Some((row, column)) {
            'o'
        } else if row == self.rows - 1 && column == self.paddle {
            'x'
        } else {
            '.'
        }
    }

    fn row_string(&self, row: usize) -> String {
        (0..self.columns).map(|c| self.cell_char(row, c)).collect()
    }

    fn illegal(&self, action: Action) -> Error {
        Error::IllegalAction {
            action,
            state: self.state_key().into_string(),
        }
    }
}

impl State for CatchState {
    fn current_player(&self) -> PlayerId {
        match self.ball {
            None => PlayerId::Chance,
            Some(_) if self.is_terminal() => PlayerId::Terminal,
            Some(_) => PlayerId::Decision(0),
        }
    }

    fn legal_actions(&self) -> Vec<Action> {
        match self.current_player() {
            PlayerId::Chance => (0..self.columns as Action).collect(),
            PlayerId::Decision(_) => vec![LEFT, STAY, RIGHT],
            _ => Vec::new(),
        }
    }

    fn apply_action(&mut self, action: Action) -> Result<()> {
        match (self.current_player(), self.ball) {
            (PlayerId::Chance, _) => {
                let column = usize::try_from(action)
                    .ok()
                    .filter(|&c| c < self.columns)
                    .ok_or_else(|| self.illegal(action))?;
                self.ball = Some((0, column));
            }
            (PlayerId::Decision(_), Some((row, column))) => {
                self.paddle = match action {
                    LEFT => self.paddle.saturating_sub(1),
                    STAY => self.paddle,
                    RIGHT => (self.paddle + 1).min(self.columns - 1),
                    _ => return Err(self.illegal(action)),
                };
                self.ball = Some((row + 1, column));
            }
            _ => return Err(self.illegal(action)),
        }
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        matches!(self.ball, Some((row, _)) if row == self.rows - 1)
    }

    fn num_players(&self) -> usize {
        1
    }

    fn returns(&self) -> Vec<f64> {
        match self.ball {
            Some((row, column)) if row == self.rows - 1 => {
                vec![if column == self.paddle { 1.0 } else { -1.0 }]
            }
            _ => vec![0.0],
        }
    }

    /// Grid rows joined by `/`, top row first.
    fn state_key(&self) -> StateKey {
        let rows: Vec<String> = (0..self.rows).map(|r| self.row_string(r)).collect();
        StateKey::new(rows.join("/"))
    }

    fn chance_outcomes(&self) -> Vec<(Action, f64)> {
        if self.current_player() != PlayerId::Chance {
            return Vec::new();
        }
        let probability = 1.0 / self.columns as f64;
        (0..self.columns as Action)
            .map(|column| (column, probability))
            .collect()
    }

    fn clone_box(&self) -> Box<dyn State> {
        Box::new(*self)
    }
}

impl fmt::Display for CatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<String> = (0..self.rows).map(|r| self.row_string(r)).collect();
        f.write_str(&rows.join("\n"))
    }
}
