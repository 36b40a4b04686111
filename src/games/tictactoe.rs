//! Tic-Tac-Toe
//!
//! Player 0 plays `x` and moves first, player 1 plays `o`. Actions are cell
//! indices 0-8 in row-major order. The winner receives +1, the loser -1 and a
//! draw pays 0 to both.

use std::fmt;

use crate::{
    Error, Result,
    ports::game::{Game, State},
    types::{Action, PlayerId, StateKey},
};

/// Winning line indices on the 3x3 board
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// A cell on the Tic-Tac-Toe board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Cross,
    Nought,
}

impl Cell {
    pub fn to_char(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Cross => 'x',
            Cell::Nought => 'o',
        }
    }

    fn for_player(player: usize) -> Cell {
        if player == 0 { Cell::Cross } else { Cell::Nought }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToe;

impl TicTacToe {
    pub const NAME: &'static str = "tic_tac_toe";

    pub fn new() -> Self {
        Self
    }
}

impl Game for TicTacToe {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn num_players(&self) -> usize {
        2
    }

    fn new_initial_state(&self) -> Box<dyn State> {
        Box::new(TicTacToeState::new())
    }
}

/// Board plus the player to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicTacToeState {
    cells: [Cell; 9],
    to_move: usize,
    winner: Option<usize>,
    moves_made: usize,
}

impl TicTacToeState {
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; 9],
            to_move: 0,
            winner: None,
            moves_made: 0,
        }
    }

    pub fn cell(&self, position: usize) -> Cell {
        self.cells[position]
    }

    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    fn has_won(&self, player: usize) -> bool {
        let target = Cell::for_player(player);
        WINNING_LINES
            .iter()
            .any(|line| line.iter().all(|&idx| self.cells[idx] == target))
    }
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

impl State for TicTacToeState {
    fn current_player(&self) -> PlayerId {
        if self.is_terminal() {
            PlayerId::Terminal
        } else {
            PlayerId::Decision(self.to_move)
        }
    }

    fn legal_actions(&self) -> Vec<Action> {
        if self.is_terminal() {
            return Vec::new();
        }
        (0..9)
            .filter(|&pos| self.cells[pos] == Cell::Empty)
            .map(|pos| pos as Action)
            .collect()
    }

    fn apply_action(&mut self, action: Action) -> Result<()> {
        let position = usize::try_from(action)
            .ok()
            .filter(|&pos| pos < 9 && self.cells[pos] == Cell::Empty && !self.is_terminal())
            .ok_or_else(|| Error::IllegalAction {
                action,
                state: self.state_key().into_string(),
            })?;

        self.cells[position] = Cell::for_player(self.to_move);
        self.moves_made += 1;
        if self.has_won(self.to_move) {
            self.winner = Some(self.to_move);
        }
        self.to_move = 1 - self.to_move;
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.winner.is_some() || self.moves_made == 9
    }

    fn num_players(&self) -> usize {
        2
    }

    fn returns(&self) -> Vec<f64> {
        match self.winner {
            Some(0) => vec![1.0, -1.0],
            Some(_) => vec![-1.0, 1.0],
            None => vec![0.0, 0.0],
        }
    }

    /// Nine cell characters, row-major. The board determines whose turn it
    /// is, so no player suffix is needed.
    fn state_key(&self) -> StateKey {
        StateKey::new(self.cells.iter().map(|c| c.to_char()).collect::<String>())
    }

    fn clone_box(&self) -> Box<dyn State> {
        Box::new(*self)
    }
}

impl fmt::Display for TicTacToeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            let line: String = self.cells[row * 3..row * 3 + 3]
                .iter()
                .map(|c| c.to_char())
                .collect();
            if row < 2 {
                writeln!(f, "{line}")?;
            } else {
                write!(f, "{line}")?;
            }
        }
        Ok(())
    }
}
