//! Bundled games and the name registry used by the CLI

use std::sync::Arc;

use crate::{Error, Result, ports::Game};

pub mod catch;
pub mod tictactoe;

pub use catch::{Catch, CatchState};
pub use tictactoe::{TicTacToe, TicTacToeState};

/// Names accepted by [`load_game`].
pub const GAME_NAMES: [&str; 2] = [TicTacToe::NAME, Catch::NAME];

/// Look up a bundled game by name.
///
/// # Errors
///
/// Returns [`Error::UnknownGame`] for names outside [`GAME_NAMES`].
pub fn load_game(name: &str) -> Result<Arc<dyn Game>> {
    match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        TicTacToe::NAME | "tictactoe" => Ok(Arc::new(TicTacToe::new())),
        Catch::NAME => Ok(Arc::new(Catch::new())),
        _ => Err(Error::UnknownGame {
            name: name.to_string(),
            expected: GAME_NAMES.join(", "),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_known_games() {
        assert_eq!(load_game("tic_tac_toe").unwrap().name(), TicTacToe::NAME);
        assert_eq!(load_game("Tic-Tac-Toe").unwrap().name(), TicTacToe::NAME);
        assert_eq!(load_game("catch").unwrap().num_players(), 1);
    }

    #[test]
    fn test_unknown_game_is_an_error() {
        assert!(matches!(
            load_game("chess"),
            Err(Error::UnknownGame { .. })
        ));
    }
}
