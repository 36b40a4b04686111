//! tabular-q - train a tabular Q-learner by self-play, then play against it
//!
//! With no flags: trains tic-tac-toe for 1000 episodes, prints the
//! exploitability every 10 episodes, writes `q_table.csv` and starts an
//! interactive game with the human as player 0.

use anyhow::Result;
use clap::Parser;
use tabular_q::cli::commands::run::{RunArgs, execute};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    execute(RunArgs::parse())
}
