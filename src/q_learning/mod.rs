//! Tabular temporal-difference learning
//!
//! [`TabularQLearningSolver`] learns action values by self-play and stores
//! them in a sparse [`ValueTable`]. TD methods bootstrap value estimates from
//! successor states:
//!
//! Q(s,a) ← Q(s,a) + α[r + γ·max_a' Q(s',a') - Q(s,a)]
//!
//! ## Usage Example
//!
//! ```no_run
//! use tabular_q::games::load_game;
//! use tabular_q::ports::ValueLearner;
//! use tabular_q::q_learning::{SolverConfig, TabularQLearningSolver};
//!
//! let game = load_game("tic_tac_toe")?;
//! let mut solver = TabularQLearningSolver::new(game, SolverConfig::default().with_seed(1))?;
//! for _ in 0..1000 {
//!     solver.run_iteration()?;
//! }
//! println!("{} values learned", solver.value_table().len());
//! # Ok::<(), tabular_q::Error>(())
//! ```

pub mod solver;
pub mod value_table;

pub use solver::{SolverConfig, TabularQLearningSolver};
pub use value_table::{DEFAULT_VALUE, ValueTable};
