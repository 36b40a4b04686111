//! Analysis tools for learned policies
//!
//! - [`exploitability`]: NashConv and exploitability via best response
//! - [`trend`]: smoothing and trend checks for metric histories

pub mod exploitability;
pub mod trend;

pub use exploitability::{best_response_values, expected_returns, exploitability, nash_conv};
pub use trend::{is_non_increasing_trend, moving_average, smoothed_change};
