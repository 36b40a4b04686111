//! Exploitability of a joint policy
//!
//! For each player `p`, `BR_p` is the value `p` achieves by best-responding
//! while everyone else follows the policy, and `V_p` is the value when all
//! players follow it:
//!
//! ```text
//! NashConv       = Σ_p (BR_p - V_p)
//! exploitability = NashConv / num_players
//! ```
//!
//! A Nash equilibrium scores 0. The best response is computed by exhaustive
//! tree search memoized on state keys, which is exact for perfect-information
//! games such as those bundled with this crate.

use std::collections::HashMap;

use crate::{
    Error, Result,
    policy::Policy,
    ports::game::{Game, State},
    types::{PlayerId, StateKey},
};

/// Cache of subtree values keyed by state key.
type Memo = HashMap<StateKey, f64>;

/// Expected return of every player when all of them follow `policy`.
///
/// # Errors
///
/// Returns [`Error::MissingPolicyEntry`] for a reachable decision node the
/// policy does not cover.
pub fn expected_returns(game: &dyn Game, policy: &dyn Policy) -> Result<Vec<f64>> {
    let root = game.new_initial_state();
    (0..game.num_players())
        .map(|player| {
            let mut memo = Memo::new();
            on_policy_value(&*root, player, policy, &mut memo)
        })
        .collect()
}

/// Value each player obtains with a best response against `policy`.
///
/// # Errors
///
/// Same conditions as [`expected_returns`].
pub fn best_response_values(game: &dyn Game, policy: &dyn Policy) -> Result<Vec<f64>> {
    let root = game.new_initial_state();
    (0..game.num_players())
        .map(|player| {
            let mut memo = Memo::new();
            best_response_value(&*root, player, policy, &mut memo)
        })
        .collect()
}

/// Total incentive to deviate, summed over players. Never negative.
///
/// # Errors
///
/// Same conditions as [`expected_returns`].
pub fn nash_conv(game: &dyn Game, policy: &dyn Policy) -> Result<f64> {
    let on_policy = expected_returns(game, policy)?;
    let best = best_response_values(game, policy)?;
    let total: f64 = best.iter().zip(&on_policy).map(|(br, v)| br - v).sum();
    Ok(total.max(0.0))
}

/// [`nash_conv`] averaged over players.
///
/// # Errors
///
/// Same conditions as [`expected_returns`].
pub fn exploitability(game: &dyn Game, policy: &dyn Policy) -> Result<f64> {
    let players = game.num_players().max(1);
    Ok(nash_conv(game, policy)? / players as f64)
}

fn terminal_value(state: &dyn State, player: usize) -> f64 {
    state.returns().get(player).copied().unwrap_or(0.0)
}

fn chance_value<F>(state: &dyn State, mut child_value: F) -> Result<f64>
where
    F: FnMut(&dyn State) -> Result<f64>,
{
    let mut outcomes = state.chance_outcomes();
    if outcomes.is_empty() {
        let legal = state.legal_actions();
        let probability = 1.0 / legal.len().max(1) as f64;
        outcomes = legal.into_iter().map(|a| (a, probability)).collect();
    }
    let mut value = 0.0;
    for (action, probability) in outcomes {
        if probability > 0.0 {
            value += probability * child_value(&*state.child(action)?)?;
        }
    }
    Ok(value)
}

fn policy_value<F>(
    state: &dyn State,
    acting: usize,
    policy: &dyn Policy,
    mut child_value: F,
) -> Result<f64>
where
    F: FnMut(&dyn State) -> Result<f64>,
{
    let key = state.information_state_key(acting);
    let probabilities =
        policy
            .action_probabilities(&key)
            .ok_or_else(|| Error::MissingPolicyEntry {
                state: key.into_string(),
            })?;
    let mut value = 0.0;
    for (action, probability) in probabilities {
        if probability > 0.0 {
            value += probability * child_value(&*state.child(action)?)?;
        }
    }
    Ok(value)
}

fn unsupported(state: &dyn State) -> Error {
    Error::UnsupportedPlayer {
        player: state.current_player().to_string(),
        context: "exploitability needs sequential decision nodes".to_string(),
    }
}

fn on_policy_value(
    state: &dyn State,
    player: usize,
    policy: &dyn Policy,
    memo: &mut Memo,
) -> Result<f64> {
    let key = state.state_key();
    if let Some(&value) = memo.get(&key) {
        return Ok(value);
    }
    let value = match state.current_player() {
        PlayerId::Terminal => terminal_value(state, player),
        PlayerId::Chance => {
            chance_value(state, |child| on_policy_value(child, player, policy, memo))?
        }
        PlayerId::Decision(acting) => policy_value(state, acting, policy, |child| {
            on_policy_value(child, player, policy, memo)
        })?,
        PlayerId::Simultaneous => return Err(unsupported(state)),
    };
    memo.insert(key, value);
    Ok(value)
}

fn best_response_value(
    state: &dyn State,
    player: usize,
    policy: &dyn Policy,
    memo: &mut Memo,
) -> Result<f64> {
    let key = state.state_key();
    if let Some(&value) = memo.get(&key) {
        return Ok(value);
    }
    let value = match state.current_player() {
        PlayerId::Terminal => terminal_value(state, player),
        PlayerId::Chance => {
            chance_value(state, |child| best_response_value(child, player, policy, memo))?
        }
        PlayerId::Decision(acting) if acting == player => {
            let mut best = f64::NEG_INFINITY;
            for action in state.legal_actions() {
                let child = state.child(action)?;
                best = best.max(best_response_value(&*child, player, policy, memo)?);
            }
            if best.is_finite() { best } else { 0.0 }
        }
        PlayerId::Decision(acting) => policy_value(state, acting, policy, |child| {
            best_response_value(child, player, policy, memo)
        })?,
        PlayerId::Simultaneous => return Err(unsupported(state)),
    };
    memo.insert(key, value);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        games::{
            Catch, TicTacToe,
            catch::{LEFT, RIGHT, STAY},
        },
        policy::{StateSpace, TabularPolicy},
        types::{Action, ActionsAndProbs},
    };

    /// Moves the paddle toward the ball, parsed from the catch key.
    struct ChaseBall;

    impl Policy for ChaseBall {
        fn action_probabilities(&self, state: &StateKey) -> Option<ActionsAndProbs> {
            let rows: Vec<&str> = state.as_str().split('/').collect();
            let ball = rows.iter().find_map(|row| row.find('o'))?;
            let paddle = rows.last()?.find('x')?;
            let action: Action = match ball.cmp(&paddle) {
                std::cmp::Ordering::Less => LEFT,
                std::cmp::Ordering::Equal => STAY,
                std::cmp::Ordering::Greater => RIGHT,
            };
            Some(vec![(action, 1.0)])
        }
    }

    #[test]
    fn test_optimal_catch_policy_is_unexploitable() {
        let game = Catch::with_size(4, 3).unwrap();
        assert_eq!(expected_returns(&game, &ChaseBall).unwrap(), vec![1.0]);
        assert!(exploitability(&game, &ChaseBall).unwrap().abs() < 1e-12);
    }

    #[test]
    fn test_uniform_catch_policy_is_exploitable() {
        let game = Catch::with_size(4, 3).unwrap();
        let uniform = TabularPolicy::uniform(&StateSpace::enumerate(&game).unwrap());
        assert_eq!(best_response_values(&game, &uniform).unwrap(), vec![1.0]);
        let value = expected_returns(&game, &uniform).unwrap()[0];
        assert!(value < 1.0);
        let expected = 1.0 - value;
        assert!((exploitability(&game, &uniform).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_tic_tac_toe_is_exploitable() {
        let game = TicTacToe::new();
        let uniform = TabularPolicy::uniform(&StateSpace::enumerate(&game).unwrap());
        let conv = nash_conv(&game, &uniform).unwrap();
        assert!(conv > 0.5);
        assert!((exploitability(&game, &uniform).unwrap() - conv / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_entry_reported() {
        let game = TicTacToe::new();
        let empty = TabularPolicy::default();
        assert!(matches!(
            exploitability(&game, &empty),
            Err(Error::MissingPolicyEntry { .. })
        ));
    }
}
