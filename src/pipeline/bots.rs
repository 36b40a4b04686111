//! Bots: table, policy, random and human action selection

use std::io::{BufRead, Write};

use rand::{Rng, rngs::StdRng};

use crate::{
    Error, Result,
    policy::{Policy, best_action},
    ports::{Bot, State},
    q_learning::ValueTable,
    types::{Action, INVALID_ACTION},
    utils::{build_rng, weighted_sample},
};

fn acting_player(state: &dyn State) -> Result<usize> {
    state
        .current_player()
        .decision_index()
        .ok_or_else(|| Error::UnsupportedPlayer {
            player: state.current_player().to_string(),
            context: "bots only act at decision nodes".to_string(),
        })
}

fn no_legal_actions(state: &dyn State) -> Error {
    Error::NoLegalActions {
        state: state.state_key().into_string(),
    }
}

/// Greedy lookup in a state-keyed value table at decision time.
pub struct GreedyBot<'a> {
    table: &'a ValueTable,
}

impl<'a> GreedyBot<'a> {
    pub fn new(table: &'a ValueTable) -> Self {
        Self { table }
    }
}

impl Bot for GreedyBot<'_> {
    fn step(&mut self, state: &dyn State) -> Result<Action> {
        acting_player(state)?;
        let action = best_action(self.table, &state.state_key(), &state.legal_actions());
        if action == INVALID_ACTION {
            return Err(no_legal_actions(state));
        }
        Ok(action)
    }

    fn name(&self) -> &str {
        "greedy"
    }
}

/// Samples a precomputed policy at the acting player's information state.
pub struct PolicyBot<P> {
    policy: P,
    rng: StdRng,
}

impl<P: Policy> PolicyBot<P> {
    pub fn new(policy: P, seed: Option<u64>) -> Self {
        Self {
            policy,
            rng: build_rng(seed),
        }
    }
}

impl<P: Policy> Bot for PolicyBot<P> {
    fn step(&mut self, state: &dyn State) -> Result<Action> {
        let player = acting_player(state)?;
        let key = state.information_state_key(player);
        let distribution =
            self.policy
                .action_probabilities(&key)
                .ok_or_else(|| Error::MissingPolicyEntry {
                    state: key.to_string(),
                })?;
        weighted_sample(&mut self.rng, &distribution).ok_or_else(|| no_legal_actions(state))
    }

    fn name(&self) -> &str {
        "policy"
    }
}

/// Uniformly random legal actions.
pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: build_rng(seed),
        }
    }
}

impl Bot for RandomBot {
    fn step(&mut self, state: &dyn State) -> Result<Action> {
        acting_player(state)?;
        let legal = state.legal_actions();
        if legal.is_empty() {
            return Err(no_legal_actions(state));
        }
        Ok(legal[self.rng.random_range(0..legal.len())])
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Reads action ids from a line-oriented input, re-prompting until one is
/// legal.
pub struct HumanBot<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> HumanBot<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, legal: &[Action]) -> Result<()> {
        let listed: Vec<String> = legal.iter().map(Action::to_string).collect();
        write!(
            self.output,
            "Choose an action ({}): ",
            listed.join(" ")
        )
        .and_then(|()| self.output.flush())
        .map_err(|source| Error::Io {
            operation: "write move prompt".to_string(),
            source,
        })
    }

    fn reject(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "Illegal action '{line}', try again.").map_err(|source| Error::Io {
            operation: "write move prompt".to_string(),
            source,
        })
    }
}

impl HumanBot<std::io::StdinLock<'static>, std::io::Stdout> {
    /// Prompts on stdout, reads from stdin.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> Bot for HumanBot<R, W> {
    /// # Errors
    ///
    /// Returns [`Error::InputClosed`] once the input reaches end of file.
    fn step(&mut self, state: &dyn State) -> Result<Action> {
        acting_player(state)?;
        let legal = state.legal_actions();
        if legal.is_empty() {
            return Err(no_legal_actions(state));
        }
        writeln!(self.output, "Current state:\n{state}").map_err(|source| Error::Io {
            operation: "write move prompt".to_string(),
            source,
        })?;
        loop {
            self.prompt(&legal)?;
            let mut line = String::new();
            let read = self.input.read_line(&mut line).map_err(|source| Error::Io {
                operation: "read move".to_string(),
                source,
            })?;
            if read == 0 {
                return Err(Error::InputClosed);
            }
            let line = line.trim();
            match line.parse::<Action>() {
                Ok(action) if legal.contains(&action) => return Ok(action),
                _ => self.reject(line)?,
            }
        }
    }

    fn name(&self) -> &str {
        "human"
    }
}
