//! Play-outs of trained bots: self-play scoring and interactive games

use std::io::Write;

use log::debug;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{Bot, EpisodeResult, Game, State},
    types::{Action, PlayerId},
    utils::{build_rng, resolve_chance},
};

/// Per-player rewards over a batch of self-play episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub episodes: usize,
    pub total_rewards: Vec<f64>,
    pub mean_rewards: Vec<f64>,
}

/// Runs complete episodes with a seeded source for chance nodes.
pub struct EvaluationLoop {
    rng: StdRng,
}

impl EvaluationLoop {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: build_rng(seed),
        }
    }

    /// `bot` acts for every decision player in each of `episodes` games.
    ///
    /// # Errors
    ///
    /// Propagates bot and game errors; simultaneous nodes are unsupported.
    pub fn self_play(
        &mut self,
        game: &dyn Game,
        bot: &mut dyn Bot,
        episodes: usize,
    ) -> Result<EvaluationResult> {
        let mut total_rewards = vec![0.0; game.num_players()];
        for episode in 0..episodes {
            let result = self.play(game, |_, state| bot.step(state), |_, _| Ok(()))?;
            for (total, value) in total_rewards.iter_mut().zip(&result.returns) {
                *total += value;
            }
            debug!("evaluation episode {}: {:?}", episode + 1, result.returns);
        }
        let mean_rewards = total_rewards
            .iter()
            .map(|total| if episodes == 0 { 0.0 } else { total / episodes as f64 })
            .collect();
        Ok(EvaluationResult {
            episodes,
            total_rewards,
            mean_rewards,
        })
    }

    /// One game alternating control between `human` and `agent` by player
    /// index.
    ///
    /// After each decision the acting player and the resulting state are
    /// written to `out` as `Player {p}` and `Next state:\n{state}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedPlayer`] at a decision node owned by a
    /// player that is neither `human_player` nor `agent_player`, or at a
    /// simultaneous-move node.
    pub fn interactive(
        &mut self,
        game: &dyn Game,
        human: &mut dyn Bot,
        human_player: usize,
        agent: &mut dyn Bot,
        agent_player: usize,
        out: &mut dyn Write,
    ) -> Result<EpisodeResult> {
        if human_player == agent_player {
            return Err(Error::InvalidConfiguration {
                message: format!("human and agent both control player {human_player}"),
            });
        }
        let result = self.play(
            game,
            |player, state| {
                if player == human_player {
                    human.step(state)
                } else if player == agent_player {
                    agent.step(state)
                } else {
                    Err(Error::UnsupportedPlayer {
                        player: player.to_string(),
                        context: format!(
                            "interactive play only controls players {human_player} and {agent_player}"
                        ),
                    })
                }
            },
            |player, state| {
                writeln!(out, "Player {player}")
                    .and_then(|()| writeln!(out, "Next state:\n{state}"))
                    .map_err(|source| Error::Io {
                        operation: "write interactive move".to_string(),
                        source,
                    })
            },
        )?;
        writeln!(out, "Returns: {:?}", result.returns).map_err(|source| Error::Io {
            operation: "write interactive result".to_string(),
            source,
        })?;
        Ok(result)
    }

    fn play<C, A>(&mut self, game: &dyn Game, mut choose: C, mut after: A) -> Result<EpisodeResult>
    where
        C: FnMut(usize, &dyn State) -> Result<Action>,
        A: FnMut(usize, &dyn State) -> Result<()>,
    {
        let mut result = EpisodeResult::new(game.num_players());
        let mut state = game.new_initial_state();
        loop {
            resolve_chance(&mut state, &mut self.rng)?;
            let player = match state.current_player() {
                PlayerId::Terminal => break,
                PlayerId::Decision(player) => player,
                other => {
                    return Err(Error::UnsupportedPlayer {
                        player: other.to_string(),
                        context: "evaluation only plays sequential games".to_string(),
                    });
                }
            };
            let action = choose(player, &*state)?;
            state.apply_action(action)?;
            result.accumulate(&state.rewards());
            result.steps += 1;
            after(player, &*state)?;
        }
        result.terminal = true;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{games::TicTacToe, pipeline::bots::RandomBot};

    #[test]
    fn test_self_play_rewards_are_zero_sum() {
        let mut evaluation = EvaluationLoop::new(Some(4));
        let mut bot = RandomBot::new(Some(4));
        let result = evaluation.self_play(&TicTacToe::new(), &mut bot, 25).unwrap();
        assert_eq!(result.episodes, 25);
        assert!((result.total_rewards[0] + result.total_rewards[1]).abs() < 1e-12);
        assert!((result.mean_rewards[0] - result.total_rewards[0] / 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_same_controller_for_both_players_rejected() {
        let mut evaluation = EvaluationLoop::new(Some(1));
        let mut a = RandomBot::new(Some(1));
        let mut b = RandomBot::new(Some(2));
        let mut out = Vec::new();
        assert!(matches!(
            evaluation.interactive(&TicTacToe::new(), &mut a, 0, &mut b, 0, &mut out),
            Err(Error::InvalidConfiguration { .. })
        ));
    }
}
