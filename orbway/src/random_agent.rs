//! The uniform random agent.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::agent::Agent;
use crate::error::{Error, Result};
use crate::game_log::GameLog;
use crate::game_move::GameMove;
use crate::state::GameState;

/// Picks uniformly among the legal actions, draws and orb moves.
///
/// The strict policy applies: an empty action or draw set is reported as a
/// rule error instead of being skipped (the orb-move set always contains the
/// no-move option).
pub struct RandomAgent {
    seed: u64,
    rng: SmallRng,
}

impl RandomAgent {
    /// Seed 0 draws a fresh seed from the environment.
    pub fn new() -> RandomAgent {
        RandomAgent::with_seed(0)
    }

    pub fn with_seed(seed: u64) -> RandomAgent {
        let mut agent = RandomAgent {
            seed,
            rng: SmallRng::seed_from_u64(0),
        };
        agent.reseed();
        agent
    }

    fn reseed(&mut self) {
        self.rng = if self.seed == 0 {
            SmallRng::seed_from_u64(rand::random::<u64>())
        } else {
            SmallRng::seed_from_u64(self.seed)
        };
    }

    fn select<'a, T>(&mut self, elements: &'a [T], what: &str) -> Result<&'a T> {
        match elements.len() {
            0 => Err(Error::rule(format!("no possible {what} to select from"))),
            1 => Ok(&elements[0]),
            len => Ok(&elements[self.rng.random_range(0..len)]),
        }
    }
}

impl Default for RandomAgent {
    fn default() -> RandomAgent {
        RandomAgent::new()
    }
}

impl Agent for RandomAgent {
    fn initialize(&mut self, args: &[String]) -> Result<()> {
        for arg in args {
            if let Some(value) = arg.strip_prefix("--seed=") {
                self.seed = value
                    .parse()
                    .map_err(|_| Error::rule(format!("invalid agent seed: {value}")))?;
            } else {
                return Err(Error::rule(format!("unknown random agent option: {arg}")));
            }
        }
        self.reseed();
        Ok(())
    }

    fn configuration_string(&self) -> String {
        if self.seed == 0 {
            "seed = random".to_string()
        } else {
            format!("seed = {}", self.seed)
        }
    }

    fn copy_for_thread(&self) -> Box<dyn Agent> {
        Box::new(RandomAgent::with_seed(self.seed))
    }

    fn next_move(&mut self, state: &GameState, _game_log: &GameLog) -> Result<GameMove> {
        let all_actions = state.all_actions();
        let actions = *self.select(&all_actions, "action")?;
        let after_action = state.after_action(&actions)?;
        let draws = after_action.all_regular_draws();
        let drawn_stone = *self.select(&draws, "draw")?;
        let orb_moves = after_action.all_orb_moves()?;
        let orb_move = *self.select(&orb_moves, "orb move")?;
        Ok(GameMove::new(actions, drawn_stone, orb_move))
    }
}
