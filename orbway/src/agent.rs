//! The agent interface and the agent registry.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::game_log::GameLog;
use crate::game_move::GameMove;
use crate::player::Player;
use crate::state::GameState;

/// A player driving one seat of a simulated game.
///
/// `next_move` always sees the state normalized so the agent is player 0.
/// Each worker thread plays with its own copies obtained through
/// [`Agent::copy_for_thread`], so an implementation only has to be consistent
/// within one thread.
pub trait Agent: Send {
    /// Parse agent-specific arguments. Called once before the first game.
    fn initialize(&mut self, args: &[String]) -> Result<()> {
        if let Some(arg) = args.first() {
            return Err(crate::error::Error::rule(format!(
                "unknown agent option: {arg}"
            )));
        }
        Ok(())
    }

    /// A one-line description of the configuration, shown at startup.
    fn configuration_string(&self) -> String {
        String::new()
    }

    /// Create an independent copy for a worker thread.
    fn copy_for_thread(&self) -> Box<dyn Agent>;

    /// Called before a new game starts.
    fn game_start(&mut self) {}

    /// Choose the next move for the given state and game history.
    fn next_move(&mut self, state: &GameState, game_log: &GameLog) -> Result<GameMove>;

    /// Called after a game ended with the complete log.
    fn game_end(&mut self, _game_log: &GameLog) {}

    /// Release any held resources; called once per copy at shutdown.
    fn shutdown(&mut self) {}
}

/// One agent per seat.
pub type PlayerAgents = [Box<dyn Agent>; Player::COUNT as usize];

type AgentFactory = Box<dyn Fn() -> Box<dyn Agent>>;

/// Name → factory map for the configured agent implementations.
#[derive(Default)]
pub struct AgentRegistry {
    factories: BTreeMap<String, AgentFactory>,
}

impl AgentRegistry {
    pub fn new() -> AgentRegistry {
        AgentRegistry::default()
    }

    pub fn add(&mut self, name: &str, factory: impl Fn() -> Box<dyn Agent> + 'static) {
        debug_assert!(!self.factories.contains_key(name));
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Agent>> {
        self.factories.get(name).map(|factory| factory())
    }
}
