//! The rating backend interface, the backend registry and the in-memory
//! reference backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::game_log::GameLog;
use crate::rating::GameRating;
use crate::serial::Serial;
use crate::state::GameState;

/// A store accumulating per-state ratings from finished games.
///
/// `add_game` and `status` are called concurrently from the simulation
/// workers and the status thread; implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Parse backend-specific arguments. Called once before `load`.
    fn initialize(&mut self, args: &[String]) -> Result<()> {
        if let Some(arg) = args.first() {
            return Err(Error::rule(format!("unknown backend option: {arg}")));
        }
        Ok(())
    }

    /// Log the active configuration at startup.
    fn display_configuration(&self) {}

    /// Open the store and load or create previous data.
    fn load(&self) -> Result<()> {
        Ok(())
    }

    /// Fold one finished game into the store.
    fn add_game(&self, game_log: &GameLog) -> Result<()>;

    /// A one-line status for the status display.
    fn status(&self) -> String {
        "OK".to_string()
    }

    /// Flush and release the store. Called after all workers stopped.
    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

type BackendFactory = Box<dyn Fn() -> Box<dyn Backend>>;

/// Name → factory map for the configured backend implementations.
#[derive(Default)]
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
}

impl BackendRegistry {
    pub fn new() -> BackendRegistry {
        BackendRegistry::default()
    }

    pub fn add(&mut self, name: &str, factory: impl Fn() -> Box<dyn Backend> + 'static) {
        debug_assert!(!self.factories.contains_key(name));
        self.factories.insert(name.to_string(), Box::new(factory));
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn create(&self, name: &str) -> Option<Box<dyn Backend>> {
        self.factories.get(name).map(|factory| factory())
    }
}

/// The in-memory backend: a mutex-guarded map from serialized state to its
/// accumulated rating.
#[derive(Default)]
pub struct MemoryBackend {
    game_states: Mutex<HashMap<GameState, GameRating>>,
}

impl MemoryBackend {
    pub fn new() -> MemoryBackend {
        MemoryBackend::default()
    }

    /// Number of distinct states seen so far.
    pub fn state_count(&self) -> usize {
        self.game_states.lock().expect("rating map poisoned").len()
    }

    /// Sum of `rating_count` over all states; equals the sum of the log
    /// lengths of all added games.
    pub fn total_rating_count(&self) -> u64 {
        self.game_states
            .lock()
            .expect("rating map poisoned")
            .values()
            .map(GameRating::rating_count)
            .sum()
    }

    /// Look up the rating of a state, if present.
    pub fn rating_for(&self, state: &GameState) -> Option<GameRating> {
        self.game_states
            .lock()
            .expect("rating map poisoned")
            .get(state)
            .copied()
    }
}

impl Backend for MemoryBackend {
    fn add_game(&self, game_log: &GameLog) -> Result<()> {
        if game_log.is_empty() {
            return Ok(());
        }
        let adjustments = game_log.create_rating_adjustments();
        if adjustments.len() != game_log.len() {
            return Err(Error::invariant(
                "rating adjustments do not match the game log size",
            ));
        }
        let mut game_states = self.game_states.lock().expect("rating map poisoned");
        for (turn, adjustment) in game_log.turns().iter().zip(&adjustments) {
            game_states
                .entry(turn.state)
                .or_default()
                .apply_adjustment(adjustment);
        }
        Ok(())
    }

    fn status(&self) -> String {
        format!(
            "OK: {} states",
            self.game_states.lock().expect("rating map poisoned").len()
        )
    }
}

/// One upsert of a persistence batch: the serialized state plus its
/// adjustment.
#[derive(Clone, Debug)]
pub struct StateUpdate {
    pub state_data: String,
    pub adjustment: crate::rating::RatingAdjustment,
}

/// One finished game as a batch of per-turn upserts, applied atomically.
pub type UpdateBatch = Vec<StateUpdate>;

/// Build the update batch for one finished game.
pub fn update_batch_for(game_log: &GameLog) -> UpdateBatch {
    let adjustments = game_log.create_rating_adjustments();
    game_log
        .turns()
        .iter()
        .zip(adjustments)
        .map(|(turn, adjustment)| StateUpdate {
            state_data: turn.state.to_data(),
            adjustment,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_move::GameMove;
    use crate::player::Player;

    fn small_log() -> GameLog {
        let mut log = GameLog::new();
        let state = GameState::starting_state();
        log.add_turn(0, Player::new(0), state, GameMove::default());
        log.add_last_state(1, Player::new(1), state);
        log
    }

    #[test]
    fn add_game_counts_every_turn() {
        let backend = MemoryBackend::new();
        backend.add_game(&small_log()).unwrap();
        backend.add_game(&small_log()).unwrap();
        // Both turns carry the same state: one entry, four ratings.
        assert_eq!(backend.state_count(), 1);
        assert_eq!(backend.total_rating_count(), 4);
        let rating = backend
            .rating_for(&GameState::starting_state())
            .expect("state must be rated");
        assert_eq!(rating.rating_count(), 4);
    }

    #[test]
    fn empty_logs_are_ignored() {
        let backend = MemoryBackend::new();
        backend.add_game(&GameLog::new()).unwrap();
        assert_eq!(backend.state_count(), 0);
    }

    #[test]
    fn update_batches_serialize_states() {
        let batch = update_batch_for(&small_log());
        assert_eq!(batch.len(), 2);
        for update in &batch {
            assert!(update.state_data.starts_with("S1:"));
            assert_eq!(update.state_data.len(), GameState::DATA_SIZE);
        }
    }
}
