//! Per-game history: the sequence of turns with their pre-move states.

use crate::game_move::GameMove;
use crate::player::Player;
use crate::rating::RatingAdjustment;
use crate::state::GameState;

/// One turn: the acting player, the state it acted on (normalized so the
/// active player is index 0) and the move it chose. The final log entry
/// carries the end state and no move.
#[derive(Clone, Debug)]
pub struct GameTurn {
    pub turn: usize,
    pub active_player: Player,
    pub state: GameState,
    pub game_move: GameMove,
}

/// The complete log of one game.
#[derive(Clone, Debug, Default)]
pub struct GameLog {
    turns: Vec<GameTurn>,
}

const USUAL_MAX_TURNS: usize = 256;

impl GameLog {
    pub fn new() -> GameLog {
        GameLog::default()
    }

    pub fn turns(&self) -> &[GameTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn add_turn(
        &mut self,
        turn: usize,
        active_player: Player,
        state: GameState,
        game_move: GameMove,
    ) {
        if self.turns.is_empty() {
            self.turns.reserve(USUAL_MAX_TURNS);
        }
        self.turns.push(GameTurn {
            turn,
            active_player,
            state,
            game_move,
        });
    }

    /// Close the log with the final state and no move.
    pub fn add_last_state(&mut self, turn: usize, active_player: Player, state: GameState) {
        self.turns.push(GameTurn {
            turn,
            active_player,
            state,
            game_move: GameMove::default(),
        });
    }

    /// The actual winning player, mapped back from the final state's
    /// normalized frame via the player that executed the winning move.
    pub fn winning_player(&self) -> Option<Player> {
        if self.turns.len() < 2 {
            return None;
        }
        let last_state = &self.turns[self.turns.len() - 1].state;
        let state_winner = last_state.winning_player()?;
        let acting = self.turns[self.turns.len() - 2].active_player;
        Some(acting.offset_with(state_winner))
    }

    /// The per-turn rating adjustments for this game.
    pub fn create_rating_adjustments(&self) -> Vec<RatingAdjustment> {
        let winning_player = self.winning_player();
        let total_turn_count = self.len();
        self.turns
            .iter()
            .map(|turn| RatingAdjustment::for_turn(turn, total_turn_count, winning_player))
            .collect()
    }
}
