//! The canonical game state and its transitions.
//!
//! A state is the tuple (board, action pools, orb positions, resource pool).
//! The active player is always pool index 0; rotating the state by +90°
//! hands the board to the next player. All stones in the system form a fixed
//! multiset that moves between the board, the hands and the reserve but is
//! never created or destroyed.

use std::fmt;

use crate::action::ActionSequence;
use crate::action_generator::ActionGenerator;
use crate::board::Board;
use crate::error::{Error, Result};
use crate::game_move::GameMove;
use crate::orb_move::OrbMove;
use crate::orb_move_generator::OrbMoveGenerator;
use crate::orbs::OrbPositions;
use crate::player::Player;
use crate::pool::{ActionPools, ResourcePool};
use crate::position::Position;
use crate::rotation::Rotation;
use crate::serial::{check_size, Serial};
use crate::setup::{ACTION_POOL_STONES, ORB_COUNT_TO_WIN, RESOURCE_POOL_STONES};
use crate::stone::Stone;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GameState {
    board: Board,
    action_pools: ActionPools,
    orb_positions: OrbPositions,
    resource_pool: ResourcePool,
}

impl GameState {
    pub const PREFIX: &'static str = "S1:";

    /// The fixed initial state: source orbs placed, hands seeded, the rest of
    /// the stones in the reserve.
    pub fn starting_state() -> GameState {
        let mut state = GameState::default();
        for (count, stone) in RESOURCE_POOL_STONES {
            state.resource_pool.add(stone, count);
        }
        for player in Player::all() {
            for (count, stone) in ACTION_POOL_STONES {
                for _ in 0..count {
                    state
                        .move_stone_to_player(stone, player)
                        .expect("starting setup must be consistent");
                }
            }
        }
        for pos in Board::source_orb_positions() {
            state
                .orb_positions
                .move_orb(Position::INVALID, *pos)
                .expect("source fields must be free");
        }
        state
    }

    // ── accessors ───────────────────────────────────────────────────

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn action_pools(&self) -> &ActionPools {
        &self.action_pools
    }

    pub fn action_pools_mut(&mut self) -> &mut ActionPools {
        &mut self.action_pools
    }

    pub fn orb_positions(&self) -> &OrbPositions {
        &self.orb_positions
    }

    pub fn orb_positions_mut(&mut self) -> &mut OrbPositions {
        &mut self.orb_positions
    }

    pub fn resource_pool(&self) -> &ResourcePool {
        &self.resource_pool
    }

    pub fn resource_pool_mut(&mut self) -> &mut ResourcePool {
        &mut self.resource_pool
    }

    // ── win detection ───────────────────────────────────────────────

    /// Orbs in each player's house, indexed in the current frame.
    pub fn orbs_in_house(&self) -> [u8; Player::COUNT as usize] {
        let mut result = [0; Player::COUNT as usize];
        for player in Player::all() {
            for pos in Board::house_orb_positions(player) {
                if self.orb_positions.is_orb_at(*pos) {
                    result[player.index()] += 1;
                }
            }
        }
        result
    }

    pub fn has_winner(&self) -> bool {
        self.orbs_in_house()
            .iter()
            .any(|count| *count >= ORB_COUNT_TO_WIN)
    }

    /// The winning player in the current frame, if any.
    pub fn winning_player(&self) -> Option<Player> {
        let orbs = self.orbs_in_house();
        Player::all()
            .into_iter()
            .find(|player| orbs[player.index()] >= ORB_COUNT_TO_WIN)
    }

    // ── transitions ─────────────────────────────────────────────────

    /// Execute a full move for the active player: count down the ko-locks,
    /// apply the actions, take the regular draw, move the orb.
    pub fn execute_move(&mut self, game_move: &GameMove) -> Result<()> {
        self.next_turn();
        game_move.actions().apply_to(self)?;
        if !game_move.drawn_stone().is_empty() {
            self.move_stone_to_player(game_move.drawn_stone(), Player::new(0))?;
        }
        if !game_move.orb_move().is_no_move() {
            game_move.orb_move().apply_to(self)?;
        }
        Ok(())
    }

    /// The state after applying just an action sequence.
    pub fn after_action(&self, actions: &ActionSequence) -> Result<GameState> {
        let mut state = *self;
        actions.apply_to(&mut state)?;
        Ok(state)
    }

    /// The state after a full move.
    pub fn after_move(&self, game_move: &GameMove) -> Result<GameState> {
        let mut state = *self;
        state.execute_move(game_move)?;
        Ok(state)
    }

    /// Count down every field and orb ko-lock by one turn.
    pub fn next_turn(&mut self) {
        self.board.next_turn();
        self.orb_positions.next_turn();
    }

    /// The state rotated clockwise: board content, hands and orbs move so
    /// the next player sits at the top-left corner.
    pub fn rotated(&self, rotation: Rotation) -> GameState {
        GameState {
            board: self.board.rotated(rotation),
            action_pools: self.action_pools.rotated(rotation),
            orb_positions: self.orb_positions.rotated(rotation),
            resource_pool: self.resource_pool,
        }
    }

    /// Rotate a state normalized to `player` back into the original frame.
    pub fn rotated_for_player(&self, player: Player) -> GameState {
        self.rotated(Rotation::from_quarter_turns(-(player.value() as i8)))
    }

    // ── move generation ─────────────────────────────────────────────

    /// All legal action sequences for the active player.
    pub fn all_actions(&self) -> Vec<ActionSequence> {
        ActionGenerator::new(self).all()
    }

    /// All stones available for the regular draw after the actions of the
    /// move have been applied.
    pub fn all_regular_draws(&self) -> Vec<Stone> {
        if self.action_pools.active().is_full() {
            return Vec::new();
        }
        self.resource_pool.all_regular_draws()
    }

    /// All legal orb moves, the no-move option first.
    pub fn all_orb_moves(&self) -> Result<Vec<OrbMove>> {
        OrbMoveGenerator::new(self).all_moves()
    }

    /// Every legal full move: action sequences combined with the draws and
    /// orb moves available after them.
    pub fn all_moves(&self) -> Result<Vec<GameMove>> {
        let mut moves = Vec::new();
        for actions in self.all_actions() {
            let after_action = self.after_action(&actions)?;
            let draws = after_action.all_regular_draws();
            let orb_moves = after_action.all_orb_moves()?;
            for draw in &draws {
                for orb_move in &orb_moves {
                    moves.push(GameMove::new(actions, *draw, *orb_move));
                }
            }
        }
        Ok(moves)
    }

    fn move_stone_to_player(&mut self, stone: Stone, player: Player) -> Result<()> {
        if !self.resource_pool.has_stone(stone) {
            return Err(Error::rule(format!(
                "no {stone} left in the resource pool to draw"
            )));
        }
        if self.action_pools.get(player).is_full() {
            return Err(Error::rule("the action pool is full for the regular draw"));
        }
        self.resource_pool.take(stone, 1)?;
        self.action_pools.get_mut(player).add(stone)
    }

    /// Total stones owned anywhere: board, hands and reserve. Constant over
    /// the course of a game.
    pub fn total_stone_count(&self) -> usize {
        let mut count = self.resource_pool.total();
        for player in Player::all() {
            count += self.action_pools.get(player).stone_count();
        }
        for pos in Board::all_non_static_positions() {
            if !self.board.field(*pos).is_empty() {
                count += 1;
            }
        }
        count
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GameState {{")?;
        writeln!(f, "  data: {:?}", self.to_data())?;
        writeln!(f, "  orbs_in_house: {:?}", self.orbs_in_house())?;
        write!(f, "}}")
    }
}

impl Serial for GameState {
    const DATA_SIZE: usize = 3
        + Board::DATA_SIZE
        + ActionPools::DATA_SIZE
        + OrbPositions::DATA_SIZE
        + ResourcePool::DATA_SIZE;

    fn write_data(&self, data: &mut String) {
        data.push_str(Self::PREFIX);
        self.board.write_data(data);
        self.action_pools.write_data(data);
        self.orb_positions.write_data(data);
        self.resource_pool.write_data(data);
    }

    fn from_data(data: &str) -> Result<GameState> {
        check_size("GameState", data, Self::DATA_SIZE)?;
        if &data[..3] != Self::PREFIX {
            return Err(Error::invariant("GameState: invalid data prefix"));
        }
        let board_end = 3 + Board::DATA_SIZE;
        let pools_end = board_end + ActionPools::DATA_SIZE;
        let orbs_end = pools_end + OrbPositions::DATA_SIZE;
        Ok(GameState {
            board: Board::from_data(&data[3..board_end])?,
            action_pools: ActionPools::from_data(&data[board_end..pools_end])?,
            orb_positions: OrbPositions::from_data(&data[pools_end..orbs_end])?,
            resource_pool: ResourcePool::from_data(&data[orbs_end..])?,
        })
    }
}
