//! Fixed game parameters: board dimensions, pool sizes and the stone
//! multisets of the starting position.

use crate::stone::Stone;

/// Total side length of the board, including the frame.
pub const BOARD_SIZE: u8 = 10;

/// Offset from the top-left corner to the first source field.
pub const SOURCE_OFFSET: u8 = 4;

/// Number of slots in a player's action pool.
pub const ACTION_POOL_SIZE: usize = 6;

/// Total number of orbs in the game, in play or spare.
pub const ORB_COUNT: usize = 9;

/// Orbs required in the house to win.
pub const ORB_COUNT_TO_WIN: u8 = 3;

/// Repetitions of an already-seen state before a game counts as a draw.
pub const LOOP_COUNT_FOR_DRAW: usize = 10;

/// The shared resource pool at game start, as (count, stone) pairs.
pub const RESOURCE_POOL_STONES: [(u8, Stone); 7] = [
    (20, Stone::Crossing),
    (20, Stone::TwoCurves),
    (8, Stone::CrossingWithStop),
    (8, Stone::SwitchA),
    (8, Stone::SwitchB),
    (8, Stone::SwitchC),
    (8, Stone::CurveWithBounces),
];

/// Each player's action pool at game start, drawn from the resource pool.
pub const ACTION_POOL_STONES: [(u8, Stone); 3] = [
    (3, Stone::Crossing),
    (2, Stone::TwoCurves),
    (1, Stone::CrossingWithStop),
];
