//! A complete move: an action sequence, the regular draw, and an orb move.

use std::fmt;

use crate::action::ActionSequence;
use crate::error::{Error, Result};
use crate::orb_move::OrbMove;
use crate::serial::{check_size, Serial};
use crate::stone::Stone;

/// One player's full move for a turn.
///
/// `drawn_stone == Empty` means no regular draw was possible; an orb move
/// with start == stop means the orb stays put.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct GameMove {
    actions: ActionSequence,
    drawn_stone: Stone,
    orb_move: OrbMove,
}

impl GameMove {
    pub const PREFIX: &'static str = "M1:";

    pub fn new(actions: ActionSequence, drawn_stone: Stone, orb_move: OrbMove) -> GameMove {
        GameMove {
            actions,
            drawn_stone,
            orb_move,
        }
    }

    pub fn is_no_move(&self) -> bool {
        self.actions.has_no_actions()
    }

    pub fn actions(&self) -> &ActionSequence {
        &self.actions
    }

    pub fn drawn_stone(&self) -> Stone {
        self.drawn_stone
    }

    pub fn orb_move(&self) -> OrbMove {
        self.orb_move
    }
}

impl fmt::Display for GameMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameMove({}, Draw(", self.actions)?;
        if !self.drawn_stone.is_empty() {
            write!(f, "{}", self.drawn_stone)?;
        }
        write!(f, "), {})", self.orb_move)
    }
}

impl Serial for GameMove {
    const DATA_SIZE: usize =
        3 + ActionSequence::DATA_SIZE + Stone::DATA_SIZE + OrbMove::DATA_SIZE;

    fn write_data(&self, data: &mut String) {
        data.push_str(Self::PREFIX);
        self.actions.write_data(data);
        self.drawn_stone.write_data(data);
        self.orb_move.write_data(data);
    }

    fn from_data(data: &str) -> Result<GameMove> {
        check_size("GameMove", data, Self::DATA_SIZE)?;
        if &data[..3] != Self::PREFIX {
            return Err(Error::invariant("GameMove: invalid data prefix"));
        }
        let actions_end = 3 + ActionSequence::DATA_SIZE;
        Ok(GameMove {
            actions: ActionSequence::from_data(&data[3..actions_end])?,
            drawn_stone: Stone::from_data(&data[actions_end..actions_end + 1])?,
            orb_move: OrbMove::from_data(&data[actions_end + 1..])?,
        })
    }
}
