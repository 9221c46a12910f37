//! Orb tracking.
//!
//! Nine orbs exist; an orb with an INVALID position is a spare. Each orb
//! carries a ko-lock (position + countdown) that forbids moving it straight
//! back to where it came from. The record array is kept sorted by position
//! after every mutation so equal states always compare equal.

use crate::error::{Error, Result};
use crate::position::Position;
use crate::rotation::Rotation;
use crate::serial::{check_size, hex_digit_to_value, value_to_hex_digit, Serial};
use crate::setup::{BOARD_SIZE, ORB_COUNT};

pub const MAX_ORB_KO_LOCK: u8 = 3;

/// One orb: its position plus the ko-lock that guards its last origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrbPosition {
    pub position: Position,
    pub ko_lock: u8,
    pub ko_position: Position,
}

impl Default for OrbPosition {
    fn default() -> OrbPosition {
        OrbPosition {
            position: Position::INVALID,
            ko_lock: 0,
            ko_position: Position::INVALID,
        }
    }
}

impl Serial for OrbPosition {
    const DATA_SIZE: usize = Position::DATA_SIZE + 1 + Position::DATA_SIZE;

    fn write_data(&self, data: &mut String) {
        self.position.write_data(data);
        if self.ko_lock == 0 {
            data.push_str("___");
        } else {
            data.push(value_to_hex_digit(self.ko_lock));
            self.ko_position.write_data(data);
        }
    }

    fn from_data(data: &str) -> Result<OrbPosition> {
        check_size("OrbPosition", data, Self::DATA_SIZE)?;
        let position = Position::from_data(&data[..2])?;
        if data.as_bytes()[2] == b'_' {
            return Ok(OrbPosition {
                position,
                ko_lock: 0,
                ko_position: Position::INVALID,
            });
        }
        Ok(OrbPosition {
            position,
            ko_lock: hex_digit_to_value(data.as_bytes()[2]),
            ko_position: Position::from_data(&data[3..5])?,
        })
    }
}

/// All nine orb records, sorted by position (spares last).
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct OrbPositions {
    positions: [OrbPosition; ORB_COUNT],
}

impl OrbPositions {
    pub fn positions(&self) -> &[OrbPosition; ORB_COUNT] {
        &self.positions
    }

    /// The ko-position of the orb at `orb_position`, INVALID if none.
    pub fn ko_position(&self, orb_position: Position) -> Position {
        self.positions
            .iter()
            .find(|op| op.position == orb_position)
            .map_or(Position::INVALID, |op| op.ko_position)
    }

    pub fn in_game_count(&self) -> usize {
        self.positions
            .iter()
            .position(|op| op.position.is_invalid())
            .unwrap_or(ORB_COUNT)
    }

    pub fn has_spare(&self) -> bool {
        self.in_game_count() < ORB_COUNT
    }

    pub fn is_orb_at(&self, position: Position) -> bool {
        self.positions.iter().any(|op| op.position == position)
    }

    pub fn rotated(&self, rotation: Rotation) -> OrbPositions {
        let mut result = *self;
        for op in &mut result.positions {
            op.position = op.position.rotated(rotation, BOARD_SIZE);
            op.ko_position = op.ko_position.rotated(rotation, BOARD_SIZE);
        }
        result.sort();
        result
    }

    /// Move the orb at `old_position` to `new_position`, arming its ko-lock.
    /// Moving from INVALID brings a spare into play.
    pub fn move_orb(&mut self, old_position: Position, new_position: Position) -> Result<()> {
        if new_position.is_invalid() {
            return Err(Error::rule("orb move: new position is invalid"));
        }
        if self.is_orb_at(new_position) {
            return Err(Error::rule("orb move: collision with an existing orb"));
        }
        let orb = self
            .positions
            .iter_mut()
            .find(|op| op.position == old_position)
            .ok_or_else(|| Error::rule(format!("orb move: no orb at {old_position}")))?;
        orb.ko_position = orb.position;
        orb.ko_lock = MAX_ORB_KO_LOCK;
        orb.position = new_position;
        self.sort();
        Ok(())
    }

    /// Count every orb ko-lock down by one turn, clearing expired origins.
    pub fn next_turn(&mut self) {
        for op in &mut self.positions {
            if op.ko_lock > 0 {
                op.ko_lock -= 1;
                if op.ko_lock == 0 {
                    op.ko_position = Position::INVALID;
                }
            }
        }
    }

    fn sort(&mut self) {
        self.positions.sort_by_key(|op| op.position);
    }
}

impl Serial for OrbPositions {
    const DATA_SIZE: usize = OrbPosition::DATA_SIZE * ORB_COUNT;

    fn write_data(&self, data: &mut String) {
        for op in &self.positions {
            op.write_data(data);
        }
    }

    fn from_data(data: &str) -> Result<OrbPositions> {
        check_size("OrbPositions", data, Self::DATA_SIZE)?;
        let mut result = OrbPositions::default();
        for (i, op) in result.positions.iter_mut().enumerate() {
            let offset = i * OrbPosition::DATA_SIZE;
            *op = OrbPosition::from_data(&data[offset..offset + OrbPosition::DATA_SIZE])?;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spares_come_into_play() {
        let mut orbs = OrbPositions::default();
        assert_eq!(orbs.in_game_count(), 0);
        assert!(orbs.has_spare());
        orbs.move_orb(Position::INVALID, Position::new(4, 4)).unwrap();
        orbs.move_orb(Position::INVALID, Position::new(5, 4)).unwrap();
        assert_eq!(orbs.in_game_count(), 2);
        assert!(orbs.is_orb_at(Position::new(4, 4)));
        assert!(!orbs.is_orb_at(Position::new(9, 9)));
    }

    #[test]
    fn move_arms_ko_lock() {
        let mut orbs = OrbPositions::default();
        orbs.move_orb(Position::INVALID, Position::new(4, 4)).unwrap();
        orbs.next_turn();
        orbs.next_turn();
        orbs.next_turn();
        orbs.move_orb(Position::new(4, 4), Position::new(2, 2)).unwrap();
        assert_eq!(orbs.ko_position(Position::new(2, 2)), Position::new(4, 4));
        orbs.next_turn();
        orbs.next_turn();
        assert_eq!(orbs.ko_position(Position::new(2, 2)), Position::new(4, 4));
        orbs.next_turn();
        assert_eq!(orbs.ko_position(Position::new(2, 2)), Position::INVALID);
    }

    #[test]
    fn collisions_and_missing_orbs_are_rejected() {
        let mut orbs = OrbPositions::default();
        orbs.move_orb(Position::INVALID, Position::new(4, 4)).unwrap();
        assert!(orbs
            .move_orb(Position::INVALID, Position::new(4, 4))
            .is_err());
        assert!(orbs
            .move_orb(Position::new(1, 1), Position::new(2, 2))
            .is_err());
        assert!(orbs
            .move_orb(Position::new(4, 4), Position::INVALID)
            .is_err());
    }

    #[test]
    fn records_stay_sorted() {
        let mut orbs = OrbPositions::default();
        orbs.move_orb(Position::INVALID, Position::new(5, 5)).unwrap();
        orbs.move_orb(Position::INVALID, Position::new(1, 1)).unwrap();
        orbs.move_orb(Position::INVALID, Position::new(3, 7)).unwrap();
        let in_game: Vec<Position> = orbs.positions()[..3].iter().map(|op| op.position).collect();
        assert_eq!(
            in_game,
            vec![Position::new(1, 1), Position::new(5, 5), Position::new(3, 7)]
        );
    }

    #[test]
    fn rotation_moves_all_positions() {
        let mut orbs = OrbPositions::default();
        orbs.move_orb(Position::INVALID, Position::new(4, 4)).unwrap();
        orbs.move_orb(Position::new(4, 4), Position::new(2, 2)).unwrap();
        let rotated = orbs.rotated(Rotation::CLOCKWISE_90);
        assert!(rotated.is_orb_at(Position::new(2, 7)));
        assert_eq!(
            rotated.ko_position(Position::new(2, 7)),
            Position::new(4, 5)
        );
        assert_eq!(rotated.rotated(Rotation::CLOCKWISE_270), orbs);
    }

    #[test]
    fn serialization_round_trips() {
        let mut orbs = OrbPositions::default();
        orbs.move_orb(Position::INVALID, Position::new(4, 4)).unwrap();
        orbs.move_orb(Position::new(4, 4), Position::new(6, 2)).unwrap();
        let data = orbs.to_data();
        assert_eq!(data.len(), OrbPositions::DATA_SIZE);
        assert_eq!(OrbPositions::from_data(&data).unwrap(), orbs);
    }

    #[test]
    fn serialization_skips_expired_ko() {
        let op = OrbPosition {
            position: Position::new(1, 2),
            ko_lock: 0,
            ko_position: Position::new(3, 3),
        };
        // A cleared lock serializes without its stale origin.
        assert_eq!(op.to_data(), "12___");
        let parsed = OrbPosition::from_data("12___").unwrap();
        assert_eq!(parsed.ko_position, Position::INVALID);
    }
}
