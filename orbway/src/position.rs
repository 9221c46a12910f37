//! Grid coordinates with an invalid sentinel.
//!
//! Coordinates occupy a nibble each; (15,15) is the INVALID sentinel used for
//! spare orbs and "no position". Ordering is row-major (y first, then x), so
//! INVALID sorts after every valid position.

use std::cmp::Ordering;
use std::fmt;

use crate::error::Result;
use crate::rotation::Rotation;
use crate::serial::{check_size, hex_digit_to_value, is_hex_digit, value_to_hex_digit, Serial};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    x: u8,
    y: u8,
}

impl Default for Position {
    fn default() -> Self {
        Position::INVALID
    }
}

impl Position {
    pub const MAX_LENGTH: u8 = 0x0f;
    pub const INVALID: Position = Position {
        x: Self::MAX_LENGTH,
        y: Self::MAX_LENGTH,
    };

    pub const fn new(x: u8, y: u8) -> Position {
        Position { x, y }
    }

    pub const fn x(self) -> u8 {
        self.x
    }

    pub const fn y(self) -> u8 {
        self.y
    }

    pub const fn is_invalid(self) -> bool {
        self.x == Self::MAX_LENGTH || self.y == Self::MAX_LENGTH
    }

    /// Offset by (dx, dy); coordinates saturate into the invalid range rather
    /// than wrapping below zero.
    pub fn offset(self, dx: i8, dy: i8) -> Position {
        let x = self.x.wrapping_add_signed(dx) & Self::MAX_LENGTH;
        let y = self.y.wrapping_add_signed(dy) & Self::MAX_LENGTH;
        Position { x, y }
    }

    /// Rotate on a square grid of side `size`. The 180° and 270° cases are the
    /// powers of the 90° map (x,y) → (y, size−1−x). INVALID is fixed.
    pub fn rotated(self, rotation: Rotation, size: u8) -> Position {
        if self.is_invalid() {
            return Position::INVALID;
        }
        let last = size - 1;
        match rotation.value() {
            1 => Position::new(self.y, last - self.x),
            2 => Position::new(last - self.x, last - self.y),
            3 => Position::new(last - self.y, self.x),
            _ => self,
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Position) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Position) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_invalid() {
            write!(f, "[-]")
        } else {
            write!(f, "[{},{}]", self.x, self.y)
        }
    }
}

impl Serial for Position {
    const DATA_SIZE: usize = 2;

    fn write_data(&self, data: &mut String) {
        if self.is_invalid() {
            data.push_str("__");
        } else {
            data.push(value_to_hex_digit(self.x));
            data.push(value_to_hex_digit(self.y));
        }
    }

    fn from_data(data: &str) -> Result<Position> {
        check_size("Position", data, Self::DATA_SIZE)?;
        let bytes = data.as_bytes();
        if !is_hex_digit(bytes[0]) || !is_hex_digit(bytes[1]) {
            return Ok(Position::INVALID);
        }
        Ok(Position::new(
            hex_digit_to_value(bytes[0]),
            hex_digit_to_value(bytes[1]),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_row_major() {
        assert!(Position::new(5, 0) < Position::new(0, 1));
        assert!(Position::new(2, 3) < Position::new(3, 3));
        assert!(Position::new(9, 9) < Position::INVALID);
    }

    #[test]
    fn rotation_by_90_steps() {
        let pos = Position::new(2, 1);
        assert_eq!(pos.rotated(Rotation::CLOCKWISE_90, 10), Position::new(1, 7));
        assert_eq!(
            pos.rotated(Rotation::CLOCKWISE_180, 10),
            Position::new(7, 8)
        );
        assert_eq!(
            pos.rotated(Rotation::CLOCKWISE_270, 10),
            Position::new(8, 2)
        );
    }

    #[test]
    fn rotation_composes() {
        let pos = Position::new(3, 7);
        let twice = pos
            .rotated(Rotation::CLOCKWISE_90, 10)
            .rotated(Rotation::CLOCKWISE_90, 10);
        assert_eq!(twice, pos.rotated(Rotation::CLOCKWISE_180, 10));
        let thrice = twice.rotated(Rotation::CLOCKWISE_90, 10);
        assert_eq!(thrice, pos.rotated(Rotation::CLOCKWISE_270, 10));
        assert_eq!(thrice.rotated(Rotation::CLOCKWISE_90, 10), pos);
    }

    #[test]
    fn rotation_inverse_restores() {
        for rotation in Rotation::all_clockwise() {
            let pos = Position::new(4, 2);
            assert_eq!(
                pos.rotated(rotation, 10).rotated(rotation.reversed(), 10),
                pos
            );
        }
    }

    #[test]
    fn invalid_is_fixed_under_rotation() {
        for rotation in Rotation::all_clockwise() {
            assert_eq!(Position::INVALID.rotated(rotation, 10), Position::INVALID);
        }
    }

    #[test]
    fn serialization_round_trips() {
        for pos in [Position::new(0, 0), Position::new(9, 4), Position::INVALID] {
            let data = pos.to_data();
            assert_eq!(data.len(), Position::DATA_SIZE);
            assert_eq!(Position::from_data(&data).unwrap(), pos);
        }
        assert_eq!(Position::INVALID.to_data(), "__");
    }

    #[test]
    fn non_hex_input_decodes_to_invalid() {
        assert_eq!(Position::from_data("z1").unwrap(), Position::INVALID);
        assert_eq!(Position::from_data("__").unwrap(), Position::INVALID);
        assert!(Position::from_data("123").is_err());
    }
}
