//! Stone orientations and orientation sets.

use std::fmt;
use std::ops::{Add, AddAssign, BitOr, BitOrAssign, Sub};

use crate::error::Result;
use crate::rotation::Rotation;
use crate::serial::{check_size, Serial};

/// The orientation of a stone on the board.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Orientation {
    pub const COUNT: u8 = 4;

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn flag(self) -> u8 {
        1 << self as u8
    }

    const fn from_value(value: u8) -> Orientation {
        match value % 4 {
            0 => Orientation::North,
            1 => Orientation::East,
            2 => Orientation::South,
            _ => Orientation::West,
        }
    }

    /// The clockwise rotation from North to this orientation.
    pub const fn to_rotation(self) -> Rotation {
        Rotation::from_quarter_turns(self as i8)
    }

    pub const fn all() -> [Orientation; 4] {
        [
            Orientation::North,
            Orientation::East,
            Orientation::South,
            Orientation::West,
        ]
    }

    pub fn as_char(self) -> char {
        match self {
            Orientation::North => 'N',
            Orientation::East => 'E',
            Orientation::South => 'S',
            Orientation::West => 'W',
        }
    }

    pub fn as_arrow(self) -> char {
        match self {
            Orientation::North => '↑',
            Orientation::East => '→',
            Orientation::South => '↓',
            Orientation::West => '←',
        }
    }
}

impl Add<Rotation> for Orientation {
    type Output = Orientation;

    fn add(self, rotation: Rotation) -> Orientation {
        Orientation::from_value(self as u8 + rotation.value())
    }
}

impl AddAssign<Rotation> for Orientation {
    fn add_assign(&mut self, rotation: Rotation) {
        *self = *self + rotation;
    }
}

impl Sub<Rotation> for Orientation {
    type Output = Orientation;

    fn sub(self, rotation: Rotation) -> Orientation {
        self + rotation.reversed()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serial for Orientation {
    const DATA_SIZE: usize = 1;

    fn write_data(&self, data: &mut String) {
        data.push(self.as_char());
    }

    fn from_data(data: &str) -> Result<Orientation> {
        check_size("Orientation", data, Self::DATA_SIZE)?;
        Ok(match data.as_bytes()[0] {
            b'E' => Orientation::East,
            b'S' => Orientation::South,
            b'W' => Orientation::West,
            _ => Orientation::North,
        })
    }
}

/// A set of orientations, stored as a 4-bit mask.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct Orientations(u8);

impl Orientations {
    pub const fn new() -> Orientations {
        Orientations(0)
    }

    pub const fn single(orientation: Orientation) -> Orientations {
        Orientations(orientation.flag())
    }

    pub const fn all() -> Orientations {
        Orientations(0x0f)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, orientation: Orientation) -> bool {
        self.0 & orientation.flag() != 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn iter(self) -> impl Iterator<Item = Orientation> {
        Orientation::all()
            .into_iter()
            .filter(move |orientation| self.contains(*orientation))
    }
}

impl BitOr<Orientation> for Orientations {
    type Output = Orientations;

    fn bitor(self, orientation: Orientation) -> Orientations {
        Orientations(self.0 | orientation.flag())
    }
}

impl BitOrAssign<Orientation> for Orientations {
    fn bitor_assign(&mut self, orientation: Orientation) {
        self.0 |= orientation.flag();
    }
}

impl FromIterator<Orientation> for Orientations {
    fn from_iter<I: IntoIterator<Item = Orientation>>(iter: I) -> Orientations {
        let mut result = Orientations::new();
        for orientation in iter {
            result |= orientation;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_wraps_mod_4() {
        assert_eq!(
            Orientation::North + Rotation::CLOCKWISE_90,
            Orientation::East
        );
        assert_eq!(
            Orientation::West + Rotation::CLOCKWISE_90,
            Orientation::North
        );
        assert_eq!(
            Orientation::East + Rotation::CLOCKWISE_270,
            Orientation::North
        );
        assert_eq!(
            Orientation::South - Rotation::CLOCKWISE_90,
            Orientation::East
        );
    }

    #[test]
    fn to_rotation_round_trips() {
        for orientation in Orientation::all() {
            assert_eq!(Orientation::North + orientation.to_rotation(), orientation);
        }
    }

    #[test]
    fn serialization_round_trips() {
        for orientation in Orientation::all() {
            let data = orientation.to_data();
            assert_eq!(data.len(), Orientation::DATA_SIZE);
            assert_eq!(Orientation::from_data(&data).unwrap(), orientation);
        }
    }

    #[test]
    fn orientation_set_operations() {
        let mut set = Orientations::new();
        assert!(set.is_empty());
        set |= Orientation::North;
        set |= Orientation::West;
        assert!(set.contains(Orientation::North));
        assert!(set.contains(Orientation::West));
        assert!(!set.contains(Orientation::East));
        assert_eq!(set.iter().count(), 2);
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Orientation::North, Orientation::West]
        );
    }

    #[test]
    fn rejects_wrong_size() {
        assert!(Orientation::from_data("").is_err());
        assert!(Orientation::from_data("NE").is_err());
    }
}
