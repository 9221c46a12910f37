//! Connection anchors on a field and anchor sets.
//!
//! A field has five anchors: the four sides plus the central Stop. Rotation
//! cycles the side anchors and leaves Stop fixed. An [`Anchors`] value is a
//! 5-bit mask over them.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use crate::error::Result;
use crate::orientation::Orientation;
use crate::position::Position;
use crate::rotation::Rotation;
use crate::serial::{check_size, Serial};

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Anchor {
    #[default]
    North = 0,
    East = 1,
    South = 2,
    West = 3,
    /// The central stop point of a stone.
    Stop = 4,
}

impl Anchor {
    pub const COUNT: u8 = 5;
    pub const SIDE_COUNT: u8 = 4;
    pub const SIDE_MASK: u8 = 0x0f;
    pub const CENTER_MASK: u8 = 0x10;

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn flag(self) -> u8 {
        1 << self as u8
    }

    pub const fn is_side(self) -> bool {
        (self as u8) < Self::SIDE_COUNT
    }

    const fn from_side_value(value: u8) -> Anchor {
        match value % 4 {
            0 => Anchor::North,
            1 => Anchor::East,
            2 => Anchor::South,
            _ => Anchor::West,
        }
    }

    /// Rotate the anchor; Stop is fixed.
    pub const fn rotated(self, rotation: Rotation) -> Anchor {
        if self.is_side() {
            Anchor::from_side_value(self as u8 + rotation.value())
        } else {
            Anchor::Stop
        }
    }

    /// Rotate into the reference frame of a stone with the given orientation.
    pub const fn rotated_for(self, orientation: Orientation) -> Anchor {
        self.rotated(orientation.to_rotation())
    }

    /// Undo the orientation rotation, yielding the anchor in the stone's
    /// canonical North frame.
    pub const fn normalized(self, orientation: Orientation) -> Anchor {
        self.rotated(orientation.to_rotation().reversed())
    }

    /// The opposite side; Stop maps to itself.
    pub const fn opposite(self) -> Anchor {
        if self.is_side() {
            Anchor::from_side_value(self as u8 + 2)
        } else {
            Anchor::Stop
        }
    }

    /// The neighboring travel point in the direction of this anchor: the
    /// adjacent position, entered through the opposite side. Stop has no
    /// neighbor and yields an invalid point.
    pub fn next_point(self, pos: Position) -> (Position, Anchor) {
        match self {
            Anchor::North => (pos.offset(0, -1), Anchor::South),
            Anchor::East => (pos.offset(1, 0), Anchor::West),
            Anchor::South => (pos.offset(0, 1), Anchor::North),
            Anchor::West => (pos.offset(-1, 0), Anchor::East),
            Anchor::Stop => (Position::INVALID, Anchor::Stop),
        }
    }

    pub const fn all() -> [Anchor; 5] {
        [
            Anchor::North,
            Anchor::East,
            Anchor::South,
            Anchor::West,
            Anchor::Stop,
        ]
    }

    pub fn as_char(self) -> char {
        match self {
            Anchor::North => 'N',
            Anchor::East => 'E',
            Anchor::South => 'S',
            Anchor::West => 'W',
            Anchor::Stop => 'O',
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serial for Anchor {
    const DATA_SIZE: usize = 1;

    fn write_data(&self, data: &mut String) {
        data.push(self.as_char());
    }

    fn from_data(data: &str) -> Result<Anchor> {
        check_size("Anchor", data, Self::DATA_SIZE)?;
        Ok(match data.as_bytes()[0] {
            b'E' => Anchor::East,
            b'S' => Anchor::South,
            b'W' => Anchor::West,
            b'O' => Anchor::Stop,
            _ => Anchor::North,
        })
    }
}

/// A set of anchors, stored as a 5-bit mask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Anchors(u8);

impl Anchors {
    pub const fn new() -> Anchors {
        Anchors(0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, anchor: Anchor) -> bool {
        self.0 & anchor.flag() != 0
    }

    /// The lowest-indexed anchor in the set (N, E, S, W, then Stop).
    pub fn first(self) -> Anchor {
        for anchor in Anchor::all() {
            if self.contains(anchor) {
                return anchor;
            }
        }
        Anchor::North
    }

    pub fn remove(&mut self, anchor: Anchor) {
        self.0 &= !anchor.flag();
    }

    /// Rotate the side bits cyclically; the Stop bit stays in place.
    pub const fn rotated(self, rotation: Rotation) -> Anchors {
        let sides = self.0 & Anchor::SIDE_MASK;
        let shift = rotation.value() & 0x03;
        let rotated_sides =
            ((sides << shift) | (sides >> (Anchor::SIDE_COUNT - shift))) & Anchor::SIDE_MASK;
        Anchors(rotated_sides | (self.0 & Anchor::CENTER_MASK))
    }

    pub const fn rotated_for(self, orientation: Orientation) -> Anchors {
        self.rotated(orientation.to_rotation())
    }

    pub const fn normalized(self, orientation: Orientation) -> Anchors {
        self.rotated(orientation.to_rotation().reversed())
    }

    pub fn iter(self) -> impl Iterator<Item = Anchor> {
        Anchor::all()
            .into_iter()
            .filter(move |anchor| self.contains(*anchor))
    }
}

impl BitOr<Anchor> for Anchors {
    type Output = Anchors;

    fn bitor(self, anchor: Anchor) -> Anchors {
        Anchors(self.0 | anchor.flag())
    }
}

impl BitOr for Anchors {
    type Output = Anchors;

    fn bitor(self, other: Anchors) -> Anchors {
        Anchors(self.0 | other.0)
    }
}

impl BitOrAssign<Anchor> for Anchors {
    fn bitor_assign(&mut self, anchor: Anchor) {
        self.0 |= anchor.flag();
    }
}

impl BitOrAssign for Anchors {
    fn bitor_assign(&mut self, other: Anchors) {
        self.0 |= other.0;
    }
}

impl FromIterator<Anchor> for Anchors {
    fn from_iter<I: IntoIterator<Item = Anchor>>(iter: I) -> Anchors {
        let mut result = Anchors::new();
        for anchor in iter {
            result |= anchor;
        }
        result
    }
}

impl fmt::Debug for Anchors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Anchors(")?;
        for anchor in self.iter() {
            write!(f, "{anchor}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_rotation_cycles_sides() {
        assert_eq!(Anchor::North.rotated(Rotation::CLOCKWISE_90), Anchor::East);
        assert_eq!(Anchor::West.rotated(Rotation::CLOCKWISE_90), Anchor::North);
        assert_eq!(Anchor::East.rotated(Rotation::CLOCKWISE_270), Anchor::North);
        assert_eq!(Anchor::Stop.rotated(Rotation::CLOCKWISE_90), Anchor::Stop);
        assert_eq!(Anchor::Stop.rotated(Rotation::CLOCKWISE_180), Anchor::Stop);
    }

    #[test]
    fn normalized_undoes_orientation() {
        for anchor in Anchor::all() {
            for orientation in Orientation::all() {
                assert_eq!(
                    anchor.rotated_for(orientation).normalized(orientation),
                    anchor
                );
            }
        }
    }

    #[test]
    fn opposite_sides() {
        assert_eq!(Anchor::North.opposite(), Anchor::South);
        assert_eq!(Anchor::East.opposite(), Anchor::West);
        assert_eq!(Anchor::Stop.opposite(), Anchor::Stop);
    }

    #[test]
    fn next_point_moves_one_field() {
        let pos = Position::new(4, 4);
        assert_eq!(
            Anchor::North.next_point(pos),
            (Position::new(4, 3), Anchor::South)
        );
        assert_eq!(
            Anchor::East.next_point(pos),
            (Position::new(5, 4), Anchor::West)
        );
        let (invalid, anchor) = Anchor::Stop.next_point(pos);
        assert!(invalid.is_invalid());
        assert_eq!(anchor, Anchor::Stop);
    }

    #[test]
    fn anchor_set_rotation_is_group_action() {
        let set: Anchors = [Anchor::North, Anchor::West, Anchor::Stop]
            .into_iter()
            .collect();
        for r1 in Rotation::all_clockwise() {
            for r2 in Rotation::all_clockwise() {
                assert_eq!(set.rotated(r1).rotated(r2), set.rotated(r1 + r2));
            }
        }
    }

    #[test]
    fn anchor_set_rotation_keeps_stop() {
        let set = Anchors::new() | Anchor::Stop | Anchor::North;
        let rotated = set.rotated(Rotation::CLOCKWISE_90);
        assert!(rotated.contains(Anchor::Stop));
        assert!(rotated.contains(Anchor::East));
        assert!(!rotated.contains(Anchor::North));
    }

    #[test]
    fn first_prefers_sides_over_stop() {
        let set = Anchors::new() | Anchor::Stop | Anchor::West;
        assert_eq!(set.first(), Anchor::West);
        let only_stop = Anchors::new() | Anchor::Stop;
        assert_eq!(only_stop.first(), Anchor::Stop);
    }
}
