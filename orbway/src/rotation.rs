//! Board rotations in quarter-turn steps.
//!
//! A rotation is stored as its clockwise quarter-turn count 0..=3, so the
//! counter-clockwise constructors map onto their clockwise equivalents and
//! equality is taken mod 4 (−90° == +270°). Composition is modular addition.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A rotation by a multiple of 90°, clockwise-normalized.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

impl Rotation {
    pub const COUNT: u8 = 4;

    pub const NONE: Rotation = Rotation(0);
    pub const CLOCKWISE_90: Rotation = Rotation(1);
    pub const CLOCKWISE_180: Rotation = Rotation(2);
    pub const CLOCKWISE_270: Rotation = Rotation(3);
    pub const COUNTER_CLOCKWISE_90: Rotation = Rotation(3);
    pub const COUNTER_CLOCKWISE_180: Rotation = Rotation(2);
    pub const COUNTER_CLOCKWISE_270: Rotation = Rotation(1);

    /// Build a rotation from a signed number of clockwise quarter turns.
    pub const fn from_quarter_turns(turns: i8) -> Rotation {
        Rotation(turns.rem_euclid(Self::COUNT as i8) as u8)
    }

    /// The clockwise quarter-turn count, 0..=3.
    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// The inverse rotation.
    pub const fn reversed(self) -> Rotation {
        Rotation((Self::COUNT - self.0) % Self::COUNT)
    }

    /// All four rotations in clockwise order.
    pub const fn all_clockwise() -> [Rotation; 4] {
        [
            Rotation::NONE,
            Rotation::CLOCKWISE_90,
            Rotation::CLOCKWISE_180,
            Rotation::CLOCKWISE_270,
        ]
    }
}

impl Add for Rotation {
    type Output = Rotation;

    fn add(self, other: Rotation) -> Rotation {
        Rotation((self.0 + other.0) % Self::COUNT)
    }
}

impl AddAssign for Rotation {
    fn add_assign(&mut self, other: Rotation) {
        *self = *self + other;
    }
}

impl Sub for Rotation {
    type Output = Rotation;

    fn sub(self, other: Rotation) -> Rotation {
        self + other.reversed()
    }
}

impl SubAssign for Rotation {
    fn sub_assign(&mut self, other: Rotation) {
        *self = *self - other;
    }
}

impl fmt::Debug for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotation({}° cw)", self.0 as u16 * 90)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}° cw", self.0 as u16 * 90)
    }
}
