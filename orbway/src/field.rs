//! One field on the game board, bit-packed into a single byte:
//! stone kind (4 bits), orientation (2 bits), ko-lock (2 bits).

use std::fmt;

use crate::anchor::{Anchor, Anchors};
use crate::error::Result;
use crate::orientation::{Orientation, Orientations};
use crate::rotation::Rotation;
use crate::serial::{check_size, hex_digit_to_value, value_to_hex_digit, Serial};
use crate::stone::Stone;

const STONE_SHIFT: u8 = 0;
const STONE_MASK: u8 = 0x0f;
const ORIENTATION_SHIFT: u8 = 4;
const ORIENTATION_MASK: u8 = 0x03;
const KO_LOCK_SHIFT: u8 = 6;
const KO_LOCK_MASK: u8 = 0x03;

pub const MAX_KO_LOCK: u8 = 3;

#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Field(u8);

impl Field {
    /// Create a field; the orientation is normalized for the stone and the
    /// ko-lock clamped to the 2-bit range.
    pub fn new(stone: Stone, orientation: Orientation, ko_lock: u8) -> Field {
        let orientation = stone.normalized_orientation(orientation);
        Field(
            (stone.value() << STONE_SHIFT)
                | (orientation.value() << ORIENTATION_SHIFT)
                | (ko_lock.min(MAX_KO_LOCK) << KO_LOCK_SHIFT),
        )
    }

    pub fn stone(self) -> Stone {
        Stone::from_value((self.0 >> STONE_SHIFT) & STONE_MASK)
    }

    pub fn orientation(self) -> Orientation {
        match (self.0 >> ORIENTATION_SHIFT) & ORIENTATION_MASK {
            1 => Orientation::East,
            2 => Orientation::South,
            3 => Orientation::West,
            _ => Orientation::North,
        }
    }

    pub fn set_stone(&mut self, stone: Stone, orientation: Orientation) {
        *self = Field::new(stone, orientation, self.ko_lock());
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        *self = Field::new(self.stone(), orientation, self.ko_lock());
    }

    pub fn ko_lock(self) -> u8 {
        (self.0 >> KO_LOCK_SHIFT) & KO_LOCK_MASK
    }

    pub fn has_ko_lock(self) -> bool {
        self.ko_lock() != 0
    }

    pub fn set_ko_lock(&mut self, ko_lock: u8) {
        self.0 = (self.0 & !(KO_LOCK_MASK << KO_LOCK_SHIFT))
            | (ko_lock.min(MAX_KO_LOCK) << KO_LOCK_SHIFT);
    }

    pub fn is_empty(self) -> bool {
        self.stone().is_empty()
    }

    pub fn has_stop(self) -> bool {
        self.stone().has_stop()
    }

    pub fn can_rotate(self) -> bool {
        self.stone().can_rotate()
    }

    pub fn unique_orientations(self) -> Orientations {
        self.stone().unique_orientations()
    }

    /// The anchors reachable from `anchor` in board frame, accounting for the
    /// field's orientation.
    pub fn connections_from(self, anchor: Anchor) -> Anchors {
        let orientation = self.orientation();
        self.stone()
            .connections_from(anchor.normalized(orientation))
            .rotated_for(orientation)
    }

    /// The field as it appears after rotating the whole board clockwise.
    ///
    /// The position map (x,y)→(y,N−1−x) carries the west neighbor of a cell
    /// onto the south side of the cell's image, so the stored orientation has
    /// to step backwards by the same angle to keep the wiring attached to its
    /// neighbors.
    pub fn rotated(self, rotation: Rotation) -> Field {
        if self.is_empty() || !self.can_rotate() {
            return self;
        }
        Field::new(self.stone(), self.orientation() - rotation, self.ko_lock())
    }

    /// Whether replacing this field's content with (stone, orientation) would
    /// change the board: the field must be filled and unlocked, and the new
    /// content must differ in wiring.
    pub fn is_valid_change(self, new_stone: Stone, new_orientation: Orientation) -> bool {
        if self.is_empty() || self.has_ko_lock() {
            return false;
        }
        if self.stone() != new_stone {
            return true;
        }
        !self.stone().is_equal(self.orientation(), new_orientation)
    }

    /// Count the ko-lock down by one turn.
    pub fn next_turn(&mut self) {
        if self.has_ko_lock() {
            self.set_ko_lock(self.ko_lock() - 1);
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "Field(empty)")
        } else {
            write!(
                f,
                "Field({}{}, ko={})",
                self.stone(),
                self.orientation(),
                self.ko_lock()
            )
        }
    }
}

impl Serial for Field {
    const DATA_SIZE: usize = Stone::DATA_SIZE + Orientation::DATA_SIZE + 1;

    fn write_data(&self, data: &mut String) {
        if self.is_empty() {
            data.push_str("___");
        } else {
            self.stone().write_data(data);
            self.orientation().write_data(data);
            if self.has_ko_lock() {
                data.push(value_to_hex_digit(self.ko_lock()));
            } else {
                data.push('_');
            }
        }
    }

    fn from_data(data: &str) -> Result<Field> {
        check_size("Field", data, Self::DATA_SIZE)?;
        if data.as_bytes()[0] == b'_' {
            return Ok(Field::default());
        }
        let stone = Stone::from_data(&data[..1])?;
        let orientation = Orientation::from_data(&data[1..2])?;
        let ko_lock = hex_digit_to_value(data.as_bytes()[2]);
        Ok(Field::new(stone, orientation, ko_lock))
    }
}
