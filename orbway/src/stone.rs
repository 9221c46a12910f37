//! Stone kinds and their wiring.
//!
//! Every stone kind is defined once as a composition of *elements* rooted at
//! an orientation: a Straight (connects opposite sides), a Curve (connects
//! two adjacent sides, N→E at orientation North), a Stop (connects a side to
//! the central stop) or a Bounce (connects a side to itself). The elements
//! union into a symmetric connection table, from which the set of wiring-wise
//! distinct orientations is derived.
//!
//! ```text
//! _: ┌─────┐
//!    │     │
//! A: ┌──┬──┐ B: ┌──┬──┐ C: ┌──┬──┐ D: ┌──┬──┐ E: ┌──┬──┐ F: ┌──┬──┐ G: ┌──┬──┐
//!    │  │  │    │  │  │    │  ╰╮ │    │  ├╮ │    │ ╭┼╮ │    │ ╭┴╮ │    │ ╭╯  │
//!    ├──┼──┤    ├──○──┤    ├─╮ ╰─┤    ├─╮│╰─┤    ├─╯│╰─┤    ├─┤ ├─┤    ├─╯ ▷─┤
//!    │  │  │    │  │  │    │ ╰╮  │    │ ╰┤  │    │  │  │    │ ╰┬╯ │    │  ▽  │
//!    └──┴──┘    └──┴──┘    └──┴──┘    └──┴──┘    └──┴──┘    └──┴──┘    └──┴──┘
//! H: ┌──┬──┐ I: ┌──┬──┐ J: ┌──┬──┐
//!    │  │  │    │  │  │    │  ╰╮ │
//!    │  ○──┤    │  ○──┤    │   ╰─┤
//!    │  │  │    │     │    │     │
//!    └──┴──┘    └──┴──┘    └─────┘
//! ```

use std::fmt;
use std::sync::LazyLock;

use crate::anchor::{Anchor, Anchors};
use crate::error::Result;
use crate::orientation::{Orientation, Orientations};
use crate::rotation::Rotation;
use crate::serial::{check_size, Serial};

// ── Stone elements ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Straight,
    Stop,
    Curve,
    Bounce,
}

/// A single track element of a stone, rooted at an orientation.
#[derive(Clone, Copy, Debug)]
pub struct StoneElement {
    kind: ElementKind,
    orientation: Orientation,
}

impl StoneElement {
    pub const fn new(kind: ElementKind, orientation: Orientation) -> StoneElement {
        StoneElement { kind, orientation }
    }

    /// The anchor pair this element connects, in board frame.
    pub fn connection(self) -> (Anchor, Anchor) {
        let target = match self.kind {
            ElementKind::Straight => Anchor::South,
            ElementKind::Stop => Anchor::Stop,
            ElementKind::Curve => Anchor::East,
            ElementKind::Bounce => Anchor::North,
        };
        (
            Anchor::North.rotated_for(self.orientation),
            target.rotated_for(self.orientation),
        )
    }
}

// ── Wiring ──────────────────────────────────────────────────────────

/// The symmetric anchor-to-anchors connection table of one stone kind,
/// together with its derived set of wiring-wise distinct orientations.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct StoneWiring {
    pub connections: [Anchors; Anchor::COUNT as usize],
    pub unique_orientations: Orientations,
}

impl StoneWiring {
    fn from_elements(elements: &[StoneElement]) -> StoneWiring {
        let mut wiring = StoneWiring {
            connections: [Anchors::new(); 5],
            unique_orientations: Orientations::single(Orientation::North),
        };
        for element in elements {
            let (source, target) = element.connection();
            wiring.connections[source.value() as usize] |= target;
            wiring.connections[target.value() as usize] |= source;
        }
        wiring.update_unique_orientations();
        wiring
    }

    pub fn has_stop(&self) -> bool {
        !self.connections[Anchor::Stop.value() as usize].is_empty()
    }

    /// Whether two orientations produce the same connection table.
    pub fn is_equal(&self, a: Orientation, b: Orientation) -> bool {
        self.rotated_connections(a.to_rotation()) == self.rotated_connections(b.to_rotation())
    }

    fn rotated_connections(&self, rotation: Rotation) -> [Anchors; 5] {
        if rotation.is_none() {
            return self.connections;
        }
        let mut result = [Anchors::new(); 5];
        for anchor in Anchor::all() {
            result[anchor.rotated(rotation).value() as usize] =
                self.connections[anchor.value() as usize].rotated(rotation);
        }
        result
    }

    fn update_unique_orientations(&mut self) {
        use crate::orientation::Orientation::{East, North, South, West};
        let mut unique = Orientations::single(North);
        if !self.is_equal(North, East) {
            unique |= East;
        }
        if !self.is_equal(North, South) {
            unique |= South;
        }
        if !self.is_equal(North, West) && !self.is_equal(East, West) {
            unique |= West;
        }
        self.unique_orientations = unique;
    }
}

// ── Stone kinds ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stone {
    #[default]
    Empty = 0,
    Crossing = 1,
    CrossingWithStop = 2,
    TwoCurves = 3,
    SwitchA = 4,
    SwitchB = 5,
    SwitchC = 6,
    CurveWithBounces = 7,
    SwitchWithStop = 8,
    OneCurveWithStop = 9,
    OneCurve = 10,
}

static WIRING: LazyLock<[StoneWiring; Stone::COUNT]> = LazyLock::new(|| {
    use crate::orientation::Orientation::{East, North, South, West};
    use crate::stone::ElementKind::{Bounce, Curve, Stop, Straight};
    let element = StoneElement::new;
    [
        // Empty
        StoneWiring::from_elements(&[]),
        // Crossing (A)
        StoneWiring::from_elements(&[element(Straight, North), element(Straight, East)]),
        // CrossingWithStop (B)
        StoneWiring::from_elements(&[
            element(Stop, North),
            element(Stop, East),
            element(Stop, South),
            element(Stop, West),
        ]),
        // TwoCurves (C)
        StoneWiring::from_elements(&[element(Curve, North), element(Curve, South)]),
        // SwitchA (D)
        StoneWiring::from_elements(&[
            element(Straight, North),
            element(Curve, North),
            element(Curve, South),
        ]),
        // SwitchB (E)
        StoneWiring::from_elements(&[
            element(Straight, North),
            element(Curve, North),
            element(Curve, West),
        ]),
        // SwitchC (F)
        StoneWiring::from_elements(&[
            element(Curve, North),
            element(Curve, East),
            element(Curve, South),
            element(Curve, West),
        ]),
        // CurveWithBounces (G)
        StoneWiring::from_elements(&[
            element(Curve, West),
            element(Bounce, East),
            element(Bounce, South),
        ]),
        // SwitchWithStop (H)
        StoneWiring::from_elements(&[
            element(Stop, North),
            element(Stop, East),
            element(Stop, South),
        ]),
        // OneCurveWithStop (I)
        StoneWiring::from_elements(&[element(Stop, North), element(Stop, East)]),
        // OneCurve (J)
        StoneWiring::from_elements(&[element(Curve, North)]),
    ]
});

impl Stone {
    pub const COUNT: usize = 11;

    pub fn from_value(value: u8) -> Stone {
        match value {
            1 => Stone::Crossing,
            2 => Stone::CrossingWithStop,
            3 => Stone::TwoCurves,
            4 => Stone::SwitchA,
            5 => Stone::SwitchB,
            6 => Stone::SwitchC,
            7 => Stone::CurveWithBounces,
            8 => Stone::SwitchWithStop,
            9 => Stone::OneCurveWithStop,
            10 => Stone::OneCurve,
            _ => Stone::Empty,
        }
    }

    pub const fn value(self) -> u8 {
        self as u8
    }

    pub const fn is_empty(self) -> bool {
        matches!(self, Stone::Empty)
    }

    pub fn wiring(self) -> &'static StoneWiring {
        &WIRING[self as usize]
    }

    pub fn has_stop(self) -> bool {
        self.wiring().has_stop()
    }

    /// The anchors reachable from `anchor` within this stone, in the stone's
    /// canonical North frame.
    pub fn connections_from(self, anchor: Anchor) -> Anchors {
        self.wiring().connections[anchor.value() as usize]
    }

    pub fn unique_orientations(self) -> Orientations {
        self.wiring().unique_orientations
    }

    /// Whether the two orientations give the same wiring on the board.
    pub fn is_equal(self, a: Orientation, b: Orientation) -> bool {
        a == b || self.wiring().is_equal(a, b)
    }

    pub fn can_rotate(self) -> bool {
        self.unique_orientations() != Orientations::single(Orientation::North)
    }

    pub fn all_orientations_are_unique(self) -> bool {
        self.unique_orientations() == Orientations::all()
    }

    /// Map an orientation onto the stone's canonical representative:
    /// non-rotatable stones collapse to North, two-orientation stones map
    /// S→N and W→E.
    pub fn normalized_orientation(self, orientation: Orientation) -> Orientation {
        if self.is_empty() || !self.can_rotate() {
            Orientation::North
        } else if !self.all_orientations_are_unique()
            && (orientation == Orientation::South || orientation == Orientation::West)
        {
            orientation + Rotation::CLOCKWISE_180
        } else {
            orientation
        }
    }

    pub fn all() -> [Stone; Stone::COUNT] {
        [
            Stone::Empty,
            Stone::Crossing,
            Stone::CrossingWithStop,
            Stone::TwoCurves,
            Stone::SwitchA,
            Stone::SwitchB,
            Stone::SwitchC,
            Stone::CurveWithBounces,
            Stone::SwitchWithStop,
            Stone::OneCurveWithStop,
            Stone::OneCurve,
        ]
    }

    pub fn all_non_empty() -> [Stone; Stone::COUNT - 1] {
        [
            Stone::Crossing,
            Stone::CrossingWithStop,
            Stone::TwoCurves,
            Stone::SwitchA,
            Stone::SwitchB,
            Stone::SwitchC,
            Stone::CurveWithBounces,
            Stone::SwitchWithStop,
            Stone::OneCurveWithStop,
            Stone::OneCurve,
        ]
    }

    pub fn as_char(self) -> char {
        match self {
            Stone::Empty => '_',
            Stone::Crossing => 'A',
            Stone::CrossingWithStop => 'B',
            Stone::TwoCurves => 'C',
            Stone::SwitchA => 'D',
            Stone::SwitchB => 'E',
            Stone::SwitchC => 'F',
            Stone::CurveWithBounces => 'G',
            Stone::SwitchWithStop => 'H',
            Stone::OneCurveWithStop => 'I',
            Stone::OneCurve => 'J',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stone::Empty => "Empty",
            Stone::Crossing => "Crossing",
            Stone::CrossingWithStop => "CrossingWithStop",
            Stone::TwoCurves => "TwoCurves",
            Stone::SwitchA => "SwitchA",
            Stone::SwitchB => "SwitchB",
            Stone::SwitchC => "SwitchC",
            Stone::CurveWithBounces => "CurveWithBounces",
            Stone::SwitchWithStop => "SwitchWithStop",
            Stone::OneCurveWithStop => "OneCurveWithStop",
            Stone::OneCurve => "OneCurve",
        }
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Serial for Stone {
    const DATA_SIZE: usize = 1;

    fn write_data(&self, data: &mut String) {
        data.push(self.as_char());
    }

    fn from_data(data: &str) -> Result<Stone> {
        check_size("Stone", data, Self::DATA_SIZE)?;
        Ok(match data.as_bytes()[0] {
            b'A' => Stone::Crossing,
            b'B' => Stone::CrossingWithStop,
            b'C' => Stone::TwoCurves,
            b'D' => Stone::SwitchA,
            b'E' => Stone::SwitchB,
            b'F' => Stone::SwitchC,
            b'G' => Stone::CurveWithBounces,
            b'H' => Stone::SwitchWithStop,
            b'I' => Stone::OneCurveWithStop,
            b'J' => Stone::OneCurve,
            _ => Stone::Empty,
        })
    }
}
