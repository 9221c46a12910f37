//! Orb movement and the travel primitives of the path search.

use std::fmt;

use crate::anchor::{Anchor, Anchors};
use crate::board::Board;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::player::Player;
use crate::position::Position;
use crate::serial::{check_size, Serial};
use crate::state::GameState;

/// An orb movement; start == stop means "no move".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OrbMove {
    start: Position,
    stop: Position,
}

impl Default for OrbMove {
    /// The "no move" option.
    fn default() -> OrbMove {
        OrbMove {
            start: Position::INVALID,
            stop: Position::INVALID,
        }
    }
}

impl OrbMove {
    pub fn new(start: Position, stop: Position) -> OrbMove {
        OrbMove { start, stop }
    }

    pub fn start(self) -> Position {
        self.start
    }

    pub fn stop(self) -> Position {
        self.stop
    }

    pub fn is_no_move(self) -> bool {
        self.start == self.stop
    }

    /// Apply this orb move to the state.
    ///
    /// Validates travel legality, the stop on the destination, orb presence,
    /// destination occupancy and the ko-lock, in that order. Moving the last
    /// orb out of the source immediately pulls a spare into the vacated
    /// source field.
    pub fn apply_to(self, state: &mut GameState) -> Result<()> {
        if self.is_no_move() {
            return Err(Error::rule("tried to apply the no-move orb move"));
        }
        let old_is_source = Board::is_source(self.start);
        let new_is_source = Board::is_source(self.stop);
        if Board::is_house(self.start) && !Board::is_house(self.stop) {
            return Err(Error::rule("tried to move an orb out of a house"));
        }
        if !old_is_source && new_is_source {
            return Err(Error::rule("tried to move an orb back into the source"));
        }
        if !state.board().field(self.stop).has_stop() {
            return Err(Error::rule("tried to move an orb to a field with no stop"));
        }
        if !state.orb_positions().is_orb_at(self.start) {
            return Err(Error::rule("tried to move an orb from an empty position"));
        }
        if state.orb_positions().is_orb_at(self.stop) {
            return Err(Error::rule("tried to move an orb onto another orb"));
        }
        if state.orb_positions().ko_position(self.start) == self.stop {
            return Err(Error::rule(
                "tried to move an orb back to its previous position (ko lock)",
            ));
        }
        state.orb_positions_mut().move_orb(self.start, self.stop)?;
        if old_is_source && !new_is_source && state.orb_positions().has_spare() {
            state
                .orb_positions_mut()
                .move_orb(Position::INVALID, self.start)?;
        }
        Ok(())
    }
}

impl fmt::Display for OrbMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_move() {
            write!(f, "OrbMove(no move)")
        } else {
            write!(f, "OrbMove({} -> {})", self.start, self.stop)
        }
    }
}

impl Serial for OrbMove {
    const DATA_SIZE: usize = Position::DATA_SIZE * 2;

    fn write_data(&self, data: &mut String) {
        if self.is_no_move() {
            data.push_str("____");
        } else {
            self.start.write_data(data);
            self.stop.write_data(data);
        }
    }

    fn from_data(data: &str) -> Result<OrbMove> {
        check_size("OrbMove", data, Self::DATA_SIZE)?;
        Ok(OrbMove {
            start: Position::from_data(&data[..2])?,
            stop: Position::from_data(&data[2..4])?,
        })
    }
}

// ── Travel primitives ───────────────────────────────────────────────

/// A point along an orb path: a position entered through an anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TravelPoint {
    pub position: Position,
    pub anchor: Anchor,
}

impl TravelPoint {
    pub fn new(position: Position, anchor: Anchor) -> TravelPoint {
        TravelPoint { position, anchor }
    }
}

/// A node of the path-search stack: where the orb entered a field, which exit
/// is currently selected, and which exits remain to try.
#[derive(Clone, Copy, Debug)]
pub(crate) struct TravelNode {
    position: Position,
    entry: Anchor,
    exit: Anchor,
    options: Anchors,
}

impl TravelNode {
    /// Build a node for entering `field` at `point`; `None` if the wiring
    /// offers no continuation (a dead end).
    pub fn enter(point: TravelPoint, field: Field) -> Option<TravelNode> {
        let connections = field.connections_from(point.anchor);
        if connections.is_empty() {
            return None;
        }
        Some(TravelNode {
            position: point.position,
            entry: point.anchor,
            exit: connections.first(),
            options: connections,
        })
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn entry_point(&self) -> TravelPoint {
        TravelPoint::new(self.position, self.entry)
    }

    pub fn reached_stop(&self) -> bool {
        self.exit == Anchor::Stop
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn can_travel_forward(&self) -> bool {
        self.options.contains(self.exit)
    }

    /// The next travel point in the direction of the selected exit.
    pub fn next_point(&self) -> TravelPoint {
        let (position, anchor) = self.exit.next_point(self.position);
        TravelPoint::new(position, anchor)
    }

    /// Discard the selected exit and select the next remaining one.
    /// Returns `false` when no option is left.
    pub fn select_next_option(&mut self) -> bool {
        self.options.remove(self.exit);
        if self.options.is_empty() {
            self.exit = Anchor::Stop;
            return false;
        }
        self.exit = self.options.first();
        true
    }

    pub fn remove_current_option(&mut self) {
        self.options.remove(self.exit);
    }
}

/// Travel between two positions: house and source entry rules.
pub(crate) fn can_travel(start: Position, stop: Position) -> bool {
    let start_is_house = Board::is_house(start);
    let stop_is_house = Board::is_house(stop);
    if stop_is_house && Board::player_for_field(stop) != Player::new(0) {
        return false;
    }
    if start_is_house && !stop_is_house {
        return false;
    }
    if !Board::is_source(start) && Board::is_source(stop) {
        return false;
    }
    true
}
