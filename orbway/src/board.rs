//! The game board: a static 10×10 frame over a mutable 8×8 interior.
//!
//! The frame holds the four house clusters, the gardens, the functionless
//! border cells and the 2×2 source in the middle. It is built once per
//! process and is rotation-symmetric by construction: every frame cell is the
//! top-left quadrant's cell rotated into place, so rotating a board state
//! never has to touch the frame. A position is *static* iff it belongs to the
//! frame ring, a house or the source; everything else (including the gardens)
//! lives in the interior grid.
//!
//! ```text
//!  P0             P3
//!     FFFFF|FFFFF
//!     F....|....F
//!     F....|....F
//!     F....|....F
//!     F....|..SS F      S = 2×2 source at (4,4)..(5,5)
//!     -----+-----
//!     F....|....F
//!     F....|....F
//!     F....|....F
//!     F....|....F
//!     FFFFF|FFFFF
//!  P1             P2
//! ```

use std::fmt;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::field::Field;
use crate::orientation::Orientation;
use crate::player::Player;
use crate::position::Position;
use crate::rotation::Rotation;
use crate::serial::{check_size, Serial};
use crate::setup::{BOARD_SIZE, SOURCE_OFFSET};
use crate::stone::Stone;

pub const INTERIOR_SIZE: u8 = BOARD_SIZE - 2;

/// Area classification of a frame cell.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub enum BoardArea {
    /// Playable interior.
    #[default]
    Player,
    /// Border cell with no function.
    Frame,
    /// Home area of a player.
    House,
    /// Garden area of a player.
    Garden,
    /// The central source.
    Source,
}

/// One cell of the static frame: a field plus area and owning player.
#[derive(Clone, Copy, Default, Debug)]
pub struct FrameField {
    pub field: Field,
    pub area: BoardArea,
    pub player: Player,
}

impl FrameField {
    pub fn is_static(&self) -> bool {
        matches!(
            self.area,
            BoardArea::Frame | BoardArea::House | BoardArea::Source
        )
    }
}

pub const HOUSE_ORB_COUNT: usize = 3;
pub const SOURCE_ORB_COUNT: usize = 4;

struct BoardFrame {
    fields: [[FrameField; BOARD_SIZE as usize]; BOARD_SIZE as usize],
    house_orb_positions: [[Position; HOUSE_ORB_COUNT]; Player::COUNT as usize],
    source_orb_positions: [Position; SOURCE_ORB_COUNT],
}

impl BoardFrame {
    fn build() -> BoardFrame {
        let mut frame = BoardFrame {
            fields: [[FrameField::default(); BOARD_SIZE as usize]; BOARD_SIZE as usize],
            house_orb_positions: [[Position::INVALID; HOUSE_ORB_COUNT]; Player::COUNT as usize],
            source_orb_positions: [Position::INVALID; SOURCE_ORB_COUNT],
        };
        let source = Position::new(SOURCE_OFFSET, SOURCE_OFFSET);
        for (player_index, rotation) in Rotation::all_clockwise().into_iter().enumerate() {
            let mut set = |pos: Position, stone: Stone, orientation: Orientation, area: BoardArea| {
                let target = pos.rotated(rotation, BOARD_SIZE);
                let cell = &mut frame.fields[target.y() as usize][target.x() as usize];
                cell.field = Field::new(stone, orientation - rotation, 0);
                cell.area = area;
            };
            use crate::board::BoardArea::{Frame, Garden, House, Source};
            use crate::orientation::Orientation::{East, North, South, West};
            set(Position::new(0, 0), Stone::OneCurveWithStop, East, House);
            set(Position::new(0, 1), Stone::SwitchWithStop, North, House);
            set(Position::new(0, 2), Stone::OneCurve, North, House);
            set(Position::new(0, 3), Stone::Empty, North, Frame);
            set(Position::new(0, 4), Stone::Empty, North, Frame);
            set(Position::new(1, 0), Stone::SwitchWithStop, East, House);
            set(Position::new(2, 0), Stone::OneCurve, South, House);
            set(Position::new(3, 0), Stone::Empty, North, Frame);
            set(Position::new(4, 0), Stone::Empty, North, Frame);
            set(Position::new(1, 1), Stone::Empty, North, Garden);
            set(Position::new(2, 1), Stone::Empty, North, Garden);
            set(Position::new(3, 1), Stone::Empty, North, Garden);
            set(Position::new(1, 2), Stone::Empty, North, Garden);
            set(Position::new(2, 2), Stone::Empty, North, Garden);
            set(Position::new(1, 3), Stone::Empty, North, Garden);
            set(source, Stone::OneCurveWithStop, West, Source);
            frame.source_orb_positions[player_index] = source.rotated(rotation, BOARD_SIZE);
            frame.house_orb_positions[player_index] = [
                Position::new(0, 0).rotated(rotation, BOARD_SIZE),
                Position::new(1, 0).rotated(rotation, BOARD_SIZE),
                Position::new(0, 1).rotated(rotation, BOARD_SIZE),
            ];
            for x in 0..BOARD_SIZE / 2 {
                for y in 0..BOARD_SIZE / 2 {
                    let pos = Position::new(x, y).rotated(rotation, BOARD_SIZE);
                    frame.fields[pos.y() as usize][pos.x() as usize].player =
                        Player::new(player_index as u8);
                }
            }
        }
        frame
    }

    fn field(&self, pos: Position) -> Option<&FrameField> {
        if pos.x() >= BOARD_SIZE || pos.y() >= BOARD_SIZE {
            return None;
        }
        Some(&self.fields[pos.y() as usize][pos.x() as usize])
    }
}

static FRAME: LazyLock<BoardFrame> = LazyLock::new(BoardFrame::build);

static ALL_NON_STATIC_POSITIONS: LazyLock<Vec<Position>> = LazyLock::new(|| {
    let mut result = Vec::new();
    for y in 1..BOARD_SIZE - 1 {
        for x in 1..BOARD_SIZE - 1 {
            let pos = Position::new(x, y);
            if !Board::is_static(pos) {
                result.push(pos);
            }
        }
    }
    result
});

/// The mutable part of the board: the 8×8 interior grid.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Board {
    state: [[Field; INTERIOR_SIZE as usize]; INTERIOR_SIZE as usize],
}

impl Board {
    pub fn new() -> Board {
        Board::default()
    }

    // ── static frame queries ────────────────────────────────────────

    pub fn is_source(pos: Position) -> bool {
        FRAME.field(pos).is_some_and(|f| f.area == BoardArea::Source)
    }

    pub fn is_house(pos: Position) -> bool {
        FRAME.field(pos).is_some_and(|f| f.area == BoardArea::House)
    }

    pub fn is_frame(pos: Position) -> bool {
        FRAME.field(pos).is_some_and(|f| f.area == BoardArea::Frame)
    }

    pub fn is_garden(pos: Position) -> bool {
        FRAME.field(pos).is_some_and(|f| f.area == BoardArea::Garden)
    }

    /// Off-board positions count as static, so nothing can be placed there.
    pub fn is_static(pos: Position) -> bool {
        FRAME.field(pos).map_or(true, FrameField::is_static)
    }

    pub fn area(pos: Position) -> BoardArea {
        FRAME.field(pos).map_or(BoardArea::Frame, |f| f.area)
    }

    /// The owning player of a house or garden cell.
    pub fn player_for_field(pos: Position) -> Player {
        FRAME.field(pos).map_or(Player::default(), |f| f.player)
    }

    pub fn house_orb_positions(player: Player) -> &'static [Position; HOUSE_ORB_COUNT] {
        &FRAME.house_orb_positions[player.index()]
    }

    pub fn source_orb_positions() -> &'static [Position; SOURCE_ORB_COUNT] {
        &FRAME.source_orb_positions
    }

    pub fn all_non_static_positions() -> &'static [Position] {
        &ALL_NON_STATIC_POSITIONS
    }

    // ── field access ────────────────────────────────────────────────

    /// The effective field at a position: the frame wins on static cells,
    /// everything else reads the interior grid. Off-board yields an empty
    /// field.
    pub fn field(&self, pos: Position) -> Field {
        match FRAME.field(pos) {
            Some(frame_field) if frame_field.is_static() => frame_field.field,
            Some(_) => self.state_field(pos).copied().unwrap_or_default(),
            None => Field::default(),
        }
    }

    fn state_field(&self, pos: Position) -> Option<&Field> {
        let x = pos.x().wrapping_sub(1);
        let y = pos.y().wrapping_sub(1);
        if x >= INTERIOR_SIZE || y >= INTERIOR_SIZE {
            return None;
        }
        Some(&self.state[y as usize][x as usize])
    }

    fn state_field_mut(&mut self, pos: Position) -> Result<&mut Field> {
        let x = pos.x().wrapping_sub(1);
        let y = pos.y().wrapping_sub(1);
        if x >= INTERIOR_SIZE || y >= INTERIOR_SIZE {
            return Err(Error::invariant(format!(
                "board: position {pos} outside the interior"
            )));
        }
        Ok(&mut self.state[y as usize][x as usize])
    }

    pub fn set_field(&mut self, pos: Position, stone: Stone, orientation: Orientation) -> Result<()> {
        if Self::is_static(pos) {
            return Err(Error::rule("tried to change a static field"));
        }
        self.state_field_mut(pos)?.set_stone(stone, orientation);
        Ok(())
    }

    pub fn set_new_orientation(&mut self, pos: Position, orientation: Orientation) -> Result<()> {
        if Self::is_static(pos) || !self.field(pos).can_rotate() {
            return Err(Error::rule("tried to rotate a static or fixed field"));
        }
        self.state_field_mut(pos)?.set_orientation(orientation);
        Ok(())
    }

    // ── legality ────────────────────────────────────────────────────

    /// A stone can go onto a non-static empty field that is not another
    /// player's garden (the active player is always player 0).
    pub fn can_player_place_stone(&self, pos: Position) -> bool {
        !Self::is_static(pos)
            && self.field(pos).is_empty()
            && !(Self::is_garden(pos) && Self::player_for_field(pos) != Player::new(0))
    }

    pub fn can_player_replace_stone(
        &self,
        pos: Position,
        new_stone: Stone,
        orientation: Orientation,
    ) -> bool {
        if Self::is_static(pos) {
            return false;
        }
        self.field(pos).is_valid_change(new_stone, orientation)
    }

    pub fn can_player_rotate_stone(&self, pos: Position, new_orientation: Orientation) -> bool {
        if Self::is_static(pos) {
            return false;
        }
        let field = self.field(pos);
        field.is_valid_change(field.stone(), new_orientation)
    }

    // ── enumerators ─────────────────────────────────────────────────

    pub fn all_place_one_action_positions(&self) -> Vec<Position> {
        Self::all_non_static_positions()
            .iter()
            .copied()
            .filter(|pos| self.can_player_place_stone(*pos))
            .collect()
    }

    pub fn all_place_two_action_positions(&self) -> Vec<(Position, Position)> {
        combined_position_pairs(&self.all_place_one_action_positions())
    }

    pub fn all_replace_one_action_positions(&self) -> Vec<Position> {
        self.non_static_positions_where(|field| !field.is_empty() && !field.has_ko_lock())
    }

    pub fn all_replace_two_action_positions(&self) -> Vec<(Position, Position)> {
        combined_position_pairs(&self.all_replace_one_action_positions())
    }

    pub fn all_rotate_one_action_positions(&self) -> Vec<Position> {
        self.non_static_positions_where(|field| !field.is_empty() && field.can_rotate())
    }

    pub fn all_rotate_two_action_positions(&self) -> Vec<(Position, Position)> {
        combined_position_pairs(&self.all_rotate_one_action_positions())
    }

    fn non_static_positions_where(&self, test: impl Fn(Field) -> bool) -> Vec<Position> {
        Self::all_non_static_positions()
            .iter()
            .copied()
            .filter(|pos| test(self.field(*pos)))
            .collect()
    }

    // ── turns and rotation ──────────────────────────────────────────

    /// Count every interior ko-lock down by one turn.
    pub fn next_turn(&mut self) {
        for row in &mut self.state {
            for field in row {
                field.next_turn();
            }
        }
    }

    /// The board rotated clockwise; the frame is rotation-symmetric.
    pub fn rotated(&self, rotation: Rotation) -> Board {
        let mut result = Board::default();
        for y in 0..INTERIOR_SIZE {
            for x in 0..INTERIOR_SIZE {
                let source = Position::new(x, y);
                let target = source.rotated(rotation, INTERIOR_SIZE);
                result.state[target.y() as usize][target.x() as usize] =
                    self.state[y as usize][x as usize].rotated(rotation);
            }
        }
        result
    }
}

fn combined_position_pairs(positions: &[Position]) -> Vec<(Position, Position)> {
    if positions.len() < 2 {
        return Vec::new();
    }
    let mut result = Vec::with_capacity(positions.len() * (positions.len() - 1) / 2);
    for (i, first) in positions.iter().enumerate() {
        for second in &positions[i + 1..] {
            result.push((*first, *second));
        }
    }
    result
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board:")?;
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                let pos = Position::new(x, y);
                let field = self.field(pos);
                if field.is_empty() {
                    write!(f, " .. ")?;
                } else {
                    write!(f, " {}{} ", field.stone(), field.orientation())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl Serial for Board {
    const DATA_SIZE: usize =
        Field::DATA_SIZE * (INTERIOR_SIZE as usize) * (INTERIOR_SIZE as usize);

    fn write_data(&self, data: &mut String) {
        for row in &self.state {
            for field in row {
                field.write_data(data);
            }
        }
    }

    fn from_data(data: &str) -> Result<Board> {
        check_size("Board", data, Self::DATA_SIZE)?;
        let mut board = Board::default();
        let mut offset = 0;
        for row in &mut board.state {
            for field in row {
                *field = Field::from_data(&data[offset..offset + Field::DATA_SIZE])?;
                offset += Field::DATA_SIZE;
            }
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_corners_hold_house_stones() {
        let board = Board::new();
        let field = board.field(Position::new(0, 0));
        assert_eq!(field.stone(), Stone::OneCurveWithStop);
        assert_eq!(field.orientation(), Orientation::East);
        assert!(Board::is_house(Position::new(0, 0)));

        let field = board.field(Position::new(9, 0));
        assert_eq!(field.stone(), Stone::OneCurveWithStop);
        assert_eq!(field.orientation(), Orientation::South);
        assert!(Board::is_house(Position::new(9, 0)));

        let field = board.field(Position::new(9, 9));
        assert_eq!(field.stone(), Stone::OneCurveWithStop);
        assert_eq!(field.orientation(), Orientation::West);
        assert!(Board::is_house(Position::new(9, 9)));

        let field = board.field(Position::new(0, 9));
        assert_eq!(field.stone(), Stone::OneCurveWithStop);
        assert_eq!(field.orientation(), Orientation::North);
        assert!(Board::is_house(Position::new(0, 9)));
    }

    #[test]
    fn source_is_a_2x2_block_pointing_outward() {
        let board = Board::new();
        let expectations = [
            (Position::new(4, 4), Orientation::West),
            (Position::new(5, 4), Orientation::North),
            (Position::new(5, 5), Orientation::East),
            (Position::new(4, 5), Orientation::South),
        ];
        for (pos, orientation) in expectations {
            let field = board.field(pos);
            assert!(Board::is_source(pos), "{pos} should be source");
            assert_eq!(field.stone(), Stone::OneCurveWithStop);
            assert_eq!(field.orientation(), orientation, "at {pos}");
        }
        assert_eq!(Board::source_orb_positions().len(), 4);
        for pos in Board::source_orb_positions() {
            assert!(Board::is_source(*pos));
        }
    }

    #[test]
    fn gardens_are_empty_and_not_static() {
        let board = Board::new();
        let pos = Position::new(1, 1);
        assert!(Board::is_garden(pos));
        assert!(!Board::is_static(pos));
        assert!(board.field(pos).is_empty());
        assert_eq!(Board::player_for_field(pos), Player::new(0));
    }

    #[test]
    fn house_positions_belong_to_their_players() {
        for player in Player::all() {
            for pos in Board::house_orb_positions(player) {
                assert!(Board::is_house(*pos));
                assert_eq!(Board::player_for_field(*pos), player);
            }
        }
        assert_eq!(
            *Board::house_orb_positions(Player::new(0)),
            [Position::new(0, 0), Position::new(1, 0), Position::new(0, 1)]
        );
    }

    #[test]
    fn non_static_positions_count() {
        // 8×8 interior minus the 2×2 source.
        assert_eq!(Board::all_non_static_positions().len(), 60);
    }

    #[test]
    fn place_rules() {
        let mut board = Board::new();
        let pos = Position::new(3, 4);
        assert!(board.can_player_place_stone(pos));
        board.set_field(pos, Stone::Crossing, Orientation::North).unwrap();
        assert!(!board.can_player_place_stone(pos));
        // Own garden is fine, other players' gardens are not.
        assert!(board.can_player_place_stone(Position::new(1, 1)));
        let other_garden = Position::new(1, 1).rotated(Rotation::CLOCKWISE_90, BOARD_SIZE);
        assert!(!board.can_player_place_stone(other_garden));
        // Static cells reject writes.
        assert!(board
            .set_field(Position::new(4, 4), Stone::Crossing, Orientation::North)
            .is_err());
        assert!(board
            .set_field(Position::new(0, 0), Stone::Crossing, Orientation::North)
            .is_err());
    }

    #[test]
    fn replace_and_rotate_rules() {
        let mut board = Board::new();
        let pos = Position::new(2, 2);
        board.set_field(pos, Stone::OneCurve, Orientation::North).unwrap();
        assert!(board.can_player_replace_stone(pos, Stone::Crossing, Orientation::North));
        assert!(!board.can_player_replace_stone(pos, Stone::OneCurve, Orientation::North));
        assert!(board.can_player_rotate_stone(pos, Orientation::East));
        assert!(!board.can_player_rotate_stone(pos, Orientation::North));
        board.set_new_orientation(pos, Orientation::East).unwrap();
        assert_eq!(board.field(pos).orientation(), Orientation::East);
        // A crossing cannot rotate at all.
        let cross = Position::new(6, 6);
        board.set_field(cross, Stone::Crossing, Orientation::North).unwrap();
        assert!(board.set_new_orientation(cross, Orientation::East).is_err());
    }

    #[test]
    fn rotation_round_trips_and_is_frame_consistent() {
        let mut board = Board::new();
        board
            .set_field(Position::new(3, 4), Stone::SwitchB, Orientation::East)
            .unwrap();
        board
            .set_field(Position::new(1, 1), Stone::OneCurve, Orientation::West)
            .unwrap();
        for rotation in Rotation::all_clockwise() {
            let there_and_back = board.rotated(rotation).rotated(rotation.reversed());
            assert_eq!(there_and_back, board);
        }
        // Four quarter turns are the identity.
        let mut rotated = board;
        for _ in 0..4 {
            rotated = rotated.rotated(Rotation::CLOCKWISE_90);
        }
        assert_eq!(rotated, board);
    }

    #[test]
    fn rotation_keeps_wiring_attached() {
        // An orb path segment: stone west of the source, entered from east.
        let mut board = Board::new();
        board
            .set_field(Position::new(3, 4), Stone::SwitchB, Orientation::East)
            .unwrap();
        use crate::anchor::Anchor;
        let exits = board
            .field(Position::new(3, 4))
            .connections_from(Anchor::East);
        let rotated = board.rotated(Rotation::CLOCKWISE_90);
        let new_pos = Position::new(3, 4).rotated(Rotation::CLOCKWISE_90, BOARD_SIZE);
        // East neighbors map onto north neighbors under (x,y)→(y,N−1−x).
        let new_exits = rotated
            .field(new_pos)
            .connections_from(Anchor::East.rotated(Rotation::CLOCKWISE_90.reversed()));
        let expected: crate::anchor::Anchors = exits
            .iter()
            .map(|a| a.rotated(Rotation::CLOCKWISE_90.reversed()))
            .collect();
        assert_eq!(new_exits, expected);
    }

    #[test]
    fn pair_enumeration_is_upper_triangular() {
        let positions = vec![
            Position::new(1, 1),
            Position::new(2, 1),
            Position::new(3, 1),
        ];
        let pairs = combined_position_pairs(&positions);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], (positions[0], positions[1]));
        assert_eq!(pairs[1], (positions[0], positions[2]));
        assert_eq!(pairs[2], (positions[1], positions[2]));
        assert!(combined_position_pairs(&positions[..1]).is_empty());
    }

    #[test]
    fn serialization_round_trips() {
        let mut board = Board::new();
        board
            .set_field(Position::new(3, 4), Stone::Crossing, Orientation::North)
            .unwrap();
        board
            .set_field(Position::new(7, 2), Stone::OneCurve, Orientation::West)
            .unwrap();
        let data = board.to_data();
        assert_eq!(data.len(), Board::DATA_SIZE);
        assert_eq!(Board::from_data(&data).unwrap(), board);
    }
}
