//! Depth-first search over the track wiring for all legal orb destinations.
//!
//! The search keeps an explicit stack of travel nodes. Each node records how
//! the orb entered a field, which exit is currently selected and which exits
//! remain. A path ends when an exit selects the central stop; the candidate
//! is reported and the search backtracks. A step is rejected when it would
//! revisit a (position, entry-anchor) pair already on the stack (a loop),
//! when the travel between the two fields is illegal, or when the target
//! field is empty or offers no continuation.

use crate::anchor::Anchor;
use crate::error::{Error, Result};
use crate::orb_move::{can_travel, OrbMove, TravelNode, TravelPoint};
use crate::board::Board;
use crate::player::Player;
use crate::position::Position;
use crate::state::GameState;

const MINIMUM_STACK_SIZE: usize = 64;
const MAXIMUM_STACK_SIZE: usize = 1024;

pub struct OrbMoveGenerator<'a> {
    state: &'a GameState,
    stack: Vec<TravelNode>,
}

impl<'a> OrbMoveGenerator<'a> {
    pub fn new(state: &'a GameState) -> OrbMoveGenerator<'a> {
        OrbMoveGenerator {
            state,
            stack: Vec::with_capacity(MINIMUM_STACK_SIZE),
        }
    }

    /// All legal orb moves for the active player, the no-move option first.
    pub fn all_moves(&mut self) -> Result<Vec<OrbMove>> {
        let mut result = vec![OrbMove::default()];
        for orb in self.state.orb_positions().positions() {
            let start = orb.position;
            if start.is_invalid() {
                break;
            }
            if Board::is_house(start) && Board::player_for_field(start) != Player::new(0) {
                continue;
            }
            let mut stops: Vec<Position> = Vec::new();
            self.follow_all_paths(start, |stop| stops.push(stop))?;
            for stop in stops {
                if self.state.orb_positions().is_orb_at(stop) {
                    continue;
                }
                if self.state.orb_positions().ko_position(start) == stop {
                    continue;
                }
                let orb_move = OrbMove::new(start, stop);
                if !result.contains(&orb_move) {
                    result.push(orb_move);
                }
            }
        }
        Ok(result)
    }

    /// Walk every path from `start` and report each reachable stop position.
    fn follow_all_paths(
        &mut self,
        start: Position,
        mut on_stop: impl FnMut(Position),
    ) -> Result<()> {
        self.stack.clear();
        self.push_next(TravelPoint::new(start, Anchor::Stop))?;
        while let Some(node) = self.stack.last_mut() {
            if node.reached_stop() {
                on_stop(node.position());
                node.remove_current_option();
            } else if self.travel_forward()? {
                continue;
            }
            if !self
                .stack
                .last()
                .map(TravelNode::has_options)
                .unwrap_or(false)
            {
                self.travel_back();
            }
        }
        Ok(())
    }

    /// Try to continue the path from the top node's selected exit. Returns
    /// `true` when a new node was pushed.
    fn travel_forward(&mut self) -> Result<bool> {
        let node = match self.stack.last_mut() {
            Some(node) => node,
            None => return Ok(false),
        };
        if !node.can_travel_forward() && !node.select_next_option() {
            return Ok(false);
        }
        let node_position = node.position();
        let next = node.next_point();
        if !self.does_loop(next) && can_travel(node_position, next.position) {
            if self.push_next(next)? {
                return Ok(true);
            }
        }
        if let Some(node) = self.stack.last_mut() {
            node.remove_current_option();
        }
        Ok(false)
    }

    /// A step loops when its (position, entry-anchor) already lies on the
    /// path.
    fn does_loop(&self, next: TravelPoint) -> bool {
        self.stack
            .iter()
            .rev()
            .any(|node| node.entry_point() == next)
    }

    /// Push a node for the next travel point unless the target field is
    /// empty, off the board, or a dead end.
    fn push_next(&mut self, next: TravelPoint) -> Result<bool> {
        if next.position.is_invalid() {
            return Ok(false);
        }
        let field = self.state.board().field(next.position);
        if field.is_empty() {
            return Ok(false);
        }
        let Some(node) = TravelNode::enter(next, field) else {
            return Ok(false);
        };
        if self.stack.len() >= MAXIMUM_STACK_SIZE {
            return Err(Error::invariant("orb path search: stack size exceeded"));
        }
        self.stack.push(node);
        Ok(true)
    }

    /// Pop until a node with another option turns up.
    fn travel_back(&mut self) {
        while self.stack.pop().is_some() {
            if let Some(node) = self.stack.last_mut() {
                if node.select_next_option() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::Orientation;
    use crate::stone::Stone;

    fn place(state: &mut GameState, x: u8, y: u8, stone: Stone, orientation: Orientation) {
        state
            .board_mut()
            .set_field(Position::new(x, y), stone, orientation)
            .unwrap();
    }

    fn all_moves(state: &GameState) -> Vec<OrbMove> {
        OrbMoveGenerator::new(state).all_moves().unwrap()
    }

    #[test]
    fn starting_state_has_only_the_no_move() {
        let state = GameState::starting_state();
        let moves = all_moves(&state);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].is_no_move());
    }

    #[test]
    fn one_reachable_stop() {
        let mut state = GameState::starting_state();
        place(&mut state, 3, 4, Stone::Crossing, Orientation::North);
        place(&mut state, 2, 4, Stone::TwoCurves, Orientation::North);
        place(&mut state, 2, 3, Stone::Crossing, Orientation::North);
        place(&mut state, 2, 2, Stone::CrossingWithStop, Orientation::North);
        let moves = all_moves(&state);
        assert_eq!(moves.len(), 2);
        assert!(moves[0].is_no_move());
        assert_eq!(moves[1].start(), Position::new(4, 4));
        assert_eq!(moves[1].stop(), Position::new(2, 2));
    }

    #[test]
    fn many_reachable_stops() {
        let mut state = GameState::starting_state();
        place(&mut state, 3, 4, Stone::Crossing, Orientation::North);
        place(&mut state, 2, 4, Stone::TwoCurves, Orientation::North);
        place(&mut state, 2, 3, Stone::SwitchB, Orientation::South);
        place(&mut state, 2, 2, Stone::CrossingWithStop, Orientation::North);
        place(&mut state, 1, 3, Stone::CrossingWithStop, Orientation::North);
        place(&mut state, 3, 3, Stone::CrossingWithStop, Orientation::North);
        place(&mut state, 4, 3, Stone::SwitchA, Orientation::North);
        place(&mut state, 4, 2, Stone::CrossingWithStop, Orientation::North);
        place(&mut state, 5, 3, Stone::Crossing, Orientation::North);
        place(&mut state, 5, 2, Stone::TwoCurves, Orientation::North);
        place(&mut state, 6, 4, Stone::CrossingWithStop, Orientation::North);
        let moves = all_moves(&state);
        assert_eq!(moves.len(), 7);
        assert!(moves[0].is_no_move());
        for expected in [
            OrbMove::new(Position::new(4, 4), Position::new(2, 2)),
            OrbMove::new(Position::new(4, 4), Position::new(1, 3)),
            OrbMove::new(Position::new(4, 4), Position::new(3, 3)),
            OrbMove::new(Position::new(4, 4), Position::new(4, 2)),
            OrbMove::new(Position::new(5, 4), Position::new(4, 2)),
            OrbMove::new(Position::new(5, 4), Position::new(6, 4)),
        ] {
            assert!(moves.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn dead_ends_produce_no_moves() {
        let mut state = GameState::starting_state();
        place(&mut state, 3, 4, Stone::Crossing, Orientation::North);
        place(&mut state, 2, 4, Stone::Crossing, Orientation::North);
        place(&mut state, 4, 3, Stone::Crossing, Orientation::North);
        place(&mut state, 4, 2, Stone::Crossing, Orientation::North);
        place(&mut state, 4, 1, Stone::Crossing, Orientation::North);
        place(&mut state, 3, 5, Stone::Crossing, Orientation::North);
        place(&mut state, 1, 5, Stone::CrossingWithStop, Orientation::North);
        let moves = all_moves(&state);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].is_no_move());
    }

    #[test]
    fn no_path_back_into_the_source() {
        let mut state = GameState::starting_state();
        place(&mut state, 3, 4, Stone::Crossing, Orientation::North);
        place(&mut state, 2, 4, Stone::Crossing, Orientation::North);
        place(&mut state, 1, 4, Stone::CrossingWithStop, Orientation::North);
        state
            .orb_positions_mut()
            .move_orb(Position::new(4, 4), Position::new(1, 4))
            .unwrap();
        for _ in 0..4 {
            state.orb_positions_mut().next_turn();
        }
        let moves = all_moves(&state);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].is_no_move());
    }

    #[test]
    fn orbs_in_the_house_stay_put() {
        let mut state = GameState::starting_state();
        place(&mut state, 1, 1, Stone::CrossingWithStop, Orientation::North);
        place(&mut state, 2, 1, Stone::CrossingWithStop, Orientation::North);
        place(&mut state, 1, 2, Stone::CrossingWithStop, Orientation::North);
        for (from, to) in [
            (Position::new(4, 4), Position::new(0, 0)),
            (Position::new(5, 4), Position::new(1, 0)),
            (Position::new(4, 5), Position::new(0, 1)),
        ] {
            state.orb_positions_mut().move_orb(from, to).unwrap();
        }
        let moves = all_moves(&state);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].is_no_move());
    }

    #[test]
    fn loops_terminate() {
        let mut state = GameState::starting_state();
        place(&mut state, 3, 4, Stone::SwitchA, Orientation::West);
        place(&mut state, 2, 4, Stone::Crossing, Orientation::North);
        place(&mut state, 1, 4, Stone::TwoCurves, Orientation::North);
        place(&mut state, 1, 3, Stone::Crossing, Orientation::North);
        place(&mut state, 1, 2, Stone::TwoCurves, Orientation::East);
        place(&mut state, 2, 2, Stone::Crossing, Orientation::North);
        place(&mut state, 3, 2, Stone::TwoCurves, Orientation::North);
        place(&mut state, 3, 3, Stone::Crossing, Orientation::North);
        let moves = all_moves(&state);
        assert_eq!(moves.len(), 1);
        assert!(moves[0].is_no_move());
    }

    #[test]
    fn ko_lock_filters_the_way_back() {
        let mut state = GameState::starting_state();
        place(&mut state, 3, 4, Stone::Crossing, Orientation::North);
        place(&mut state, 2, 4, Stone::TwoCurves, Orientation::North);
        place(&mut state, 2, 3, Stone::Crossing, Orientation::North);
        place(&mut state, 2, 2, Stone::CrossingWithStop, Orientation::North);
        // Move the orb to the stop; the path back to the source is barred by
        // the source rule, and the ko-lock bars (2,2) for the orb still there.
        state
            .orb_positions_mut()
            .move_orb(Position::new(4, 4), Position::new(2, 2))
            .unwrap();
        let moves = all_moves(&state);
        // The orb at (2,2) cannot reach another stop; no move but no-move.
        assert_eq!(moves.len(), 1);
    }
}
