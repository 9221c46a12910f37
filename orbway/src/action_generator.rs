//! Enumeration of all legal one- and two-action sequences.
//!
//! The cases are gated by the number of stones in the active hand: placing
//! two stones needs two, a replace consumes the new and the dropped stone,
//! a double replace needs four, and extra draws need enough free slots to
//! leave room for the regular draw. Fields holding an orb are never targets
//! of a replace or rotate.

use crate::action::{Action, ActionSequence};
use crate::orientation::Orientation;
use crate::position::Position;
use crate::state::GameState;
use crate::stone::Stone;

pub struct ActionGenerator<'a> {
    state: &'a GameState,
}

impl<'a> ActionGenerator<'a> {
    pub fn new(state: &'a GameState) -> ActionGenerator<'a> {
        ActionGenerator { state }
    }

    /// All legal action sequences, in a stable order: place, replace, rotate,
    /// draw.
    pub fn all(&self) -> Vec<ActionSequence> {
        let mut result = Vec::with_capacity(self.count());
        self.for_each(|sequence| result.push(sequence));
        result
    }

    /// The number of sequences [`Self::all`] will produce.
    pub fn count(&self) -> usize {
        let mut count = 0;
        self.for_each(|_| count += 1);
        count
    }

    fn for_each(&self, mut add: impl FnMut(ActionSequence)) {
        let stone_count = self.state.action_pools().active().stone_count();
        self.add_place_actions(&mut add, stone_count);
        self.add_replace_actions(&mut add, stone_count);
        self.add_rotate_actions(&mut add, stone_count);
        self.add_extra_draw_actions(&mut add);
    }

    // ── place ───────────────────────────────────────────────────────

    fn add_place_actions(&self, add: &mut impl FnMut(ActionSequence), stone_count: usize) {
        if stone_count < 1 {
            return;
        }
        let board = self.state.board();
        let pool = self.state.action_pools().active();
        let positions = board.all_place_one_action_positions();
        for &position in &positions {
            for stone in pool.unique_stones() {
                for orientation in stone.unique_orientations().iter() {
                    add(ActionSequence::single(Action::place(
                        position,
                        stone,
                        orientation,
                    )));
                }
            }
        }
        if stone_count < 2 {
            return;
        }
        let stone_pairs = pool.unique_stone_pairs();
        for (first_pos, second_pos) in board.all_place_two_action_positions() {
            for &(first_stone, second_stone) in &stone_pairs {
                for first_orientation in first_stone.unique_orientations().iter() {
                    for second_orientation in second_stone.unique_orientations().iter() {
                        add(ActionSequence::pair(
                            Action::place(first_pos, first_stone, first_orientation),
                            Action::place(second_pos, second_stone, second_orientation),
                        ));
                    }
                }
            }
        }
    }

    // ── replace ─────────────────────────────────────────────────────

    fn add_replace_actions(&self, add: &mut impl FnMut(ActionSequence), stone_count: usize) {
        if stone_count < 2 {
            return;
        }
        let board = self.state.board();
        let pool = self.state.action_pools().active();
        let orbs = self.state.orb_positions();
        let stone_pairs = pool.unique_stone_pairs();
        for position in board.all_replace_one_action_positions() {
            if orbs.is_orb_at(position) {
                continue;
            }
            for &(new_stone, dropped_stone) in &stone_pairs {
                for orientation in new_stone.unique_orientations().iter() {
                    if board.can_player_replace_stone(position, new_stone, orientation) {
                        add(ActionSequence::single(Action::replace(
                            position,
                            new_stone,
                            orientation,
                            dropped_stone,
                        )));
                    }
                }
            }
        }
        if stone_count < 4 {
            return;
        }
        let stone_quads = pool.unique_stone_quads();
        for (first_pos, second_pos) in board.all_replace_two_action_positions() {
            if orbs.is_orb_at(first_pos) || orbs.is_orb_at(second_pos) {
                continue;
            }
            for &(first_new, second_new, first_dropped, second_dropped) in &stone_quads {
                for first_orientation in first_new.unique_orientations().iter() {
                    for second_orientation in second_new.unique_orientations().iter() {
                        if board.can_player_replace_stone(first_pos, first_new, first_orientation)
                            && board.can_player_replace_stone(
                                second_pos,
                                second_new,
                                second_orientation,
                            )
                        {
                            add(ActionSequence::pair(
                                Action::replace(
                                    first_pos,
                                    first_new,
                                    first_orientation,
                                    first_dropped,
                                ),
                                Action::replace(
                                    second_pos,
                                    second_new,
                                    second_orientation,
                                    second_dropped,
                                ),
                            ));
                        }
                    }
                }
            }
        }
    }

    // ── rotate ──────────────────────────────────────────────────────

    fn rotation_targets(&self, position: Position) -> Vec<Orientation> {
        let field = self.state.board().field(position);
        if !field.can_rotate() {
            return Vec::new();
        }
        let current = field.orientation();
        field
            .unique_orientations()
            .iter()
            .filter(|orientation| *orientation != current)
            .collect()
    }

    fn add_rotate_actions(&self, add: &mut impl FnMut(ActionSequence), stone_count: usize) {
        if stone_count < 1 {
            return;
        }
        let board = self.state.board();
        let pool = self.state.action_pools().active();
        let orbs = self.state.orb_positions();
        let dropped_stones = pool.unique_stones();
        for position in board.all_rotate_one_action_positions() {
            if orbs.is_orb_at(position) {
                continue;
            }
            for orientation in self.rotation_targets(position) {
                if !board.can_player_rotate_stone(position, orientation) {
                    continue;
                }
                for &dropped in &dropped_stones {
                    add(ActionSequence::single(Action::rotate(
                        position,
                        orientation,
                        dropped,
                    )));
                }
            }
        }
        if stone_count < 2 {
            return;
        }
        let dropped_pairs = pool.unique_stone_pairs();
        for (first_pos, second_pos) in board.all_rotate_two_action_positions() {
            if orbs.is_orb_at(first_pos) || orbs.is_orb_at(second_pos) {
                continue;
            }
            for first_orientation in self.rotation_targets(first_pos) {
                if !board.can_player_rotate_stone(first_pos, first_orientation) {
                    continue;
                }
                for second_orientation in self.rotation_targets(second_pos) {
                    if !board.can_player_rotate_stone(second_pos, second_orientation) {
                        continue;
                    }
                    for &(first_dropped, second_dropped) in &dropped_pairs {
                        add(ActionSequence::pair(
                            Action::rotate(first_pos, first_orientation, first_dropped),
                            Action::rotate(second_pos, second_orientation, second_dropped),
                        ));
                    }
                }
            }
        }
    }

    // ── extra draws ─────────────────────────────────────────────────

    fn add_extra_draw_actions(&self, add: &mut impl FnMut(ActionSequence)) {
        let free_slots = self.state.action_pools().active().free_slots();
        let resource = self.state.resource_pool();
        if free_slots > 1 {
            for stone in resource.all_action_one_extra_draw() {
                add(ActionSequence::single(Action::draw(stone)));
            }
        }
        if free_slots > 2 {
            for (first, second) in resource.all_action_two_extra_draws() {
                add(ActionSequence::pair(
                    Action::draw(first),
                    Action::draw(second),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionType;

    fn sequences_of_type(state: &GameState, action_type: ActionType) -> Vec<ActionSequence> {
        state
            .all_actions()
            .into_iter()
            .filter(|sequence| sequence.actions()[0].action_type() == action_type)
            .collect()
    }

    #[test]
    fn every_generated_sequence_applies_cleanly() {
        let mut state = GameState::starting_state();
        state
            .board_mut()
            .set_field(Position::new(3, 4), Stone::OneCurve, Orientation::North)
            .unwrap();
        state
            .board_mut()
            .set_field(Position::new(5, 2), Stone::SwitchB, Orientation::East)
            .unwrap();
        for sequence in state.all_actions() {
            assert!(
                state.after_action(&sequence).is_ok(),
                "sequence failed to apply: {sequence}"
            );
        }
    }

    #[test]
    fn starting_state_has_no_replace_or_rotate() {
        let state = GameState::starting_state();
        assert!(sequences_of_type(&state, ActionType::Replace).is_empty());
        assert!(sequences_of_type(&state, ActionType::Rotate).is_empty());
        assert!(!sequences_of_type(&state, ActionType::Place).is_empty());
    }

    #[test]
    fn full_hand_emits_no_extra_draws() {
        // The starting hand is full, so no slot is free for extra draws.
        let state = GameState::starting_state();
        assert!(sequences_of_type(&state, ActionType::Draw).is_empty());
    }

    #[test]
    fn draws_appear_once_slots_free_up() {
        let mut state = GameState::starting_state();
        state
            .action_pools_mut()
            .active_mut()
            .take(Stone::Crossing)
            .unwrap();
        state
            .action_pools_mut()
            .active_mut()
            .take(Stone::Crossing)
            .unwrap();
        // Two free slots: single draws only.
        let draws = sequences_of_type(&state, ActionType::Draw);
        assert!(!draws.is_empty());
        assert!(draws
            .iter()
            .all(|sequence| sequence.actions()[1].is_none()));
        state
            .action_pools_mut()
            .active_mut()
            .take(Stone::Crossing)
            .unwrap();
        // Three free slots: pairs join in.
        let draws = sequences_of_type(&state, ActionType::Draw);
        assert!(draws
            .iter()
            .any(|sequence| !sequence.actions()[1].is_none()));
    }

    #[test]
    fn place_orientations_are_unique_only() {
        let state = GameState::starting_state();
        // The starting hand holds A, B and C stones only; A and B have a
        // single unique orientation, C has two.
        for sequence in sequences_of_type(&state, ActionType::Place) {
            let action = sequence.actions()[0];
            assert!(action
                .action_stone()
                .unique_orientations()
                .contains(action.orientation()));
        }
    }

    #[test]
    fn rotate_skips_orb_fields() {
        let mut state = GameState::starting_state();
        // A rotatable stone next to the source, with an orb parked on it.
        state
            .board_mut()
            .set_field(Position::new(3, 4), Stone::OneCurveWithStop, Orientation::North)
            .unwrap();
        let before = sequences_of_type(&state, ActionType::Rotate);
        assert!(!before.is_empty());
        state
            .orb_positions_mut()
            .move_orb(Position::new(4, 4), Position::new(3, 4))
            .unwrap();
        let after = sequences_of_type(&state, ActionType::Rotate);
        assert!(after.is_empty());
    }

    #[test]
    fn count_matches_all() {
        let mut state = GameState::starting_state();
        state
            .board_mut()
            .set_field(Position::new(3, 4), Stone::OneCurve, Orientation::North)
            .unwrap();
        let generator = ActionGenerator::new(&state);
        assert_eq!(generator.count(), generator.all().len());
    }
}
