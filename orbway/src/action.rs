//! Single board actions and the two-action sequences that form the action
//! part of a move.

use std::fmt;

use crate::error::{Error, Result};
use crate::orientation::Orientation;
use crate::position::Position;
use crate::serial::{check_size, hex_digit_to_value, value_to_hex_digit, Serial};
use crate::state::GameState;
use crate::stone::Stone;

/// The maximum number of actions in one move.
pub const MAX_ACTIONS_PER_MOVE: usize = 2;

#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionType {
    /// No action, used as a sequence terminator.
    #[default]
    None = 0,
    /// Place a stone from the action pool on the board.
    Place = 1,
    /// Replace a stone on the board, dropping one pool stone.
    Replace = 2,
    /// Rotate a stone on the board, dropping one pool stone.
    Rotate = 3,
    /// Draw an extra stone from the resource pool.
    Draw = 4,
}

impl ActionType {
    fn from_value(value: u8) -> ActionType {
        match value {
            1 => ActionType::Place,
            2 => ActionType::Replace,
            3 => ActionType::Rotate,
            4 => ActionType::Draw,
            _ => ActionType::None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionType::None => "None",
            ActionType::Place => "Place",
            ActionType::Replace => "Replace",
            ActionType::Rotate => "Rotate",
            ActionType::Draw => "Draw",
        }
    }
}

/// A single board mutation.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct Action {
    action_type: ActionType,
    action_stone: Stone,
    dropped_stone: Stone,
    orientation: Orientation,
    position: Position,
}

impl Action {
    pub fn place(position: Position, stone: Stone, orientation: Orientation) -> Action {
        Action {
            action_type: ActionType::Place,
            action_stone: stone,
            dropped_stone: Stone::Empty,
            orientation,
            position,
        }
    }

    pub fn replace(
        position: Position,
        stone: Stone,
        orientation: Orientation,
        dropped_stone: Stone,
    ) -> Action {
        Action {
            action_type: ActionType::Replace,
            action_stone: stone,
            dropped_stone,
            orientation,
            position,
        }
    }

    pub fn rotate(position: Position, new_orientation: Orientation, dropped_stone: Stone) -> Action {
        Action {
            action_type: ActionType::Rotate,
            action_stone: Stone::Empty,
            dropped_stone,
            orientation: new_orientation,
            position,
        }
    }

    pub fn draw(stone: Stone) -> Action {
        Action {
            action_type: ActionType::Draw,
            action_stone: stone,
            dropped_stone: Stone::Empty,
            orientation: Orientation::North,
            position: Position::INVALID,
        }
    }

    pub fn is_none(self) -> bool {
        self.action_type == ActionType::None
    }

    pub fn action_type(self) -> ActionType {
        self.action_type
    }

    pub fn action_stone(self) -> Stone {
        self.action_stone
    }

    pub fn dropped_stone(self) -> Stone {
        self.dropped_stone
    }

    pub fn orientation(self) -> Orientation {
        self.orientation
    }

    pub fn position(self) -> Position {
        self.position
    }

    /// Apply this action to the state, validating it first.
    pub fn apply_to(self, state: &mut GameState) -> Result<()> {
        match self.action_type {
            ActionType::Place => self.apply_place(state),
            ActionType::Replace => self.apply_replace(state),
            ActionType::Rotate => self.apply_rotate(state),
            ActionType::Draw => self.apply_draw(state),
            ActionType::None => Ok(()),
        }
    }

    fn apply_place(self, state: &mut GameState) -> Result<()> {
        if !state.action_pools().active().has_stone(self.action_stone)? {
            return Err(Error::rule(
                "tried to place a stone that is not in the action pool",
            ));
        }
        if !state.board().can_player_place_stone(self.position) {
            return Err(Error::rule(
                "tried to place a stone on an occupied or forbidden position",
            ));
        }
        state
            .board_mut()
            .set_field(self.position, self.action_stone, self.orientation)?;
        state.action_pools_mut().active_mut().take(self.action_stone)
    }

    fn apply_replace(self, state: &mut GameState) -> Result<()> {
        if state.action_pools().active().stone_count() < 2 {
            return Err(Error::rule(
                "a replace action requires at least two stones in the action pool",
            ));
        }
        if !state
            .action_pools()
            .active()
            .has_stones(self.action_stone, self.dropped_stone)?
        {
            return Err(Error::rule(
                "the action or dropped stone is missing in the action pool",
            ));
        }
        if !state
            .board()
            .can_player_replace_stone(self.position, self.action_stone, self.orientation)
        {
            return Err(Error::rule(
                "tried to replace a stone on an invalid position or without changing the situation",
            ));
        }
        let displaced = state.board().field(self.position).stone();
        state.resource_pool_mut().add(displaced, 1);
        state.action_pools_mut().active_mut().take(self.action_stone)?;
        state
            .board_mut()
            .set_field(self.position, self.action_stone, self.orientation)?;
        state
            .action_pools_mut()
            .active_mut()
            .take(self.dropped_stone)?;
        state.resource_pool_mut().add(self.dropped_stone, 1);
        Ok(())
    }

    fn apply_rotate(self, state: &mut GameState) -> Result<()> {
        if state.action_pools().active().is_empty() {
            return Err(Error::rule(
                "a rotate action requires at least one stone in the action pool",
            ));
        }
        if !state.action_pools().active().has_stone(self.dropped_stone)? {
            return Err(Error::rule(
                "the dropped stone is missing in the action pool",
            ));
        }
        if !self.action_stone.is_empty() {
            return Err(Error::rule("a rotate action carries no action stone"));
        }
        if !state
            .board()
            .can_player_rotate_stone(self.position, self.orientation)
        {
            return Err(Error::rule(
                "cannot rotate the stone on this position to this orientation",
            ));
        }
        state
            .board_mut()
            .set_new_orientation(self.position, self.orientation)?;
        state
            .action_pools_mut()
            .active_mut()
            .take(self.dropped_stone)?;
        state.resource_pool_mut().add(self.dropped_stone, 1);
        Ok(())
    }

    fn apply_draw(self, state: &mut GameState) -> Result<()> {
        if state.action_pools().active().is_full() {
            return Err(Error::rule(
                "a draw action requires a free slot in the action pool",
            ));
        }
        if !state.resource_pool().has_stone(self.action_stone) {
            return Err(Error::rule(
                "tried to draw a stone that is not in the resource pool",
            ));
        }
        state.resource_pool_mut().take(self.action_stone, 1)?;
        state.action_pools_mut().active_mut().add(self.action_stone)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.action_type {
            ActionType::None => Ok(()),
            ActionType::Place => write!(
                f,
                "Place({}{} => {})",
                self.action_stone, self.orientation, self.position
            ),
            ActionType::Replace => write!(
                f,
                "Replace({}{} => {}, drop={})",
                self.action_stone, self.orientation, self.position, self.dropped_stone
            ),
            ActionType::Rotate => write!(
                f,
                "Rotate({} to {}, drop={})",
                self.position, self.orientation, self.dropped_stone
            ),
            ActionType::Draw => write!(f, "Draw({})", self.action_stone),
        }
    }
}

impl Serial for Action {
    const DATA_SIZE: usize =
        1 + Stone::DATA_SIZE + Orientation::DATA_SIZE + Stone::DATA_SIZE + Position::DATA_SIZE;

    fn write_data(&self, data: &mut String) {
        data.push(value_to_hex_digit(self.action_type as u8));
        self.action_stone.write_data(data);
        self.orientation.write_data(data);
        self.dropped_stone.write_data(data);
        self.position.write_data(data);
    }

    fn from_data(data: &str) -> Result<Action> {
        check_size("Action", data, Self::DATA_SIZE)?;
        Ok(Action {
            action_type: ActionType::from_value(hex_digit_to_value(data.as_bytes()[0])),
            action_stone: Stone::from_data(&data[1..2])?,
            orientation: Orientation::from_data(&data[2..3])?,
            dropped_stone: Stone::from_data(&data[3..4])?,
            position: Position::from_data(&data[4..6])?,
        })
    }
}

/// Up to two actions executed in order; unused slots hold `None` actions.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
pub struct ActionSequence {
    sequence: [Action; MAX_ACTIONS_PER_MOVE],
}

impl ActionSequence {
    pub fn single(action: Action) -> ActionSequence {
        ActionSequence {
            sequence: [action, Action::default()],
        }
    }

    pub fn pair(first: Action, second: Action) -> ActionSequence {
        ActionSequence {
            sequence: [first, second],
        }
    }

    pub fn has_no_actions(&self) -> bool {
        self.sequence[0].is_none()
    }

    pub fn actions(&self) -> &[Action; MAX_ACTIONS_PER_MOVE] {
        &self.sequence
    }

    /// Apply all actions of the sequence in order.
    pub fn apply_to(&self, state: &mut GameState) -> Result<()> {
        for action in &self.sequence {
            if !action.is_none() {
                action.apply_to(state)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ActionSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_no_actions() {
            return write!(f, "(no actions)");
        }
        let mut first = true;
        for action in &self.sequence {
            if action.is_none() {
                break;
            }
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{action}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serial for ActionSequence {
    const DATA_SIZE: usize = Action::DATA_SIZE * MAX_ACTIONS_PER_MOVE;

    fn write_data(&self, data: &mut String) {
        for action in &self.sequence {
            action.write_data(data);
        }
    }

    fn from_data(data: &str) -> Result<ActionSequence> {
        check_size("ActionSequence", data, Self::DATA_SIZE)?;
        let mut result = ActionSequence::default();
        for (i, action) in result.sequence.iter_mut().enumerate() {
            let offset = i * Action::DATA_SIZE;
            *action = Action::from_data(&data[offset..offset + Action::DATA_SIZE])?;
        }
        Ok(result)
    }
}
