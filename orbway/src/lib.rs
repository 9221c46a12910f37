//! # Orbway — core game engine and self-play simulator
//!
//! A 4-player abstract board game on a 10×10 grid. Players place, replace and
//! rotate track *stones* and navigate *orbs* along the resulting wiring toward
//! their home corner; three orbs in the house win the game.
//!
//! The crate is organized in dependency order:
//!
//! | Layer | Modules | Description |
//! |-------|---------|-------------|
//! | Geometry | [`rotation`], [`orientation`], [`position`], [`anchor`] | quarter-turn rotations, the four orientations, 4-bit grid coordinates, connection anchors |
//! | Stones | [`stone`] | the 11 stone kinds and their compile-time wiring tables |
//! | Board | [`field`], [`board`] | bit-packed fields, the static frame and the mutable 8×8 interior |
//! | Pools & orbs | [`pool`], [`orbs`] | player hands, the shared resource pool, orb tracking with ko-locks |
//! | Moves | [`action`], [`action_generator`], [`orb_move`], [`orb_move_generator`], [`game_move`] | action sequences, the combinatorial action enumeration, the orb-path DFS |
//! | Game | [`state`], [`game_log`], [`simulator`] | state transitions, per-game logs, the self-play loop |
//! | Rating | [`rating`] | per-turn rating adjustments and accumulated state ratings |
//! | Plumbing | [`agent`], [`backend`], [`serial`], [`error`] | agent/backend traits and registries, text serialization, error types |
//!
//! States are comparable and hashable under board symmetry: rotating a state
//! by +90° maps it onto the next player's point of view, and every state in a
//! game log is normalized so the active player sits in the top-left corner.

pub mod action;
pub mod action_generator;
pub mod agent;
pub mod anchor;
pub mod backend;
pub mod board;
pub mod error;
pub mod field;
pub mod game_log;
pub mod game_move;
pub mod orbs;
pub mod orb_move;
pub mod orb_move_generator;
pub mod orientation;
pub mod player;
pub mod pool;
pub mod position;
pub mod random_agent;
pub mod rating;
pub mod rotation;
pub mod serial;
pub mod setup;
pub mod simulator;
pub mod state;
pub mod stone;

pub use action::{Action, ActionSequence, ActionType};
pub use agent::{Agent, AgentRegistry, PlayerAgents};
pub use anchor::{Anchor, Anchors};
pub use backend::{Backend, BackendRegistry, MemoryBackend};
pub use board::Board;
pub use error::{Error, Result};
pub use field::Field;
pub use game_log::{GameLog, GameTurn};
pub use game_move::GameMove;
pub use orbs::{OrbPosition, OrbPositions};
pub use orb_move::OrbMove;
pub use orientation::{Orientation, Orientations};
pub use player::Player;
pub use pool::{ActionPool, ActionPools, ResourcePool};
pub use position::Position;
pub use random_agent::RandomAgent;
pub use rating::{GameRating, Rating, RatingAdjustment, RollingAverage};
pub use rotation::Rotation;
pub use serial::Serial;
pub use simulator::{simulate_batch, GameOutcome, GameSimulator};
pub use state::GameState;
pub use stone::Stone;
