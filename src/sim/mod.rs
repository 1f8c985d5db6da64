//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, scaled by the session's time scale
//! - Stable iteration order (by entity ID)
//! - Level geometry reached only through [`SpatialQuery`]
//! - No rendering, audio or platform dependencies

pub mod block;
pub mod enemy;
pub mod events;
pub mod grid;
pub mod ledger;
pub mod player;
pub mod query;
pub mod state;
pub mod tick;
pub mod timer;

pub use block::{BlockState, MovableBlock, ShoveAccepted, ShoveRejection, ShoveRequest, check_shove_path};
pub use enemy::{Cannonball, CannonballPool, Enemy};
pub use events::GameEvent;
pub use grid::{Cardinal, GridCell, cell_behind, cell_in_front, cell_right_of};
pub use ledger::{Checkpoint, CheckpointLedger};
pub use player::{Damage, Player, Tool};
pub use query::{BlockId, Collider, GridWorld, Hit, SceneGeometry, SceneView, SpatialQuery, SurfaceTag};
pub use state::{RunStats, Session, Treasure, TreasureState};
pub use tick::{TickInput, tick};
pub use timer::Sequence;
