//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Millisecond clock advanced explicitly, no wall time
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, input or network dependencies

pub mod actions;
pub mod grid;
pub mod interaction;
pub mod motion;
pub mod registry;
pub mod session;
pub mod state;
pub mod timers;

pub use actions::{CommandError, PlayerCommand};
pub use grid::{Scene, clamp, clamp_pos, in_bounds, is_building_footprint, is_door};
pub use registry::EntityRegistry;
pub use session::{Session, Snapshot};
pub use state::{
    Bomb, BombStatus, EntityId, Facing, GameEvent, Hazard, Patroller, PlayerState,
};
pub use timers::{Effect, Timers};
