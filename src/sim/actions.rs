//! Player commands: move, enter/exit, defuse, detonate
//!
//! Commands whose preconditions are not met are silent no-ops. Interaction
//! resolution afterwards is the caller's job.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::{Scene, clamp_pos, is_door, is_walkable};
use super::registry::EntityRegistry;
use super::state::{BombStatus, EntityId, PlayerState};
use super::timers::{Effect, Timers};
use crate::consts::*;

pub const ENTERED_MESSAGE: &str = "Entered Teaching Building";
pub const RETURNED_MESSAGE: &str = "Returned to Campus";
pub const DEFUSED_MESSAGE: &str = "Bomb Defused! +100";
pub const DETONATED_MESSAGE: &str = "BOOM! Campus property damage.";

/// Discrete commands from the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    Move { dx: i32, dy: i32 },
    EnterOrExit,
    DefuseSelectedBomb,
    DetonateSelectedBomb,
}

impl PlayerCommand {
    pub const UP: Self = Self::Move { dx: 0, dy: -1 };
    pub const DOWN: Self = Self::Move { dx: 0, dy: 1 };
    pub const LEFT: Self = Self::Move { dx: -1, dy: 0 };
    pub const RIGHT: Self = Self::Move { dx: 1, dy: 0 };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Moves must be a single unit step on exactly one axis
    #[error("invalid move delta ({dx}, {dy}); expected a unit step on one axis")]
    InvalidDelta { dx: i32, dy: i32 },

    #[error("session has ended")]
    SessionEnded,
}

/// Step the player by `(dx, dy)`.
///
/// The message is cleared even when the building blocks the step.
pub fn move_player(player: &mut PlayerState, dx: i32, dy: i32) -> Result<(), CommandError> {
    if dx.abs() + dy.abs() != 1 {
        return Err(CommandError::InvalidDelta { dx, dy });
    }

    let target = clamp_pos(player.pos + IVec2::new(dx, dy));
    if is_walkable(player.scene, target) {
        player.pos = target;
    }
    player.set_message("");
    Ok(())
}

/// Use the door under the player, if any. Returns the new scene.
pub fn enter_or_exit(player: &mut PlayerState) -> Option<Scene> {
    let pos = player.pos;
    if !is_door(player.scene, pos.x, pos.y) {
        return None;
    }

    let (scene, arrival, message) = match player.scene {
        Scene::Campus => (Scene::Building, BUILDING_ARRIVAL, ENTERED_MESSAGE),
        Scene::Building => (Scene::Campus, CAMPUS_ARRIVAL, RETURNED_MESSAGE),
    };
    player.scene = scene;
    player.pos = arrival;
    player.set_message(message);
    Some(scene)
}

/// Defuse the selected bomb. Returns its id when something changed.
pub fn defuse_selected_bomb(
    player: &mut PlayerState,
    registry: &mut EntityRegistry,
) -> Option<EntityId> {
    let id = player.selected_bomb?;
    let bomb = registry.bomb_mut(id)?;
    if !bomb.settle(BombStatus::Diffused) {
        return None;
    }

    player.reward(DEFUSE_REWARD);
    player.set_message(DEFUSED_MESSAGE);
    Some(id)
}

/// Detonate the selected bomb and queue its removal.
///
/// Removal fires after `BOMB_CLEANUP_MS` no matter what happens meanwhile.
pub fn detonate_selected_bomb(
    player: &mut PlayerState,
    registry: &mut EntityRegistry,
    timers: &mut Timers,
) -> Option<(EntityId, IVec2)> {
    let id = player.selected_bomb?;
    let bomb = registry.bomb_mut(id)?;
    if !bomb.settle(BombStatus::Exploded) {
        return None;
    }
    let pos = bomb.pos;

    player.set_message(DETONATED_MESSAGE);
    timers.schedule(BOMB_CLEANUP_MS, Effect::RemoveBomb(id));
    Some((id, pos))
}
