//! Entity and player state
//!
//! Entities keep their scene tag for life; positions only change through
//! the motion controller.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::{Scene, clamp_pos};
use crate::consts::*;

/// Session-unique entity identifier (shared across all entity kinds)
pub type EntityId = u32;

/// Bomb lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombStatus {
    /// Waiting to be defused or detonated
    Active,
    /// Detonated; removed from the registry after `BOMB_CLEANUP_MS`
    Exploded,
    /// Defused; kept so renderers can suppress it
    Diffused,
}

/// A bomb placed on one of the scenes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub(crate) id: EntityId,
    pub(crate) pos: IVec2,
    pub(crate) scene: Scene,
    pub(crate) status: BombStatus,
}

impl Bomb {
    pub(crate) fn new(id: EntityId, pos: IVec2, scene: Scene) -> Self {
        Self {
            id,
            pos: clamp_pos(pos),
            scene,
            status: BombStatus::Active,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn status(&self) -> BombStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == BombStatus::Active
    }

    /// Move out of `Active`. Returns false (and changes nothing) once terminal.
    pub(crate) fn settle(&mut self, status: BombStatus) -> bool {
        if !self.is_active() || status == BombStatus::Active {
            return false;
        }
        self.status = status;
        true
    }
}

/// Which way a patroller sprite faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

/// A roaming teacher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patroller {
    pub(crate) id: EntityId,
    pub(crate) pos: IVec2,
    pub(crate) scene: Scene,
    pub(crate) facing: Facing,
}

impl Patroller {
    pub(crate) fn new(id: EntityId, pos: IVec2, scene: Scene, facing: Facing) -> Self {
        Self {
            id,
            pos: clamp_pos(pos),
            scene,
            facing,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    /// Move to `to`, turning toward any horizontal movement
    pub(crate) fn step_to(&mut self, to: IVec2) {
        if to.x > self.pos.x {
            self.facing = Facing::Right;
        } else if to.x < self.pos.x {
            self.facing = Facing::Left;
        }
        self.pos = to;
    }
}

/// A moving manhole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub(crate) id: EntityId,
    pub(crate) pos: IVec2,
    pub(crate) scene: Scene,
}

impl Hazard {
    pub(crate) fn new(id: EntityId, pos: IVec2, scene: Scene) -> Self {
        Self {
            id,
            pos: clamp_pos(pos),
            scene,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }
}

/// Greeting shown before the first move
pub const WELCOME_MESSAGE: &str = "Welcome to 3D Campus!";

/// Everything about the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub(crate) pos: IVec2,
    pub(crate) scene: Scene,
    pub(crate) score: u32,
    pub(crate) selected_bomb: Option<EntityId>,
    pub(crate) message: String,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            pos: PLAYER_SPAWN,
            scene: Scene::Campus,
            score: 0,
            selected_bomb: None,
            message: WELCOME_MESSAGE.to_string(),
        }
    }
}

impl PlayerState {
    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn selected_bomb(&self) -> Option<EntityId> {
        self.selected_bomb
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Subtract points, flooring at zero
    pub(crate) fn penalize(&mut self, points: u32) {
        self.score = self.score.saturating_sub(points);
    }

    pub(crate) fn reward(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}

/// Notable things that happened while applying a command or advancing time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An active bomb became selected under the player
    BombUnderfoot { bomb: EntityId },
    /// Player shares a tile with a teacher
    CaughtByPatroller { patroller: EntityId, penalty: u32 },
    /// Player stepped into (or was run over by) a hole
    FellIntoHazard { hazard: EntityId, penalty: u32 },
    /// Player was put back on the respawn tile
    PlayerRespawned { pos: IVec2 },
    SceneChanged { scene: Scene },
    BombDefused { bomb: EntityId, reward: u32 },
    BombDetonated { bomb: EntityId, pos: IVec2 },
    /// An exploded bomb left the registry
    BombRemoved { bomb: EntityId },
}
