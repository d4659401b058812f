//! Autonomous random-walk movement for patrollers and hazards
//!
//! Each entity rolls independently: stay put with a fixed chance, otherwise
//! take one clamped step along a random axis.

use glam::IVec2;
use rand::Rng;

use super::grid::clamp_pos;
use super::registry::EntityRegistry;
use crate::consts::*;

/// Pick the next tile for a walker at `from`.
///
/// Returns `from` unchanged when the idle roll succeeds or the step is
/// clamped against the grid edge.
pub fn random_step<R: Rng + ?Sized>(rng: &mut R, from: IVec2, idle_chance: f64) -> IVec2 {
    if rng.random_bool(idle_chance) {
        return from;
    }

    let along_x = rng.random_bool(0.5);
    let delta = if rng.random_bool(0.5) { 1 } else { -1 };
    let step = if along_x {
        IVec2::new(delta, 0)
    } else {
        IVec2::new(0, delta)
    };

    clamp_pos(from + step)
}

/// One patrol tick. Returns how many teachers changed tile.
pub fn advance_patrollers<R: Rng + ?Sized>(registry: &mut EntityRegistry, rng: &mut R) -> usize {
    let mut moved = 0;
    for teacher in registry.patrollers_mut() {
        let to = random_step(rng, teacher.pos, PATROL_IDLE_CHANCE);
        if to != teacher.pos {
            moved += 1;
        }
        teacher.step_to(to);
    }
    moved
}

/// One hazard tick. Returns how many holes changed tile.
///
/// A hole never moves onto the Campus entrance.
pub fn advance_hazards<R: Rng + ?Sized>(registry: &mut EntityRegistry, rng: &mut R) -> usize {
    let mut moved = 0;
    for hole in registry.hazards_mut() {
        let to = random_step(rng, hole.pos, HAZARD_IDLE_CHANCE);
        if to == CAMPUS_DOOR || to == hole.pos {
            continue;
        }
        hole.pos = to;
        moved += 1;
    }
    moved
}
