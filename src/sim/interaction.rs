//! Interaction resolution between the player and same-scene entities
//!
//! Runs after every state change. Three independent checks, always all
//! evaluated, in this order: bomb underfoot, caught by a teacher, fell in a
//! hole. The teacher penalty is not debounced: every pass that finds the
//! player sharing a tile with a teacher charges again.

use super::registry::EntityRegistry;
use super::state::{BombStatus, GameEvent, PlayerState};
use super::timers::{Effect, Timers};
use crate::consts::*;

pub const BOMB_UNDERFOOT_MESSAGE: &str = "BOMB UNDERFOOT! Action required.";
pub const CAUGHT_MESSAGE: &str = "CAUGHT BY TEACHER! -50 Pts";
pub const FELL_MESSAGE: &str = "FELL INTO MOVING HOLE! -200 Pts";

/// Recompute interactions for the player's current tile
pub fn resolve(
    player: &mut PlayerState,
    registry: &EntityRegistry,
    timers: &mut Timers,
    events: &mut Vec<GameEvent>,
) {
    let scene = player.scene;
    let pos = player.pos;

    // 1. Bomb
    let underfoot = registry
        .bombs_with_status(scene, BombStatus::Active)
        .find(|b| b.pos == pos)
        .map(|b| b.id);
    match underfoot {
        Some(id) => {
            if player.selected_bomb != Some(id) {
                events.push(GameEvent::BombUnderfoot { bomb: id });
            }
            player.selected_bomb = Some(id);
            player.set_message(BOMB_UNDERFOOT_MESSAGE);
        }
        None => player.selected_bomb = None,
    }

    // 2. Teacher
    if let Some(teacher) = registry.patrollers_in(scene).find(|t| t.pos == pos) {
        player.penalize(PATROL_PENALTY);
        player.set_message(CAUGHT_MESSAGE);
        log::debug!("Caught by teacher {} at {}", teacher.id, pos);
        events.push(GameEvent::CaughtByPatroller {
            patroller: teacher.id,
            penalty: PATROL_PENALTY,
        });
    }

    // 3. Hole
    if let Some(hole) = registry.hazards_in(scene).find(|h| h.pos == pos) {
        player.penalize(HAZARD_PENALTY);
        player.set_message(FELL_MESSAGE);
        timers.schedule(RESPAWN_DELAY_MS, Effect::RespawnPlayer);
        log::debug!("Fell into hole {} at {}", hole.id, pos);
        events.push(GameEvent::FellIntoHazard {
            hazard: hole.id,
            penalty: HAZARD_PENALTY,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Scene;
    use crate::sim::state::Facing;
    use glam::IVec2;

    fn player_at(pos: IVec2, scene: Scene, score: u32) -> PlayerState {
        PlayerState {
            pos,
            scene,
            score,
            ..PlayerState::default()
        }
    }

    #[test]
    fn test_bomb_selection() {
        let mut reg = EntityRegistry::new();
        let id = reg.spawn_bomb(IVec2::new(4, 4), Scene::Campus);
        let mut timers = Timers::new();
        let mut events = Vec::new();

        let mut player = player_at(IVec2::new(4, 4), Scene::Campus, 0);
        resolve(&mut player, &reg, &mut timers, &mut events);
        assert_eq!(player.selected_bomb(), Some(id));
        assert_eq!(player.message(), BOMB_UNDERFOOT_MESSAGE);
        assert_eq!(events, vec![GameEvent::BombUnderfoot { bomb: id }]);

        // Stepping off clears the selection but leaves the message alone
        player.pos = IVec2::new(4, 5);
        resolve(&mut player, &reg, &mut timers, &mut events);
        assert_eq!(player.selected_bomb(), None);
        assert_eq!(player.message(), BOMB_UNDERFOOT_MESSAGE);
    }

    #[test]
    fn test_other_scene_is_ignored() {
        let mut reg = EntityRegistry::new();
        reg.spawn_bomb(IVec2::new(4, 4), Scene::Building);
        reg.spawn_patroller(IVec2::new(4, 4), Scene::Building, Facing::Left);
        reg.spawn_hazard(IVec2::new(4, 4), Scene::Building);
        let mut timers = Timers::new();
        let mut events = Vec::new();

        let mut player = player_at(IVec2::new(4, 4), Scene::Campus, 300);
        resolve(&mut player, &reg, &mut timers, &mut events);
        assert_eq!(player.selected_bomb(), None);
        assert_eq!(player.score(), 300);
        assert!(events.is_empty());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_teacher_penalty_repeats_every_pass() {
        let mut reg = EntityRegistry::new();
        reg.spawn_patroller(IVec2::new(3, 3), Scene::Campus, Facing::Right);
        let mut timers = Timers::new();
        let mut events = Vec::new();

        let mut player = player_at(IVec2::new(3, 3), Scene::Campus, 120);
        resolve(&mut player, &reg, &mut timers, &mut events);
        assert_eq!(player.score(), 70);
        assert_eq!(player.message(), CAUGHT_MESSAGE);

        // Still overlapping: charged again
        resolve(&mut player, &reg, &mut timers, &mut events);
        assert_eq!(player.score(), 20);
        resolve(&mut player, &reg, &mut timers, &mut events);
        assert_eq!(player.score(), 0);
        assert_eq!(events.len(), 3);
        // Not pushed back
        assert_eq!(player.pos(), IVec2::new(3, 3));
    }

    #[test]
    fn test_hole_penalizes_and_schedules_respawn() {
        let mut reg = EntityRegistry::new();
        let hole = reg.spawn_hazard(IVec2::new(3, 3), Scene::Campus);
        let mut timers = Timers::new();
        let mut events = Vec::new();

        let mut player = player_at(IVec2::new(3, 3), Scene::Campus, 250);
        resolve(&mut player, &reg, &mut timers, &mut events);
        assert_eq!(player.score(), 50);
        assert_eq!(player.message(), FELL_MESSAGE);
        assert!(timers.is_pending(Effect::RespawnPlayer));
        assert_eq!(
            events,
            vec![GameEvent::FellIntoHazard {
                hazard: hole,
                penalty: HAZARD_PENALTY
            }]
        );
    }

    #[test]
    fn test_all_three_rules_fire_together() {
        let mut reg = EntityRegistry::new();
        let tile = IVec2::new(6, 6);
        let bomb = reg.spawn_bomb(tile, Scene::Campus);
        reg.spawn_patroller(tile, Scene::Campus, Facing::Right);
        reg.spawn_hazard(tile, Scene::Campus);
        let mut timers = Timers::new();
        let mut events = Vec::new();

        let mut player = player_at(tile, Scene::Campus, 1000);
        resolve(&mut player, &reg, &mut timers, &mut events);

        assert_eq!(player.selected_bomb(), Some(bomb));
        assert_eq!(player.score(), 1000 - PATROL_PENALTY - HAZARD_PENALTY);
        // Last rule wins the message
        assert_eq!(player.message(), FELL_MESSAGE);
        assert_eq!(events.len(), 3);
    }
}
