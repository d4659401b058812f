//! Game session: the single place state changes
//!
//! Player commands go through [`Session::apply`], elapsed time through
//! [`Session::advance`]. Every change is followed by an explicit call to the
//! interaction resolver, which always sees the fully applied change.

use glam::IVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actions::{self, CommandError, PlayerCommand};
use super::grid::Scene;
use super::interaction;
use super::motion;
use super::registry::EntityRegistry;
use super::state::{Bomb, EntityId, GameEvent, Hazard, Patroller, PlayerState};
use super::timers::{Effect, Timers};
use crate::consts::*;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Bumped on every state change
    pub revision: u64,
    pub time_ms: u64,
    pub scene: Scene,
    pub player: IVec2,
    pub message: String,
    pub score: u32,
    pub selected_bomb: Option<EntityId>,
    pub bombs: Vec<Bomb>,
    pub patrollers: Vec<Patroller>,
    pub hazards: Vec<Hazard>,
}

#[derive(Debug, Clone)]
pub struct Session {
    seed: u64,
    rng: Pcg32,
    player: PlayerState,
    registry: EntityRegistry,
    timers: Timers,
    revision: u64,
    ended: bool,
}

impl Session {
    /// New session with the standard layout drawn from `seed`
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let registry = EntityRegistry::populate(&mut rng);
        Self::assemble(seed, rng, registry)
    }

    /// New session around a hand-built registry (movement still uses `seed`)
    pub fn with_registry(seed: u64, registry: EntityRegistry) -> Self {
        Self::assemble(seed, Pcg32::seed_from_u64(seed), registry)
    }

    fn assemble(seed: u64, rng: Pcg32, registry: EntityRegistry) -> Self {
        let mut timers = Timers::new();
        timers.schedule(PATROL_PERIOD_MS, Effect::PatrolTick);
        timers.schedule(HAZARD_PERIOD_MS, Effect::HazardTick);

        let mut session = Self {
            seed,
            rng,
            player: PlayerState::default(),
            registry,
            timers,
            revision: 0,
            ended: false,
        };

        // The spawn tile may already hold a bomb
        let mut events = Vec::new();
        session.notify_changed(&mut events);

        log::info!(
            "Session started with seed {} ({} bombs, {} teachers, {} holes)",
            seed,
            session.registry.bombs().len(),
            session.registry.patrollers().len(),
            session.registry.hazards().len()
        );
        session
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn is_active(&self) -> bool {
        !self.ended
    }

    /// Apply one player command
    pub fn apply(&mut self, command: PlayerCommand) -> Result<Vec<GameEvent>, CommandError> {
        if self.ended {
            return Err(CommandError::SessionEnded);
        }

        let mut events = Vec::new();
        match command {
            PlayerCommand::Move { dx, dy } => {
                actions::move_player(&mut self.player, dx, dy)?;
                self.notify_changed(&mut events);
            }
            PlayerCommand::EnterOrExit => {
                if let Some(scene) = actions::enter_or_exit(&mut self.player) {
                    log::debug!("Player moved to {}", scene.as_str());
                    events.push(GameEvent::SceneChanged { scene });
                    self.notify_changed(&mut events);
                }
            }
            PlayerCommand::DefuseSelectedBomb => {
                if let Some(bomb) = actions::defuse_selected_bomb(&mut self.player, &mut self.registry)
                {
                    events.push(GameEvent::BombDefused {
                        bomb,
                        reward: DEFUSE_REWARD,
                    });
                    self.notify_changed(&mut events);
                }
            }
            PlayerCommand::DetonateSelectedBomb => {
                if let Some((bomb, pos)) = actions::detonate_selected_bomb(
                    &mut self.player,
                    &mut self.registry,
                    &mut self.timers,
                ) {
                    log::debug!("Bomb {} detonated at {}", bomb, pos);
                    events.push(GameEvent::BombDetonated { bomb, pos });
                    self.notify_changed(&mut events);
                }
            }
        }
        Ok(events)
    }

    pub fn move_player(&mut self, dx: i32, dy: i32) -> Result<Vec<GameEvent>, CommandError> {
        self.apply(PlayerCommand::Move { dx, dy })
    }

    pub fn enter_or_exit(&mut self) -> Result<Vec<GameEvent>, CommandError> {
        self.apply(PlayerCommand::EnterOrExit)
    }

    pub fn defuse_selected_bomb(&mut self) -> Result<Vec<GameEvent>, CommandError> {
        self.apply(PlayerCommand::DefuseSelectedBomb)
    }

    pub fn detonate_selected_bomb(&mut self) -> Result<Vec<GameEvent>, CommandError> {
        self.apply(PlayerCommand::DetonateSelectedBomb)
    }

    /// Advance the clock by `dt_ms`, firing every timer that comes due
    pub fn advance(&mut self, dt_ms: u64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.ended {
            return events;
        }

        let until = self.timers.now_ms().saturating_add(dt_ms);
        while let Some((due_ms, effect)) = self.timers.pop_due(until) {
            self.apply_effect(due_ms, effect, &mut events);
        }
        self.timers.set_now(until);
        events
    }

    fn apply_effect(&mut self, due_ms: u64, effect: Effect, events: &mut Vec<GameEvent>) {
        match effect {
            Effect::PatrolTick => {
                motion::advance_patrollers(&mut self.registry, &mut self.rng);
                self.timers
                    .schedule_at(due_ms + PATROL_PERIOD_MS, Effect::PatrolTick);
                self.notify_changed(events);
            }
            Effect::HazardTick => {
                motion::advance_hazards(&mut self.registry, &mut self.rng);
                self.timers
                    .schedule_at(due_ms + HAZARD_PERIOD_MS, Effect::HazardTick);
                self.notify_changed(events);
            }
            Effect::RemoveBomb(bomb) => {
                if self.registry.remove_bomb(bomb) {
                    log::debug!("Bomb {} cleaned up", bomb);
                    events.push(GameEvent::BombRemoved { bomb });
                    self.notify_changed(events);
                }
            }
            Effect::RespawnPlayer => {
                self.player.pos = RESPAWN_POINT;
                events.push(GameEvent::PlayerRespawned { pos: RESPAWN_POINT });
                self.notify_changed(events);
            }
        }
    }

    /// Player, scene or entities changed: re-run interactions
    fn notify_changed(&mut self, events: &mut Vec<GameEvent>) {
        self.revision += 1;
        interaction::resolve(&mut self.player, &self.registry, &mut self.timers, events);
    }

    /// End the session and cancel every pending timer
    pub fn shutdown(&mut self) {
        if self.ended {
            return;
        }
        let cancelled = self.timers.pending();
        self.timers.clear();
        self.ended = true;
        log::info!(
            "Session ended at {}ms with score {} ({} timers cancelled)",
            self.timers.now_ms(),
            self.player.score,
            cancelled
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            time_ms: self.timers.now_ms(),
            scene: self.player.scene,
            player: self.player.pos,
            message: self.player.message.clone(),
            score: self.player.score,
            selected_bomb: self.player.selected_bomb,
            bombs: self.registry.bombs().to_vec(),
            patrollers: self.registry.patrollers().to_vec(),
            hazards: self.registry.hazards().to_vec(),
        }
    }
}
