//! Entity registry
//!
//! Owns every bomb, patroller and hazard of a session. Collections stay
//! sorted by id (ids are handed out in increasing order).

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::Scene;
use super::state::{Bomb, BombStatus, EntityId, Facing, Hazard, Patroller};
use crate::consts::*;

/// Authored teacher placements
const PATROLLERS: [(IVec2, Scene, Facing); 3] = [
    (IVec2::new(4, 4), Scene::Campus, Facing::Right),
    (IVec2::new(8, 5), Scene::Campus, Facing::Left),
    (IVec2::new(2, 2), Scene::Building, Facing::Right),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRegistry {
    bombs: Vec<Bomb>,
    patrollers: Vec<Patroller>,
    hazards: Vec<Hazard>,
    next_id: EntityId,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    /// Empty registry; ids start at 1
    pub fn new() -> Self {
        Self {
            bombs: Vec::new(),
            patrollers: Vec::new(),
            hazards: Vec::new(),
            next_id: 1,
        }
    }

    /// Standard starting layout drawn from `rng`
    pub fn populate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut registry = Self::new();

        for _ in 0..CAMPUS_BOMBS {
            let pos = random_tile(rng);
            registry.spawn_bomb(pos, Scene::Campus);
        }
        for _ in 0..BUILDING_BOMBS {
            let pos = random_tile(rng);
            registry.spawn_bomb(pos, Scene::Building);
        }

        for (pos, scene, facing) in PATROLLERS {
            registry.spawn_patroller(pos, scene, facing);
        }

        // Keep holes off the spawn tile and the entrance
        let excluded = [PLAYER_SPAWN, CAMPUS_DOOR];
        for _ in 0..HAZARD_COUNT {
            let pos = place_excluding(rng, &excluded);
            registry.spawn_hazard(pos, Scene::Campus);
        }

        log::debug!(
            "Populated registry: {} bombs, {} patrollers, {} hazards",
            registry.bombs.len(),
            registry.patrollers.len(),
            registry.hazards.len()
        );
        registry
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add an active bomb. Out-of-grid positions are clamped.
    pub fn spawn_bomb(&mut self, pos: IVec2, scene: Scene) -> EntityId {
        let id = self.next_entity_id();
        self.bombs.push(Bomb::new(id, pos, scene));
        id
    }

    pub fn spawn_patroller(&mut self, pos: IVec2, scene: Scene, facing: Facing) -> EntityId {
        let id = self.next_entity_id();
        self.patrollers.push(Patroller::new(id, pos, scene, facing));
        id
    }

    pub fn spawn_hazard(&mut self, pos: IVec2, scene: Scene) -> EntityId {
        let id = self.next_entity_id();
        self.hazards.push(Hazard::new(id, pos, scene));
        id
    }

    pub fn bombs(&self) -> &[Bomb] {
        &self.bombs
    }

    pub fn patrollers(&self) -> &[Patroller] {
        &self.patrollers
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    pub fn bomb(&self, id: EntityId) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.id == id)
    }

    pub fn bombs_in(&self, scene: Scene) -> impl Iterator<Item = &Bomb> {
        self.bombs.iter().filter(move |b| b.scene == scene)
    }

    pub fn bombs_with_status(
        &self,
        scene: Scene,
        status: BombStatus,
    ) -> impl Iterator<Item = &Bomb> {
        self.bombs_in(scene).filter(move |b| b.status == status)
    }

    pub fn patrollers_in(&self, scene: Scene) -> impl Iterator<Item = &Patroller> {
        self.patrollers.iter().filter(move |t| t.scene == scene)
    }

    pub fn hazards_in(&self, scene: Scene) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter().filter(move |h| h.scene == scene)
    }

    pub(crate) fn bomb_mut(&mut self, id: EntityId) -> Option<&mut Bomb> {
        self.bombs.iter_mut().find(|b| b.id == id)
    }

    pub(crate) fn patrollers_mut(&mut self) -> &mut [Patroller] {
        &mut self.patrollers
    }

    pub(crate) fn hazards_mut(&mut self) -> &mut [Hazard] {
        &mut self.hazards
    }

    /// Drop a bomb entirely. Returns false if it was already gone.
    pub(crate) fn remove_bomb(&mut self, id: EntityId) -> bool {
        let before = self.bombs.len();
        self.bombs.retain(|b| b.id != id);
        self.bombs.len() != before
    }
}

/// Uniformly random tile
pub fn random_tile<R: Rng + ?Sized>(rng: &mut R) -> IVec2 {
    IVec2::new(rng.random_range(0..GRID_SIZE), rng.random_range(0..GRID_SIZE))
}

/// Random tile not in `excluded`.
///
/// Resamples up to `MAX_PLACEMENT_ATTEMPTS` times, then takes the first free
/// tile in row-major order so placement always terminates.
pub fn place_excluding<R: Rng + ?Sized>(rng: &mut R, excluded: &[IVec2]) -> IVec2 {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let pos = random_tile(rng);
        if !excluded.contains(&pos) {
            return pos;
        }
    }

    log::warn!("Placement gave up after {MAX_PLACEMENT_ATTEMPTS} attempts, scanning");
    (0..GRID_SIZE)
        .flat_map(|y| (0..GRID_SIZE).map(move |x| IVec2::new(x, y)))
        .find(|pos| !excluded.contains(pos))
        .unwrap_or(IVec2::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_pcg::Pcg32;

    /// Always yields zero
    struct StuckRng;

    impl RngCore for StuckRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    #[test]
    fn test_populate_counts() {
        let mut rng = Pcg32::seed_from_u64(7);
        let reg = EntityRegistry::populate(&mut rng);

        assert_eq!(reg.bombs_in(Scene::Campus).count(), CAMPUS_BOMBS);
        assert_eq!(reg.bombs_in(Scene::Building).count(), BUILDING_BOMBS);
        assert_eq!(reg.patrollers().len(), 3);
        assert_eq!(reg.patrollers_in(Scene::Building).count(), 1);
        assert_eq!(reg.hazards_in(Scene::Campus).count(), HAZARD_COUNT);
        assert!(reg.bombs().iter().all(|b| b.is_active()));
    }

    #[test]
    fn test_authored_teachers() {
        let reg = EntityRegistry::populate(&mut Pcg32::seed_from_u64(3));
        let teachers: Vec<(EntityId, IVec2, Scene, Facing)> = reg
            .patrollers()
            .iter()
            .map(|t| (t.id(), t.pos(), t.scene(), t.facing()))
            .collect();
        assert_eq!(
            teachers,
            vec![
                (11, IVec2::new(4, 4), Scene::Campus, Facing::Right),
                (12, IVec2::new(8, 5), Scene::Campus, Facing::Left),
                (13, IVec2::new(2, 2), Scene::Building, Facing::Right),
            ]
        );
    }

    #[test]
    fn test_ids_unique_and_monotonic() {
        let mut rng = Pcg32::seed_from_u64(1);
        let reg = EntityRegistry::populate(&mut rng);

        let ids: Vec<EntityId> = reg
            .bombs()
            .iter()
            .map(|b| b.id())
            .chain(reg.patrollers().iter().map(|t| t.id()))
            .chain(reg.hazards().iter().map(|h| h.id()))
            .collect();
        assert_eq!(ids, (1..=17).collect::<Vec<_>>());
    }

    #[test]
    fn test_hazards_avoid_spawn_and_door() {
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let reg = EntityRegistry::populate(&mut rng);
            for h in reg.hazards() {
                assert_ne!(h.pos(), PLAYER_SPAWN, "seed {seed}");
                assert_ne!(h.pos(), CAMPUS_DOOR, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_populate_is_deterministic() {
        let a = EntityRegistry::populate(&mut Pcg32::seed_from_u64(42));
        let b = EntityRegistry::populate(&mut Pcg32::seed_from_u64(42));
        let pos = |r: &EntityRegistry| -> Vec<IVec2> {
            r.bombs()
                .iter()
                .map(|b| b.pos())
                .chain(r.hazards().iter().map(|h| h.pos()))
                .collect()
        };
        assert_eq!(pos(&a), pos(&b));
    }

    #[test]
    fn test_placement_terminates_on_stuck_rng() {
        let mut rng = StuckRng;
        let stuck = random_tile(&mut rng);
        assert_eq!(random_tile(&mut rng), stuck);

        let pos = place_excluding(&mut rng, &[stuck]);
        assert_ne!(pos, stuck);
        assert!(crate::sim::grid::in_bounds(pos));
    }

    #[test]
    fn test_bombs_by_status() {
        let mut reg = EntityRegistry::new();
        let a = reg.spawn_bomb(IVec2::new(1, 1), Scene::Campus);
        let b = reg.spawn_bomb(IVec2::new(2, 1), Scene::Campus);
        reg.spawn_bomb(IVec2::new(3, 1), Scene::Campus);
        let c = reg.spawn_bomb(IVec2::new(1, 1), Scene::Building);
        reg.spawn_bomb(IVec2::new(2, 1), Scene::Building);

        assert!(reg.bomb_mut(a).unwrap().settle(BombStatus::Diffused));
        assert!(reg.bomb_mut(b).unwrap().settle(BombStatus::Exploded));
        assert!(reg.bomb_mut(c).unwrap().settle(BombStatus::Exploded));

        let count = |scene, status| reg.bombs_with_status(scene, status).count();
        assert_eq!(count(Scene::Campus, BombStatus::Active), 1);
        assert_eq!(count(Scene::Campus, BombStatus::Diffused), 1);
        assert_eq!(count(Scene::Campus, BombStatus::Exploded), 1);
        assert_eq!(count(Scene::Building, BombStatus::Active), 1);
        assert_eq!(count(Scene::Building, BombStatus::Diffused), 0);
        assert_eq!(count(Scene::Building, BombStatus::Exploded), 1);

        let exploded: Vec<EntityId> = reg
            .bombs_with_status(Scene::Campus, BombStatus::Exploded)
            .map(|bomb| bomb.id())
            .collect();
        assert_eq!(exploded, vec![b]);
    }

    #[test]
    fn test_remove_bomb() {
        let mut reg = EntityRegistry::new();
        let id = reg.spawn_bomb(IVec2::new(4, 4), Scene::Campus);
        assert!(reg.remove_bomb(id));
        assert!(!reg.remove_bomb(id));
        assert!(reg.bomb(id).is_none());
    }
}
