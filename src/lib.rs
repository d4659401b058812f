//! Campus Sweeper - A grid-based campus arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, entities, motion, interactions, timers)
//! - `runtime`: Async session actor driving the simulation from a wall clock
//! - `report`: Flavor-text report generation after a detonation
//! - `haptics`: Fire-and-forget vibration cues
//! - `settings`: Runtime configuration

pub mod haptics;
pub mod report;
pub mod runtime;
pub mod settings;
pub mod sim;

pub use settings::{ReportSettings, Settings};

/// Game rule constants
pub mod consts {
    use glam::IVec2;

    /// Grid is GRID_SIZE x GRID_SIZE tiles
    pub const GRID_SIZE: i32 = 10;

    /// Player start tile (Campus)
    pub const PLAYER_SPAWN: IVec2 = IVec2::new(2, 8);
    /// Where the player lands after falling into a hole
    pub const RESPAWN_POINT: IVec2 = IVec2::new(0, 0);

    /// Building entrance on the Campus scene
    pub const CAMPUS_DOOR: IVec2 = IVec2::new(7, 2);
    /// Exit tile inside the Building scene
    pub const BUILDING_EXIT: IVec2 = IVec2::new(5, 9);
    /// Arrival tile after entering the building
    pub const BUILDING_ARRIVAL: IVec2 = IVec2::new(5, 8);
    /// Arrival tile after leaving the building (just outside the door)
    pub const CAMPUS_ARRIVAL: IVec2 = IVec2::new(7, 3);

    /// Building footprint on Campus (inclusive corners)
    pub const FOOTPRINT_MIN: IVec2 = IVec2::new(6, 1);
    pub const FOOTPRINT_MAX: IVec2 = IVec2::new(8, 2);

    /// Entity counts at session start
    pub const CAMPUS_BOMBS: usize = 6;
    pub const BUILDING_BOMBS: usize = 4;
    pub const HAZARD_COUNT: usize = 4;

    /// Random-walk periods (ms)
    pub const PATROL_PERIOD_MS: u64 = 1500;
    pub const HAZARD_PERIOD_MS: u64 = 2000;
    /// Delay before an exploded bomb is removed
    pub const BOMB_CLEANUP_MS: u64 = 1000;
    /// Delay between falling into a hole and respawning
    pub const RESPAWN_DELAY_MS: u64 = 200;

    /// Chance an entity stays put on its tick
    pub const PATROL_IDLE_CHANCE: f64 = 0.4;
    pub const HAZARD_IDLE_CHANCE: f64 = 0.5;

    /// Score effects
    pub const PATROL_PENALTY: u32 = 50;
    pub const HAZARD_PENALTY: u32 = 200;
    pub const DEFUSE_REWARD: u32 = 100;

    /// Random hazard placement attempts before falling back to a scan
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 64;
}
