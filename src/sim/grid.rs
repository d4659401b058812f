//! Grid geometry for the two scenes
//!
//! Positions are integer tiles in `[0, GRID_SIZE - 1]` on both axes.
//! Everything here is pure.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// One of the two disjoint play areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scene {
    /// Outdoor area with the school building
    #[default]
    Campus,
    /// Inside the teaching building
    Building,
}

impl Scene {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scene::Campus => "Campus",
            Scene::Building => "Building",
        }
    }

    /// The door tile of this scene
    pub fn door(&self) -> IVec2 {
        match self {
            Scene::Campus => CAMPUS_DOOR,
            Scene::Building => BUILDING_EXIT,
        }
    }
}

/// Clamp a single coordinate to the grid
#[inline]
pub fn clamp(coord: i32) -> i32 {
    coord.clamp(0, GRID_SIZE - 1)
}

/// Clamp both coordinates of a position to the grid
#[inline]
pub fn clamp_pos(pos: IVec2) -> IVec2 {
    IVec2::new(clamp(pos.x), clamp(pos.y))
}

#[inline]
pub fn in_bounds(pos: IVec2) -> bool {
    (0..GRID_SIZE).contains(&pos.x) && (0..GRID_SIZE).contains(&pos.y)
}

/// True inside the building rectangle drawn on the Campus scene
pub fn is_building_footprint(x: i32, y: i32) -> bool {
    (FOOTPRINT_MIN.x..=FOOTPRINT_MAX.x).contains(&x)
        && (FOOTPRINT_MIN.y..=FOOTPRINT_MAX.y).contains(&y)
}

/// True on the door tile of `scene`
pub fn is_door(scene: Scene, x: i32, y: i32) -> bool {
    scene.door() == IVec2::new(x, y)
}

/// Whether the player may stand on `pos` in `scene`.
///
/// The Campus door sits inside the footprint and is always walkable.
pub fn is_walkable(scene: Scene, pos: IVec2) -> bool {
    match scene {
        Scene::Campus => is_door(scene, pos.x, pos.y) || !is_building_footprint(pos.x, pos.y),
        Scene::Building => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(-1), 0);
        assert_eq!(clamp(0), 0);
        assert_eq!(clamp(5), 5);
        assert_eq!(clamp(GRID_SIZE), GRID_SIZE - 1);
        assert_eq!(clamp_pos(IVec2::new(-3, 42)), IVec2::new(0, 9));
    }

    #[test]
    fn test_footprint_rectangle() {
        let inside = (6..=8).flat_map(|x| (1..=2).map(move |y| (x, y)));
        for (x, y) in inside {
            assert!(is_building_footprint(x, y), "({x},{y}) should be footprint");
        }
        assert!(!is_building_footprint(5, 1));
        assert!(!is_building_footprint(9, 2));
        assert!(!is_building_footprint(7, 0));
        assert!(!is_building_footprint(7, 3));
    }

    #[test]
    fn test_doors() {
        assert!(is_door(Scene::Campus, 7, 2));
        assert!(!is_door(Scene::Campus, 5, 9));
        assert!(is_door(Scene::Building, 5, 9));
        assert!(!is_door(Scene::Building, 7, 2));
    }

    #[test]
    fn test_door_is_walkable_inside_footprint() {
        assert!(is_walkable(Scene::Campus, CAMPUS_DOOR));
        assert!(!is_walkable(Scene::Campus, IVec2::new(7, 1)));
        // No building walls indoors
        assert!(is_walkable(Scene::Building, IVec2::new(7, 1)));
    }
}
