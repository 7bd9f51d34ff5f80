//! Abyss Fall - A vertical auto-scrolling fall roguelike
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, enemies, combat, progression)
//! - `screen`: Menu / playing / item-select / game-over flow
//! - `collection`: Persisted set of discovered items
//! - `tuning`: Data-driven game balance
//! - `error`: Error types for the non-gameplay surfaces

pub mod collection;
pub mod error;
pub mod screen;
pub mod sim;
pub mod tuning;

pub use collection::Collection;
pub use error::{PersistError, TuningError, UnknownItem};
pub use screen::{Game, Screen};
pub use tuning::Tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield dimensions (y grows downward)
    pub const WORLD_WIDTH: f32 = 400.0;
    pub const VIEW_HEIGHT: f32 = 700.0;
    pub const STAGE_BASE_HEIGHT: f32 = 4500.0;
    pub const STAGE_HEIGHT_PER_STAGE: f32 = 500.0;

    /// Player body
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 44.0;
    pub const PLAYER_START_X: f32 = 200.0;
    pub const PLAYER_START_Y: f32 = 100.0;
    /// World gravity (600) plus the player's own body gravity (500)
    pub const PLAYER_GRAVITY: f32 = 1100.0;
    /// Terminal fall speed
    pub const PLAYER_MAX_FALL: f32 = 600.0;

    /// Base player stats
    pub const BASE_HP: u32 = 100;
    pub const BASE_ATTACK: i64 = 10;
    pub const BASE_MOVE_SPEED: f64 = 450.0;

    /// Enemy / projectile bodies
    pub const ENEMY_SIZE: f32 = 32.0;
    pub const BULLET_SIZE: f32 = 20.0;
    pub const ORB_SIZE: f32 = 16.0;

    /// Platform geometry (width is multiplied by the platform's scale)
    pub const PLATFORM_WIDTH: f32 = 120.0;
    pub const PLATFORM_HEIGHT: f32 = 24.0;
    pub const SPIKE_WIDTH: f32 = 60.0;
    pub const SPIKE_HEIGHT: f32 = 24.0;

    /// Stomp tolerance: player bottom may sit this far below the enemy top
    pub const STOMP_TOLERANCE: f32 = 12.0;

    /// Weapon
    pub const MAX_AMMO: u32 = 6;
}

/// Axis-aligned bounding box centred on `center`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    #[inline]
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.half.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.half.y
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.half.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.half.x
    }

    /// Strict overlap test (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Horizontal extents overlap
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }
}

/// Difficulty tier for a stage number: 1-5 → 0, 6-10 → 1, 11-15 → 2, then 3
#[inline]
pub fn difficulty_tier(stage: u32) -> u32 {
    match stage {
        0..=5 => 0,
        6..=10 => 1,
        11..=15 => 2,
        _ => 3,
    }
}

/// Display label for a difficulty tier
pub fn difficulty_label(tier: u32) -> &'static str {
    const LABELS: [&str; 4] = ["EASY", "NORMAL", "HARD", "EXTRA"];
    LABELS[(tier as usize).min(LABELS.len() - 1)]
}

/// Total height of a stage in world units
#[inline]
pub fn stage_height(stage: u32) -> f32 {
    consts::STAGE_BASE_HEIGHT + stage as f32 * consts::STAGE_HEIGHT_PER_STAGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_tiers() {
        assert_eq!(difficulty_tier(1), 0);
        assert_eq!(difficulty_tier(5), 0);
        assert_eq!(difficulty_tier(6), 1);
        assert_eq!(difficulty_tier(10), 1);
        assert_eq!(difficulty_tier(11), 2);
        assert_eq!(difficulty_tier(15), 2);
        assert_eq!(difficulty_tier(16), 3);
        assert_eq!(difficulty_tier(99), 3);
        assert_eq!(difficulty_label(0), "EASY");
        assert_eq!(difficulty_label(3), "EXTRA");
        assert_eq!(difficulty_label(7), "EXTRA");
    }

    #[test]
    fn test_aabb_overlap() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 10.0));
        let b = Aabb::new(Vec2::new(8.0, 0.0), Vec2::new(10.0, 10.0));
        let c = Aabb::new(Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0));
        assert!(a.overlaps(&b));
        // Touching edges do not overlap
        assert!(!a.overlaps(&c));
        assert_eq!(a.top(), -5.0);
        assert_eq!(a.bottom(), 5.0);
    }

    #[test]
    fn test_stage_height_grows() {
        assert_eq!(stage_height(1), 5000.0);
        assert_eq!(stage_height(2), 5500.0);
    }
}
