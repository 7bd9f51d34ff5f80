//! Procedural stage layout
//!
//! Deterministic structure (start platform, goal platform, downward walk),
//! stochastic detail (positions, widths, spike placement). All geometry is
//! one-way: only the top face collides.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::SimRng;
use crate::consts::*;
use crate::tuning::{Tuning, probability};
use crate::{Aabb, difficulty_tier, stage_height};

/// Scale of the guaranteed start platform
const START_PLATFORM_SCALE: f32 = 3.0;
/// Scale of the guaranteed goal platform
const GOAL_PLATFORM_SCALE: f32 = 4.0;
const START_PLATFORM_Y: f32 = 140.0;
/// Goal platform and marker sit this far above the stage bottom
const GOAL_INSET: f32 = 100.0;
/// The random walk stops this far above the stage bottom
const WALK_BOTTOM_MARGIN: f32 = 400.0;
const GOAL_SIZE: Vec2 = Vec2::new(400.0, 100.0);
const PLATFORM_X_RANGE: (f32, f32) = (50.0, 350.0);
const PLATFORM_SCALE_RANGE: (f32, f32) = (1.2, 2.0);

/// A one-way platform or spike strip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ledge {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Ledge {
    pub fn platform(x: f32, y: f32, scale_x: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(PLATFORM_WIDTH * scale_x, PLATFORM_HEIGHT),
        }
    }

    pub fn spike(x: f32, y: f32, scale_x: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(SPIKE_WIDTH * scale_x, SPIKE_HEIGHT),
        }
    }

    #[inline]
    pub fn body(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y - self.size.y * 0.5
    }

    /// Left/right walking bounds for a patrol enemy standing on this ledge,
    /// kept inside the walls so a patrol can always reach both ends
    pub fn patrol_bounds(&self) -> (f32, f32) {
        let half = self.size.x * 0.5;
        let wall = ENEMY_SIZE * 0.5;
        (
            (self.pos.x - half + 10.0).max(wall),
            (self.pos.x + half - 10.0).min(WORLD_WIDTH - wall),
        )
    }
}

/// Static geometry for one stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub height: f32,
    pub platforms: Vec<Ledge>,
    pub spikes: Vec<Ledge>,
    pub goal: Aabb,
}

/// Vertical step range for a difficulty tier
pub fn step_range(tuning: &Tuning, tier: u32) -> (f32, f32) {
    let spacing = (tuning.platform_spacing_base - tuning.platform_spacing_per_tier * tier as f32)
        .max(tuning.platform_spacing_min);
    (spacing - 20.0, spacing + 60.0)
}

/// Probability that a walk step places a spike instead of a platform
pub fn spike_chance(tuning: &Tuning, tier: u32) -> f64 {
    probability(tuning.spike_chance_base + tuning.spike_chance_per_tier * tier as f64)
}

/// Lay out a stage
pub fn generate_stage(stage: u32, tuning: &Tuning, rng: &mut SimRng) -> World {
    let height = stage_height(stage);
    let tier = difficulty_tier(stage);
    let (step_min, step_max) = step_range(tuning, tier);
    let spike_p = spike_chance(tuning, tier);

    let mut platforms = vec![Ledge::platform(
        WORLD_WIDTH / 2.0,
        START_PLATFORM_Y,
        START_PLATFORM_SCALE,
    )];
    let mut spikes = Vec::new();

    let mut y = START_PLATFORM_Y + rng.random_range(step_min..=step_max);
    while y < height - WALK_BOTTOM_MARGIN {
        let x = rng.random_range(PLATFORM_X_RANGE.0..=PLATFORM_X_RANGE.1);
        if rng.random_bool(spike_p) {
            spikes.push(Ledge::spike(x, y, 1.0));
        } else {
            let scale = rng.random_range(PLATFORM_SCALE_RANGE.0..=PLATFORM_SCALE_RANGE.1);
            platforms.push(Ledge::platform(x, y, scale));

            // Backup ledge on the opposite side so a spike-heavy stretch stays passable
            if rng.random_bool(tuning.secondary_platform_probability()) {
                let x2 = if x < WORLD_WIDTH / 2.0 { x + 150.0 } else { x - 150.0 };
                let y2 = y + rng.random_range(30.0..=60.0);
                platforms.push(Ledge::platform(
                    x2.clamp(PLATFORM_X_RANGE.0, PLATFORM_X_RANGE.1),
                    y2,
                    PLATFORM_SCALE_RANGE.0,
                ));
            }
        }
        y += rng.random_range(step_min..=step_max);
    }

    let goal_y = height - GOAL_INSET;
    platforms.push(Ledge::platform(WORLD_WIDTH / 2.0, goal_y, GOAL_PLATFORM_SCALE));

    log::info!(
        "Stage {} generated: height={}, platforms={}, spikes={}",
        stage,
        height,
        platforms.len(),
        spikes.len()
    );

    World {
        height,
        platforms,
        spikes,
        goal: Aabb::new(Vec2::new(WORLD_WIDTH / 2.0, goal_y), GOAL_SIZE),
    }
}
