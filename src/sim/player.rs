//! Player body: gravity, horizontal control and one-way ledge landing

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::land_on_ledge;
use super::state::RunState;
use super::world::World;
use crate::Aabb;
use crate::consts::*;

/// What the player's feet touched this step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Landing {
    /// Standing on a platform
    pub platform: bool,
    /// Standing on a spike strip
    pub spike: bool,
}

/// The falling player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds of invulnerability remaining
    pub invincible: f32,
    /// On a platform at the end of the last physics step
    pub grounded: bool,
    pub facing_right: bool,
    /// Seconds spent above the camera top
    pub offscreen_time: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            vel: Vec2::ZERO,
            invincible: 0.0,
            grounded: false,
            facing_right: true,
            offscreen_time: 0.0,
        }
    }

    #[inline]
    pub fn body(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + PLAYER_HEIGHT * 0.5
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincible > 0.0
    }

    /// Integrate one step and resolve ledge landings
    pub fn step(&mut self, dt: f32, move_axis: i8, run: &RunState, world: &World) -> Landing {
        let axis = move_axis.signum() as f32;
        self.vel.x = axis * run.effective_speed() as f32;
        if axis != 0.0 {
            self.facing_right = axis > 0.0;
        }

        let gravity = PLAYER_GRAVITY * run.fall_multiplier() as f32;
        self.vel.y = (self.vel.y + gravity * dt).min(PLAYER_MAX_FALL);

        let prev_bottom = self.bottom();
        self.pos += self.vel * dt;

        let half_w = PLAYER_WIDTH * 0.5;
        self.pos.x = self.pos.x.clamp(half_w, WORLD_WIDTH - half_w);

        self.resolve_ledges(prev_bottom, world)
    }

    fn resolve_ledges(&mut self, prev_bottom: f32, world: &World) -> Landing {
        let mut landing = Landing::default();
        let body = self.body();

        let platform_top = world
            .platforms
            .iter()
            .filter_map(|ledge| land_on_ledge(prev_bottom, &body, self.vel, ledge))
            .reduce(f32::min);
        let spike_top = world
            .spikes
            .iter()
            .filter_map(|ledge| land_on_ledge(prev_bottom, &body, self.vel, ledge))
            .reduce(f32::min);

        // Highest surface wins when two ledges are crossed in one step
        let surface = match (platform_top, spike_top) {
            (Some(p), Some(s)) if s < p => {
                landing.spike = true;
                Some(s)
            }
            (Some(p), _) => {
                landing.platform = true;
                Some(p)
            }
            (None, Some(s)) => {
                landing.spike = true;
                Some(s)
            }
            (None, None) => None,
        };

        if let Some(top) = surface {
            self.pos.y = top - PLAYER_HEIGHT * 0.5;
            self.vel.y = 0.0;
        }
        landing
    }
}
