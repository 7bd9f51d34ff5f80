//! Data-driven game balance
//!
//! Every balance number the simulation reads lives here. `Tuning::default()`
//! is the shipped balance; a JSON document can override any subset of keys.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Runtime-tunable gameplay constants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Stage flow ===
    /// Grace period at stage start (no enemies, invulnerable)
    pub safe_start_secs: f32,
    /// How long the player may stay above the auto-scroll line before dying
    pub offscreen_grace_secs: f32,
    /// Delay between touching the goal and leaving the stage
    pub stage_clear_delay_secs: f32,
    /// Delay between a confirmed death and the game-over screen
    pub game_over_delay_secs: f32,
    /// Hit flash read-out duration (presentation only)
    pub hit_flash_secs: f32,

    // === Auto-scroll & camera ===
    pub scroll_base_speed: f32,
    pub scroll_speed_per_tier: f32,
    pub scroll_speed_per_stage: f32,
    /// Extra scroll speed gained per second of stage time
    pub scroll_accel_rate: f32,
    pub scroll_accel_max: f32,
    /// Distance from camera top to the player when following
    pub camera_follow_offset: f32,
    /// Follow smoothing per 60 Hz frame (0 = frozen, 1 = locked)
    pub camera_lerp: f32,

    // === Player ===
    pub invincibility_secs: f32,
    pub revive_invincibility_secs: f32,

    // === Weapon ===
    pub fire_cooldown_secs: f32,
    pub bullet_speed: f32,
    pub recoil: f32,
    pub anti_gravity_recoil: f32,
    pub double_hit_offset: f32,
    /// Bullets are culled outside [camera - above, camera + below]
    pub bullet_window_above: f32,
    pub bullet_window_below: f32,

    // === Combat ===
    pub stomp_bounce: f32,
    pub red_stomp_bounce: f32,
    pub knockback_x: f32,
    pub knockback_y: f32,
    pub spike_knockback: f32,
    pub spike_base_damage: u32,
    pub spike_damage_per_tier: u32,
    pub freeze_secs: f32,
    /// Reward multiplier gained per combo step
    pub combo_step: f32,
    pub kill_score: u32,

    // === Enemies ===
    /// Pre-placed enemies never spawn above this depth
    pub enemy_safe_zone_y: f32,
    /// ...nor closer than this to the stage bottom
    pub enemy_bottom_margin: f32,
    pub patrol_chance: f64,
    pub patrol_red_chance: f64,
    pub hunter_base_count: u32,
    pub hunter_count_per_tier: u32,
    pub hunter_min_y: f32,
    pub hunter_gravity: f32,
    pub hunter_chase_factor: f32,
    pub interceptor_base_interval: f32,
    pub interceptor_interval_per_tier: f32,
    pub interceptor_min_interval: f32,
    /// The spawn timer fires at interval / divisor
    pub interceptor_rate_divisor: f32,
    pub interceptor_double_chance: f64,
    /// Spawn line below the camera top
    pub interceptor_spawn_offset: f32,
    pub interceptor_amplitude: f32,
    pub interceptor_gravity: f32,
    /// Active enemies are removed outside [camera - above, camera + below];
    /// dormant enemies wake up once inside the same window
    pub despawn_above: f32,
    pub despawn_below: f32,

    // === XP orbs ===
    pub orb_gravity: f32,
    pub orb_lifetime_secs: f32,
    pub orb_magnet_base: f32,
    pub orb_magnet_per_range: f32,
    pub orb_pull_speed: f32,

    // === World generation ===
    pub platform_spacing_base: f32,
    pub platform_spacing_per_tier: f32,
    pub platform_spacing_min: f32,
    pub spike_chance_base: f64,
    pub spike_chance_per_tier: f64,
    pub secondary_platform_chance: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            safe_start_secs: 3.0,
            offscreen_grace_secs: 3.0,
            stage_clear_delay_secs: 1.0,
            game_over_delay_secs: 0.8,
            hit_flash_secs: 1.0,

            scroll_base_speed: 22.0,
            scroll_speed_per_tier: 12.0,
            scroll_speed_per_stage: 3.0,
            scroll_accel_rate: 0.45,
            scroll_accel_max: 25.0,
            camera_follow_offset: 150.0,
            camera_lerp: 0.3,

            invincibility_secs: 1.0,
            revive_invincibility_secs: 2.0,

            fire_cooldown_secs: 0.35,
            bullet_speed: 600.0,
            recoil: 350.0,
            anti_gravity_recoil: 420.0,
            double_hit_offset: 12.0,
            bullet_window_above: 50.0,
            bullet_window_below: 800.0,

            stomp_bounce: 220.0,
            red_stomp_bounce: 200.0,
            knockback_x: 250.0,
            knockback_y: 150.0,
            spike_knockback: 250.0,
            spike_base_damage: 15,
            spike_damage_per_tier: 5,
            freeze_secs: 2.0,
            combo_step: 0.15,
            kill_score: 100,

            enemy_safe_zone_y: 1000.0,
            enemy_bottom_margin: 400.0,
            patrol_chance: 0.35,
            patrol_red_chance: 0.3,
            hunter_base_count: 2,
            hunter_count_per_tier: 2,
            hunter_min_y: 800.0,
            hunter_gravity: 0.0,
            hunter_chase_factor: 1.5,
            interceptor_base_interval: 4.0,
            interceptor_interval_per_tier: 0.5,
            interceptor_min_interval: 1.5,
            interceptor_rate_divisor: 3.0,
            interceptor_double_chance: 0.4,
            interceptor_spawn_offset: 760.0,
            interceptor_amplitude: 60.0,
            interceptor_gravity: -50.0,
            despawn_above: 100.0,
            despawn_below: 900.0,

            orb_gravity: 350.0,
            orb_lifetime_secs: 3.0,
            orb_magnet_base: 50.0,
            orb_magnet_per_range: 50.0,
            orb_pull_speed: 200.0,

            platform_spacing_base: 180.0,
            platform_spacing_per_tier: 12.0,
            platform_spacing_min: 130.0,
            spike_chance_base: 0.2,
            spike_chance_per_tier: 0.05,
            secondary_platform_chance: 0.25,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a tuning document from disk
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Base auto-scroll speed for a stage (before time acceleration)
    pub fn scroll_speed(&self, stage: u32, tier: u32) -> f32 {
        self.scroll_base_speed
            + self.scroll_speed_per_tier * tier as f32
            + self.scroll_speed_per_stage * stage as f32
    }

    /// Seconds between interceptor spawn checks
    pub fn interceptor_period(&self, tier: u32) -> f32 {
        let interval = (self.interceptor_base_interval
            - self.interceptor_interval_per_tier * tier as f32)
            .max(self.interceptor_min_interval);
        interval / self.interceptor_rate_divisor
    }

    /// Flat spike damage for a difficulty tier
    pub fn spike_damage(&self, tier: u32) -> u32 {
        self.spike_base_damage + self.spike_damage_per_tier * tier
    }

    /// Chance a mid-band platform gets a patrol
    pub fn patrol_probability(&self) -> f64 {
        probability(self.patrol_chance)
    }

    /// Chance a placed patrol is red
    pub fn patrol_red_probability(&self) -> f64 {
        probability(self.patrol_red_chance)
    }

    /// Chance an interceptor wave is followed by a second one
    pub fn double_wave_probability(&self) -> f64 {
        probability(self.interceptor_double_chance)
    }

    /// Chance a walk platform gets a backup ledge
    pub fn secondary_platform_probability(&self) -> f64 {
        probability(self.secondary_platform_chance)
    }
}

/// Clamp a configured chance into `[0, 1]`; NaN counts as never
pub fn probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}
