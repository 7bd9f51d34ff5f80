//! Enemy population and AI
//!
//! Three behaviours, dispatched per frame:
//! - Patrol: walks back and forth across the ledge it spawned on
//! - Interceptor: rises from below the camera, weaving around its spawn x
//! - Hunter: eases its velocity toward the player

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::items::Effect;
use super::state::{RunState, SimRng};
use super::world::{Ledge, World};
use crate::Aabb;
use crate::consts::{ENEMY_SIZE, WORLD_WIDTH};
use crate::tuning::Tuning;

/// AI behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiType {
    Patrol,
    Interceptor,
    Hunter,
}

/// Combat numbers for a freshly spawned enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStats {
    pub hp: i32,
    pub damage: u32,
    pub xp_reward: u32,
}

impl EnemyStats {
    /// Stat table by behaviour, colour and difficulty tier
    pub fn for_spawn(ai: AiType, is_red: bool, tier: u32) -> Self {
        let d = tier as i32;
        if ai == AiType::Hunter {
            return Self {
                hp: 40 + 15 * d,
                damage: 25 + 5 * tier,
                xp_reward: 40 + 8 * tier,
            };
        }
        if is_red {
            Self {
                hp: 30 + 10 * d,
                damage: 20 + 5 * tier,
                xp_reward: 25 + 5 * tier,
            }
        } else {
            Self {
                hp: 15 + 5 * d,
                damage: 10,
                xp_reward: 15 + 3 * tier,
            }
        }
    }
}

/// Interceptor wave shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePattern {
    /// One interceptor, red 40% of the time
    Single,
    /// Red leader with two white wingmen
    Vee,
    /// Three abreast, alternating red and white
    Wall,
}

impl WavePattern {
    /// 70% single, 20% V, 10% wall
    pub fn from_roll(roll: f64) -> Self {
        if roll < 0.7 {
            WavePattern::Single
        } else if roll < 0.9 {
            WavePattern::Vee
        } else {
            WavePattern::Wall
        }
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub ai: AiType,
    pub hp: i32,
    pub max_hp: i32,
    pub damage: u32,
    pub xp_reward: u32,
    /// Horizontal (patrol/interceptor) or chase (hunter) speed
    pub speed: f32,
    /// Interceptor climb speed
    pub rise_speed: f32,
    /// Hunter easing factor per 60 Hz frame
    pub accel: f32,
    /// Net vertical acceleration while active
    pub gravity: f32,
    /// Stomp-immune variant
    pub is_red: bool,
    pub patrol_bounds: Option<(f32, f32)>,
    pub origin: Vec2,
    /// -1 or 1
    pub move_dir: f32,
    pub facing_left: bool,
    /// Dormant enemies neither think nor despawn until the camera nears them
    pub active: bool,
    /// Seconds of freeze remaining
    pub frozen: f32,
}

impl Enemy {
    #[inline]
    pub fn body(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::splat(ENEMY_SIZE))
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen > 0.0
    }

    fn think(&mut self, dt: f32, player_pos: Vec2, tuning: &Tuning) {
        match self.ai {
            AiType::Patrol => {
                if let Some((left, right)) = self.patrol_bounds {
                    if self.pos.x <= left {
                        self.move_dir = 1.0;
                    } else if self.pos.x >= right {
                        self.move_dir = -1.0;
                    }
                }
                self.vel = Vec2::new(self.speed * self.move_dir, 0.0);
            }
            AiType::Interceptor => {
                let dx = self.pos.x - self.origin.x;
                if dx > tuning.interceptor_amplitude {
                    self.move_dir = -1.0;
                } else if dx < -tuning.interceptor_amplitude {
                    self.move_dir = 1.0;
                }
                self.vel = Vec2::new(self.speed * self.move_dir, -self.rise_speed);
            }
            AiType::Hunter => {
                let to_player = player_pos - self.pos;
                let dist = to_player.length();
                let dir = if dist > 0.0 { to_player / dist } else { to_player };
                let chase = dir * self.speed * tuning.hunter_chase_factor;
                let t = (self.accel * 60.0 * dt).min(1.0);
                self.vel += (chase - self.vel) * t;
                self.facing_left = to_player.x < 0.0;
            }
        }
    }
}

/// Owns every live enemy for the current stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemyController {
    pub enemies: Vec<Enemy>,
    /// Seconds since the last interceptor wave
    pub spawn_timer: f32,
    /// Cleared on teardown so no further waves appear
    pub spawning: bool,
    next_id: u32,
}

impl EnemyController {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            spawn_timer: 0.0,
            spawning: false,
            next_id: 1,
        }
    }

    /// Spawn one enemy. Draws speed, then rise speed (interceptors only), then direction.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        &mut self,
        ai: AiType,
        pos: Vec2,
        is_red: bool,
        ledge: Option<&Ledge>,
        run: &RunState,
        tuning: &Tuning,
        rng: &mut SimRng,
    ) -> u32 {
        let tier = run.difficulty();
        let is_red = is_red || ai == AiType::Hunter;
        let stats = EnemyStats::for_spawn(ai, is_red, tier);

        let mut speed: f32 = if ai == AiType::Hunter {
            rng.random_range(25..=40) as f32
        } else {
            rng.random_range(20..=50) as f32
        };
        let rise_speed = if ai == AiType::Interceptor {
            rng.random_range(30..=55 + 5 * tier) as f32
        } else {
            0.0
        };
        let move_dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };

        // Applied once at spawn; later time-slow pickups do not affect live enemies
        if run.has_effect(Effect::TimeSlow) {
            speed = (speed * (1.0 - run.sum_effect(Effect::TimeSlow) as f32)).floor();
        }

        let (gravity, accel, active) = match ai {
            AiType::Patrol => (0.0, 0.0, false),
            AiType::Interceptor => (tuning.interceptor_gravity, 0.0, true),
            AiType::Hunter => (tuning.hunter_gravity, 0.015 + 0.005 * tier as f32, false),
        };

        let id = self.next_id;
        self.next_id += 1;
        self.enemies.push(Enemy {
            id,
            pos,
            vel: Vec2::ZERO,
            ai,
            hp: stats.hp,
            max_hp: stats.hp,
            damage: stats.damage,
            xp_reward: stats.xp_reward,
            speed,
            rise_speed,
            accel,
            gravity,
            is_red,
            patrol_bounds: ledge.map(|l| l.patrol_bounds()),
            origin: pos,
            move_dir,
            facing_left: false,
            active,
            frozen: 0.0,
        });
        id
    }

    /// Stage population placed when the safe start ends
    pub fn populate(&mut self, world: &World, run: &RunState, tuning: &Tuning, rng: &mut SimRng) {
        let tier = run.difficulty();
        let min_y = tuning.enemy_safe_zone_y;
        let max_y = world.height - tuning.enemy_bottom_margin;

        for ledge in &world.platforms {
            if ledge.pos.y < min_y || ledge.pos.y > max_y {
                continue;
            }
            if rng.random_bool(tuning.patrol_probability()) {
                let is_red = rng.random_bool(tuning.patrol_red_probability());
                let pos = Vec2::new(ledge.pos.x, ledge.pos.y - ENEMY_SIZE * 0.75);
                self.spawn(AiType::Patrol, pos, is_red, Some(ledge), run, tuning, rng);
            }
        }

        let hunters = tuning.hunter_base_count + tuning.hunter_count_per_tier * tier;
        for _ in 0..hunters {
            let x = rng.random_range(60.0..=WORLD_WIDTH - 60.0);
            let y = rng.random_range(tuning.hunter_min_y..=max_y.max(tuning.hunter_min_y));
            self.spawn(AiType::Hunter, Vec2::new(x, y), true, None, run, tuning, rng);
        }

        self.spawning = true;
        log::debug!(
            "Populated stage {}: {} enemies ({} hunters)",
            run.current_stage,
            self.enemies.len(),
            hunters
        );
    }

    /// One interceptor wave at the spawn line below the camera
    pub fn spawn_interceptors(
        &mut self,
        camera_top: f32,
        world_height: f32,
        run: &RunState,
        tuning: &Tuning,
        rng: &mut SimRng,
    ) {
        let y = camera_top + tuning.interceptor_spawn_offset;
        if y > world_height - 100.0 {
            return;
        }
        let pattern = WavePattern::from_roll(rng.random());
        self.spawn_wave(pattern, y, run, tuning, rng);
    }

    /// Place one wave of `pattern` on the spawn line `y`
    pub fn spawn_wave(
        &mut self,
        pattern: WavePattern,
        y: f32,
        run: &RunState,
        tuning: &Tuning,
        rng: &mut SimRng,
    ) {
        let ai = AiType::Interceptor;
        match pattern {
            WavePattern::Single => {
                let x = rng.random_range(60.0..=WORLD_WIDTH - 60.0);
                let is_red = rng.random_bool(0.4);
                self.spawn(ai, Vec2::new(x, y), is_red, None, run, tuning, rng);
            }
            WavePattern::Vee => {
                // Red leader, white wingmen trailing below
                let cx = rng.random_range(100.0..=WORLD_WIDTH - 100.0);
                self.spawn(ai, Vec2::new(cx, y), true, None, run, tuning, rng);
                self.spawn(ai, Vec2::new(cx - 40.0, y + 40.0), false, None, run, tuning, rng);
                self.spawn(ai, Vec2::new(cx + 40.0, y + 40.0), false, None, run, tuning, rng);
            }
            WavePattern::Wall => {
                for i in 0..3 {
                    let x = 80.0 + i as f32 * 120.0;
                    self.spawn(ai, Vec2::new(x, y), i % 2 == 0, None, run, tuning, rng);
                }
            }
        }
    }

    /// Physics step for active, unfrozen enemies
    pub fn integrate(&mut self, dt: f32) {
        let half = ENEMY_SIZE * 0.5;
        for enemy in self.enemies.iter_mut().filter(|e| e.active && !e.is_frozen()) {
            enemy.vel.y += enemy.gravity * dt;
            enemy.pos += enemy.vel * dt;
            if enemy.ai == AiType::Patrol {
                enemy.pos.x = enemy.pos.x.clamp(half, WORLD_WIDTH - half);
            }
        }
    }

    /// Spawner, wake-up, AI and off-screen cleanup for one frame
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        dt: f32,
        player_pos: Vec2,
        camera_top: f32,
        world_height: f32,
        run: &RunState,
        tuning: &Tuning,
        rng: &mut SimRng,
    ) {
        if self.spawning {
            self.spawn_timer += dt;
            if self.spawn_timer > tuning.interceptor_period(run.difficulty()) {
                self.spawn_interceptors(camera_top, world_height, run, tuning, rng);
                if rng.random_bool(tuning.double_wave_probability()) {
                    self.spawn_interceptors(camera_top, world_height, run, tuning, rng);
                }
                self.spawn_timer = 0.0;
            }
        }

        let window_top = camera_top - tuning.despawn_above;
        let window_bottom = camera_top + tuning.despawn_below;
        let in_window = |y: f32| y >= window_top && y <= window_bottom;

        for enemy in &mut self.enemies {
            if !enemy.active {
                if !in_window(enemy.pos.y) {
                    continue;
                }
                enemy.active = true;
            }
            if enemy.is_frozen() {
                enemy.frozen = (enemy.frozen - dt).max(0.0);
                enemy.vel = Vec2::ZERO;
                continue;
            }
            enemy.think(dt, player_pos, tuning);
        }

        self.enemies.retain(|e| !e.active || in_window(e.pos.y));
    }

    /// Stop spawning and drop every enemy (stage teardown)
    pub fn clear(&mut self) {
        self.spawning = false;
        self.enemies.clear();
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn remove(&mut self, id: u32) -> Option<Enemy> {
        let index = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(index))
    }
}
