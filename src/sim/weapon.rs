//! Gun boots: finite ammo, cooldown-gated fire, upward recoil
//!
//! Recoil is the player's only way to climb back against gravity and the
//! auto-scroll, so ammo is the core resource. It refills once per landing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::items::Effect;
use super::player::Player;
use super::state::RunState;
use crate::Aabb;
use crate::consts::{BULLET_SIZE, MAX_AMMO};
use crate::tuning::Tuning;

/// Bullets spawn this far below the player's centre
const MUZZLE_OFFSET: f32 = 20.0;

/// A downward shot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: u32,
}

impl Bullet {
    #[inline]
    pub fn body(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::splat(BULLET_SIZE))
    }
}

/// Ammo pool and fire cooldown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub ammo: u32,
    pub max_ammo: u32,
    /// Seconds until the next shot is allowed (fires at <= 0)
    pub cooldown: f32,
}

impl Default for Weapon {
    fn default() -> Self {
        Self {
            ammo: MAX_AMMO,
            max_ammo: MAX_AMMO,
            cooldown: 0.0,
        }
    }
}

impl Weapon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_fire(&self) -> bool {
        self.ammo > 0 && self.cooldown <= 0.0
    }

    /// Count down the cooldown and fire if triggered.
    ///
    /// `trigger` is the edge-triggered press or an active touch-fire hold.
    /// Returns the number of bullets spawned (0 when gated).
    pub fn update(
        &mut self,
        dt: f32,
        trigger: bool,
        player: &mut Player,
        run: &RunState,
        tuning: &Tuning,
        bullets: &mut Vec<Bullet>,
    ) -> u32 {
        self.cooldown -= dt;
        if !trigger || !self.can_fire() {
            return 0;
        }

        self.ammo -= 1;
        self.cooldown = tuning.fire_cooldown_secs;

        let shots = run.hits_per_shot();
        let damage = run.effective_attack();
        let origin = player.pos + Vec2::new(0.0, MUZZLE_OFFSET);
        let vel = Vec2::new(0.0, tuning.bullet_speed);
        if shots == 1 {
            bullets.push(Bullet { pos: origin, vel, damage });
        } else {
            for side in [-1.0, 1.0] {
                let pos = origin + Vec2::new(side * tuning.double_hit_offset, 0.0);
                bullets.push(Bullet { pos, vel, damage });
            }
        }

        player.vel.y = if run.has_effect(Effect::AntiGravity) {
            -tuning.anti_gravity_recoil
        } else {
            -tuning.recoil
        };
        shots
    }

    /// Refill the pool. Returns true if any ammo was restored.
    pub fn reload(&mut self) -> bool {
        if self.ammo < self.max_ammo {
            self.ammo = self.max_ammo;
            true
        } else {
            false
        }
    }
}

/// Move bullets (gravity-neutral) and drop those outside the camera window
pub fn update_bullets(bullets: &mut Vec<Bullet>, dt: f32, camera_top: f32, tuning: &Tuning) {
    for bullet in bullets.iter_mut() {
        bullet.pos += bullet.vel * dt;
    }
    let top = camera_top - tuning.bullet_window_above;
    let bottom = camera_top + tuning.bullet_window_below;
    bullets.retain(|b| b.pos.y >= top && b.pos.y <= bottom);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::items::find;

    fn fire(weapon: &mut Weapon, run: &RunState, bullets: &mut Vec<Bullet>) -> (u32, Player) {
        let mut player = Player::new();
        let shots = weapon.update(0.0, true, &mut player, run, &Tuning::default(), bullets);
        (shots, player)
    }

    #[test]
    fn test_fire_consumes_ammo_and_recoils() {
        let mut weapon = Weapon::new();
        let mut bullets = Vec::new();
        let run = RunState::default();
        let (shots, player) = fire(&mut weapon, &run, &mut bullets);
        assert_eq!(shots, 1);
        assert_eq!(weapon.ammo, MAX_AMMO - 1);
        assert_eq!(player.vel.y, -350.0);
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0].damage, 10);
        assert_eq!(bullets[0].vel.y, 600.0);
    }

    #[test]
    fn test_cooldown_gates_fire() {
        let mut weapon = Weapon::new();
        let mut bullets = Vec::new();
        let run = RunState::default();
        fire(&mut weapon, &run, &mut bullets);
        let (shots, _) = fire(&mut weapon, &run, &mut bullets);
        assert_eq!(shots, 0);

        let mut player = Player::new();
        let tuning = Tuning::default();
        assert_eq!(weapon.update(0.36, true, &mut player, &run, &tuning, &mut bullets), 1);
    }

    #[test]
    fn test_empty_pool_refuses_then_reloads() {
        let mut weapon = Weapon { ammo: 0, ..Weapon::new() };
        let mut bullets = Vec::new();
        let run = RunState::default();
        let (shots, player) = fire(&mut weapon, &run, &mut bullets);
        assert_eq!(shots, 0);
        assert_eq!(player.vel.y, 0.0);
        assert!(weapon.reload());
        assert_eq!(weapon.ammo, MAX_AMMO);
        assert!(!weapon.reload(), "full pool reports no reload");
    }

    #[test]
    fn test_double_hit_and_anti_gravity() {
        let mut run = RunState::default();
        run.add_item(*find(10).unwrap());
        run.add_item(*find(26).unwrap());
        let mut weapon = Weapon::new();
        let mut bullets = Vec::new();
        let (shots, player) = fire(&mut weapon, &run, &mut bullets);
        assert_eq!(shots, 2);
        assert_eq!(weapon.ammo, MAX_AMMO - 1, "one ammo per trigger");
        assert_eq!(bullets[0].pos.x, player.pos.x - 12.0);
        assert_eq!(bullets[1].pos.x, player.pos.x + 12.0);
        assert_eq!(player.vel.y, -420.0);
    }

    #[test]
    fn test_bullets_culled_outside_window() {
        let tuning = Tuning::default();
        let mut bullets = vec![
            Bullet { pos: Vec2::new(0.0, 100.0), vel: Vec2::new(0.0, 600.0), damage: 1 },
            Bullet { pos: Vec2::new(0.0, 795.0), vel: Vec2::new(0.0, 600.0), damage: 1 },
        ];
        update_bullets(&mut bullets, 0.1, 0.0, &tuning);
        assert_eq!(bullets.len(), 1);
        assert_eq!(bullets[0].pos.y, 160.0);
    }
}
