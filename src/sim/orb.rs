//! XP orbs dropped on kills. Cosmetic: the XP is granted at kill time.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::items::Effect;
use super::state::RunState;
use crate::Aabb;
use crate::consts::ORB_SIZE;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XpOrb {
    pub pos: Vec2,
    pub vel: Vec2,
    pub age: f32,
}

impl XpOrb {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            age: 0.0,
        }
    }

    #[inline]
    pub fn body(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::splat(ORB_SIZE))
    }
}

/// Pull radius around the player
pub fn magnet_radius(run: &RunState, tuning: &Tuning) -> f32 {
    tuning.orb_magnet_base + tuning.orb_magnet_per_range * run.sum_effect(Effect::XpRange) as f32
}

/// Drift, magnet pull and expiry
pub fn update_orbs(orbs: &mut Vec<XpOrb>, dt: f32, player_pos: Vec2, radius: f32, tuning: &Tuning) {
    for orb in orbs.iter_mut() {
        orb.age += dt;
        let to_player = player_pos - orb.pos;
        if to_player.length() < radius {
            orb.vel = to_player.normalize_or_zero() * tuning.orb_pull_speed;
        } else {
            orb.vel.y += tuning.orb_gravity * dt;
        }
        orb.pos += orb.vel * dt;
    }
    orbs.retain(|o| o.age < tuning.orb_lifetime_secs);
}

/// Remove orbs touching the player. Returns how many were collected.
pub fn collect_orbs(orbs: &mut Vec<XpOrb>, player: &Aabb) -> usize {
    let before = orbs.len();
    orbs.retain(|o| !o.body().overlaps(player));
    before - orbs.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::items::find;

    #[test]
    fn test_magnet_radius_scales_with_range_items() {
        let tuning = Tuning::default();
        let mut run = RunState::default();
        assert_eq!(magnet_radius(&run, &tuning), 50.0);
        run.add_item(*find(5).unwrap());
        assert_eq!(magnet_radius(&run, &tuning), 75.0);
    }

    #[test]
    fn test_orb_pulled_inside_radius() {
        let tuning = Tuning::default();
        let mut orbs = vec![XpOrb::new(Vec2::new(0.0, 0.0))];
        update_orbs(&mut orbs, 0.1, Vec2::new(40.0, 0.0), 50.0, &tuning);
        assert!((orbs[0].vel.x - 200.0).abs() < 1e-3);
        assert!(orbs[0].pos.x > 0.0);
    }

    #[test]
    fn test_orb_drifts_and_expires() {
        let tuning = Tuning::default();
        let mut orbs = vec![XpOrb::new(Vec2::ZERO)];
        update_orbs(&mut orbs, 1.0, Vec2::new(500.0, 500.0), 50.0, &tuning);
        assert!(orbs[0].vel.y > 0.0);
        update_orbs(&mut orbs, 2.5, Vec2::new(500.0, 500.0), 50.0, &tuning);
        assert!(orbs.is_empty());
    }

    #[test]
    fn test_collect_on_contact() {
        let mut orbs = vec![XpOrb::new(Vec2::new(10.0, 0.0)), XpOrb::new(Vec2::new(300.0, 0.0))];
        let player = Aabb::new(Vec2::ZERO, Vec2::new(32.0, 44.0));
        assert_eq!(collect_orbs(&mut orbs, &player), 1);
        assert_eq!(orbs.len(), 1);
    }
}
