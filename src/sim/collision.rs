//! Contact detection for the falling player
//!
//! Ledges (platforms and spikes) are one-way: only their top face collides,
//! and only while the player is falling onto it. Enemy contact is an overlap
//! test, classified as either a stomp or a side hit.

use glam::Vec2;

use super::world::Ledge;
use crate::Aabb;
use crate::consts::STOMP_TOLERANCE;

/// Float slack on the previous-bottom test so a body resting on a ledge stays on it
const LANDING_SLOP: f32 = 0.5;

/// How the player touched an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Falling onto the enemy's top
    Stomp,
    /// Any other overlap
    Side,
}

/// One-way landing test against a ledge.
///
/// `prev_bottom` is the player's bottom edge before this step's integration.
/// Returns the y the player's bottom should snap to, or `None` when the player
/// is rising, misses horizontally, or did not cross the top face this step.
pub fn land_on_ledge(prev_bottom: f32, body: &Aabb, vel: Vec2, ledge: &Ledge) -> Option<f32> {
    if vel.y < 0.0 {
        return None;
    }
    let surface = ledge.body();
    if !body.overlaps_x(&surface) {
        return None;
    }
    let top = surface.top();
    (prev_bottom <= top + LANDING_SLOP && body.bottom() >= top).then_some(top)
}

/// Classify an overlapping player/enemy pair. `None` when not overlapping.
///
/// A stomp requires downward motion and the player's bottom within
/// [`STOMP_TOLERANCE`] of the enemy's top; stomp and side contact never both apply.
pub fn classify_enemy_contact(player: &Aabb, player_vel: Vec2, enemy: &Aabb) -> Option<Contact> {
    if !player.overlaps(enemy) {
        return None;
    }
    if player_vel.y > 0.0 && player.bottom() <= enemy.top() + STOMP_TOLERANCE {
        Some(Contact::Stomp)
    } else {
        Some(Contact::Side)
    }
}

/// Horizontal knockback sign: away from the enemy
#[inline]
pub fn knockback_dir(player_x: f32, enemy_x: f32) -> f32 {
    if player_x < enemy_x { -1.0 } else { 1.0 }
}
