//! Derived player stats
//!
//! Every stat is recomputed from the item stack on demand, so there is no
//! cache to invalidate. Application order matters and is fixed:
//! additive modifiers, then `allStats`, then `atkMult`, then `berserker`.

use super::items::Effect;
use super::state::RunState;
use crate::consts::{BASE_ATTACK, BASE_HP, BASE_MOVE_SPEED};

/// Fall-speed multiplier never drops below this
pub const MIN_FALL_MULTIPLIER: f64 = 0.3;
/// Base fall multiplier in Hard mode
pub const HARD_FALL_MULTIPLIER: f64 = 1.4;
/// Attack penalty per toughness item
const TOUGHNESS_ATTACK_PENALTY: i64 = 3;
/// Move speed bonus per wind-walk item
const WIND_WALK_SPEED: f64 = 1.2;

impl RunState {
    /// Attack power used for bullet damage
    pub fn effective_attack(&self) -> u32 {
        let mut atk = BASE_ATTACK;
        for item in &self.items {
            match item.effect {
                Effect::AtkUp | Effect::FlameDmg => atk += item.value as i64,
                Effect::Toughness => atk -= TOUGHNESS_ATTACK_PENALTY,
                _ => {}
            }
        }
        for scale in self.effect_values(Effect::AllStats) {
            atk = (atk as f64 * (1.0 + scale)).floor() as i64;
        }
        for mult in self.effect_values(Effect::AtkMult) {
            atk = (atk as f64 * mult).floor() as i64;
        }
        if self.has_effect(Effect::Berserker) && (self.hp as f64) <= self.max_hp as f64 * 0.5 {
            atk *= 2;
        }
        atk.max(1) as u32
    }

    /// Horizontal move speed
    pub fn effective_speed(&self) -> u32 {
        let mut speed = BASE_MOVE_SPEED;
        for item in &self.items {
            match item.effect {
                Effect::SpdUp | Effect::AllStats => speed *= 1.0 + item.value,
                Effect::WindWalk => speed *= WIND_WALK_SPEED,
                _ => {}
            }
        }
        speed.floor() as u32
    }

    /// Multiplier applied to the player's gravity
    pub fn fall_multiplier(&self) -> f64 {
        let mut mult = match self.mode {
            super::state::GameMode::Hard => HARD_FALL_MULTIPLIER,
            super::state::GameMode::Normal => 1.0,
        };
        for item in &self.items {
            if matches!(
                item.effect,
                Effect::FallSlow | Effect::AntiGravity | Effect::WindWalk
            ) {
                mult *= 1.0 - item.value;
            }
        }
        mult.max(MIN_FALL_MULTIPLIER)
    }

    /// Max HP as a pure function of the item stack
    pub fn effective_max_hp(&self) -> u32 {
        let mut base = BASE_HP as f64;
        for item in &self.items {
            if matches!(item.effect, Effect::MaxHpUp | Effect::Toughness) {
                base += item.value;
            }
        }
        for scale in self.effect_values(Effect::AllStats) {
            base = (base * (1.0 + scale)).floor();
        }
        (base.floor() as u32).max(1)
    }

    /// Recompute max HP and clamp current HP to it
    pub fn apply_max_hp(&mut self) {
        self.max_hp = self.effective_max_hp();
        self.hp = self.hp.min(self.max_hp);
    }

    /// Bullets per shot
    pub fn hits_per_shot(&self) -> u32 {
        if self.has_effect(Effect::DoubleHit) { 2 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::items::find;
    use crate::sim::state::GameMode;
    use proptest::prelude::*;

    fn with_items(ids: &[u32]) -> RunState {
        let mut run = RunState::new(GameMode::Normal);
        for &id in ids {
            run.add_item(*find(id).unwrap());
        }
        run
    }

    #[test]
    fn test_fresh_run_base_stats() {
        let run = RunState::new(GameMode::Normal);
        assert_eq!(run.effective_attack(), 10);
        assert_eq!(run.effective_speed(), 450);
        assert_eq!(run.fall_multiplier(), 1.0);
        assert_eq!(run.effective_max_hp(), 100);

        let hard = RunState::new(GameMode::Hard);
        assert!((hard.fall_multiplier() - 1.4).abs() < 1e-12);
    }

    #[test]
    fn test_atk_up_adds_exactly_value() {
        let base = RunState::default().effective_attack();
        assert_eq!(with_items(&[4]).effective_attack(), base + 5);
    }

    #[test]
    fn test_toughness_trades_attack_for_hp() {
        let base = RunState::default();
        let tough = with_items(&[16]);
        assert_eq!(tough.effective_max_hp(), base.effective_max_hp() + 35);
        assert_eq!(tough.effective_attack(), base.effective_attack() - 3);
    }

    #[test]
    fn test_berserker_doubles_at_half_hp() {
        let mut run = RunState::default();
        run.hp = 40;
        let plain = run.effective_attack();
        run.add_item(*find(17).unwrap());
        assert_eq!(run.max_hp, 100);
        assert_eq!(run.effective_attack(), plain * 2);

        run.hp = 51;
        assert_eq!(run.effective_attack(), plain);
    }

    #[test]
    fn test_application_order() {
        // (10 + 5) * 1.25 = 18.75 → 18, then * 3 = 54
        assert_eq!(with_items(&[4, 29, 28]).effective_attack(), 54);
        // Order of acquisition does not change the result
        assert_eq!(with_items(&[28, 29, 4]).effective_attack(), 54);
        // 125 * 1.25 = 156.25 → 156
        assert_eq!(with_items(&[9, 29]).effective_max_hp(), 156);
    }

    #[test]
    fn test_speed_modifiers() {
        // 450 * 1.15 * 1.2 = 621
        assert_eq!(with_items(&[3, 22]).effective_speed(), 621);
    }

    #[test]
    fn test_fall_multiplier_floor() {
        // 0.75 * 0.6 * 0.6 * 0.85 = 0.2295 → clamped
        let run = with_items(&[22, 26, 26, 11]);
        assert_eq!(run.fall_multiplier(), MIN_FALL_MULTIPLIER);
    }

    #[test]
    fn test_attack_never_below_one() {
        let run = with_items(&[16, 16, 16, 16]);
        assert_eq!(run.effective_attack(), 1);
    }

    #[test]
    fn test_max_hp_change_clamps_hp() {
        let mut run = with_items(&[9]);
        assert_eq!(run.max_hp, 125);
        run.hp = 125;
        run.items.clear();
        run.apply_max_hp();
        assert_eq!(run.max_hp, 100);
        assert_eq!(run.hp, 100);
    }

    proptest! {
        #[test]
        fn prop_max_hp_at_least_one_and_hp_clamped(
            ids in proptest::collection::vec(1u32..=30, 0..12),
            hp in 0u32..500,
        ) {
            let mut run = with_items(&ids);
            run.hp = hp;
            run.apply_max_hp();
            prop_assert!(run.effective_max_hp() >= 1);
            prop_assert!(run.hp <= run.max_hp);
            prop_assert!(run.effective_attack() >= 1);
            prop_assert!(run.fall_multiplier() >= MIN_FALL_MULTIPLIER);
        }
    }
}
