//! Level / XP bookkeeping and run resets

use super::items::Effect;
use super::state::{GameMode, RunState};
use crate::consts::BASE_HP;

/// XP needed to advance from `level` to `level + 1`
pub fn xp_to_next_for(level: u32) -> u32 {
    (100.0 * 1.15_f64.powi(level as i32 - 1)).floor() as u32
}

/// Luck granted by a level
#[inline]
pub fn luck_for(level: u32) -> u32 {
    level / 2
}

impl RunState {
    /// XP multiplier from items: `(1 + Σ xpBoost) * Π soulCollect`
    pub fn xp_multiplier(&self) -> f64 {
        let additive = 1.0 + self.sum_effect(Effect::XpBoost);
        self.effect_values(Effect::SoulCollect)
            .fold(additive, |mult, v| mult * v)
    }

    /// Grant XP (after item multipliers), levelling up as many times as needed.
    /// Returns the number of levels gained.
    pub fn add_xp(&mut self, amount: u32) -> u32 {
        let gained = (amount as f64 * self.xp_multiplier()).floor() as u32;
        self.grant_raw_xp(gained)
    }

    fn grant_raw_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut levels = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.luck = luck_for(self.level);
            self.xp_to_next = xp_to_next_for(self.level);
            levels += 1;
        }
        if levels > 0 {
            log::info!("Level up → {} (luck {})", self.level, self.luck);
        }
        levels
    }

    /// Reset for a new attempt. `full` also wipes level, XP, luck and score.
    pub fn reset_for_new_run(&mut self, full: bool) {
        if full {
            self.level = 1;
            self.xp = 0;
            self.xp_to_next = xp_to_next_for(1);
            self.luck = 0;
            self.score = 0;
        }
        self.current_stage = 1;
        self.hp = BASE_HP;
        self.max_hp = BASE_HP;
        self.items.clear();
        self.shield_count = 0;
        self.revive_available = false;
        self.full_revive_available = false;
    }

    /// Reset after a confirmed death or a return to title: Hard wipes everything
    pub fn reset_after_death(&mut self) {
        self.reset_for_new_run(self.mode == GameMode::Hard);
    }
}
