//! Run state and core simulation types
//!
//! `RunState` is the player's meta-state for one attempt: progression, HP and
//! the acquired item stack. It survives stage transitions; per-stage entities
//! live in [`super::tick::Stage`].

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::items::{Effect, Item};
use crate::consts::BASE_HP;

/// The single random generator shared by everything in a session
pub type SimRng = Pcg32;

/// Death-reset severity and base fall speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Death keeps level, XP, luck and score
    #[default]
    Normal,
    /// Death resets everything; falling is 40% faster
    Hard,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Normal => "NORMAL",
            GameMode::Hard => "HARD",
        }
    }
}

/// Discrete events for the presentation layer. Never read back by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EnemyKilled { pos: Vec2, red: bool },
    PlayerHit,
    Reflected { amount: u32 },
    EnemyFrozen { pos: Vec2 },
    Fired { shots: u32 },
    Reloaded,
    LevelUp { level: u32 },
    Revived { full: bool },
    StageCleared,
    PlayerDied,
}

/// Complete per-run player state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub mode: GameMode,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    /// Always `floor(level * 0.5)`
    pub luck: u32,
    pub score: u64,
    pub current_stage: u32,
    pub hp: u32,
    pub max_hp: u32,
    /// Acquisition order, duplicates allowed
    pub items: Vec<Item>,
    pub shield_count: u32,
    pub revive_available: bool,
    pub full_revive_available: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new(GameMode::Normal)
    }
}

impl RunState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            level: 1,
            xp: 0,
            xp_to_next: 100,
            luck: 0,
            score: 0,
            current_stage: 1,
            hp: BASE_HP,
            max_hp: BASE_HP,
            items: Vec::new(),
            shield_count: 0,
            revive_available: false,
            full_revive_available: false,
        }
    }

    /// True iff any held item carries `effect`
    pub fn has_effect(&self, effect: Effect) -> bool {
        self.items.iter().any(|i| i.effect == effect)
    }

    /// Sum of `value` over held items carrying `effect`
    pub fn sum_effect(&self, effect: Effect) -> f64 {
        self.items
            .iter()
            .filter(|i| i.effect == effect)
            .map(|i| i.value)
            .sum()
    }

    /// Values of held items carrying `effect`, in acquisition order
    pub fn effect_values(&self, effect: Effect) -> impl Iterator<Item = f64> + '_ {
        self.items
            .iter()
            .filter(move |i| i.effect == effect)
            .map(|i| i.value)
    }

    /// Heal, never above max HP
    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }

    /// Difficulty tier of the current stage
    pub fn difficulty(&self) -> u32 {
        crate::difficulty_tier(self.current_stage)
    }

    pub fn difficulty_label(&self) -> &'static str {
        crate::difficulty_label(self.difficulty())
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp == 0 {
            0.0
        } else {
            self.hp as f32 / self.max_hp as f32
        }
    }

    /// Append a copy of `item` and apply its on-pickup effect
    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
        match item.effect {
            Effect::Heal => self.heal(item.value as u32),
            Effect::Shield => self.shield_count += item.value as u32,
            Effect::Revive => self.revive_available = true,
            Effect::FullRevive => self.full_revive_available = true,
            _ => {}
        }
        self.apply_max_hp();
        log::debug!("Acquired {} ({:?})", item.name, item.effect);
    }

    /// Remove one held copy of a consumable, refreshing its availability flag
    pub fn consume_item(&mut self, effect: Effect) -> bool {
        let Some(index) = self.items.iter().position(|i| i.effect == effect) else {
            return false;
        };
        self.items.remove(index);
        match effect {
            Effect::Revive => self.revive_available = self.has_effect(Effect::Revive),
            Effect::FullRevive => {
                self.full_revive_available = self.has_effect(Effect::FullRevive)
            }
            _ => {}
        }
        self.apply_max_hp();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::items::find;

    fn item(id: u32) -> Item {
        *find(id).unwrap()
    }

    #[test]
    fn test_new_run_defaults() {
        let run = RunState::new(GameMode::Hard);
        assert_eq!(run.level, 1);
        assert_eq!(run.xp_to_next, 100);
        assert_eq!(run.hp, 100);
        assert_eq!(run.max_hp, 100);
        assert_eq!(run.current_stage, 1);
        assert!(run.items.is_empty());
        assert_eq!(run.difficulty_label(), "EASY");
    }

    #[test]
    fn test_effect_queries() {
        let mut run = RunState::default();
        run.add_item(item(3)); // spdUp 0.15
        run.add_item(item(15)); // spdUp 0.30
        assert!(run.has_effect(Effect::SpdUp));
        assert!(!run.has_effect(Effect::AtkUp));
        assert!((run.sum_effect(Effect::SpdUp) - 0.45).abs() < 1e-9);
        assert_eq!(run.sum_effect(Effect::Reflect), 0.0);
    }

    #[test]
    fn test_pickup_effects() {
        let mut run = RunState::default();
        run.hp = 50;
        run.add_item(item(1)); // heal 30
        assert_eq!(run.hp, 80);
        run.add_item(item(1));
        assert_eq!(run.hp, 100, "heal clamps to max");

        run.add_item(item(2));
        assert_eq!(run.shield_count, 1);

        run.add_item(item(23));
        run.add_item(item(24));
        assert!(run.revive_available);
        assert!(run.full_revive_available);
    }

    #[test]
    fn test_consume_one_copy_at_a_time() {
        let mut run = RunState::default();
        run.add_item(item(23));
        run.add_item(item(23));
        assert!(run.consume_item(Effect::Revive));
        assert!(run.revive_available, "second feather still held");
        assert!(run.consume_item(Effect::Revive));
        assert!(!run.revive_available);
        assert!(!run.consume_item(Effect::Revive));
    }

    #[test]
    fn test_run_state_json_roundtrip_keeps_items() {
        let mut run = RunState::default();
        run.add_item(item(28));
        let json = serde_json::to_string(&run).unwrap();
        let back: RunState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, run);
    }
}
