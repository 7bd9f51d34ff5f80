//! Contact resolution: goal, spikes, enemies, bullets, orbs
//!
//! Runs once per active frame after physics, in that fixed priority. Once the
//! goal or a death is latched the remaining checks are skipped.

use rand::Rng;

use super::collision::{Contact, classify_enemy_contact, knockback_dir};
use super::items::Effect;
use super::orb::{XpOrb, collect_orbs};
use super::state::{GameEvent, RunState, SimRng};
use super::tick::{Stage, StagePhase};
use super::timers::DeferredEvent;

/// Result of routing incoming damage through the player's defences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// A shield charge ate the hit
    Absorbed,
    /// No damage taken; the amount goes back to the attacker
    Reflected(u32),
    /// HP actually removed
    Applied(u32),
}

impl RunState {
    /// Shield, then damage reduction, then the reflect roll, then HP
    pub fn take_damage(&mut self, damage: u32, rng: &mut SimRng) -> DamageOutcome {
        if self.shield_count > 0 {
            self.shield_count -= 1;
            return DamageOutcome::Absorbed;
        }
        let mut damage = damage;
        if self.has_effect(Effect::DamageReduce) {
            let keep = (1.0 - self.sum_effect(Effect::DamageReduce)).max(0.0);
            damage = (damage as f64 * keep).floor() as u32;
        }
        if self.has_effect(Effect::Reflect) {
            let chance = self.sum_effect(Effect::Reflect).clamp(0.0, 1.0);
            if rng.random_bool(chance) {
                return DamageOutcome::Reflected(damage);
            }
        }
        let applied = damage.min(self.hp);
        self.hp -= applied;
        DamageOutcome::Applied(applied)
    }
}

/// Per-frame contact inputs gathered by the physics step
#[derive(Debug, Clone, Copy, Default)]
pub struct Contacts {
    pub on_spike: bool,
}

/// Resolve every contact for one active frame
pub fn resolve(stage: &mut Stage, run: &mut RunState, rng: &mut SimRng, contacts: Contacts) {
    if resolve_goal(stage, run) {
        return;
    }
    if contacts.on_spike {
        resolve_spike(stage, run, rng);
    }
    if stage.phase.is_latched() {
        return;
    }
    resolve_enemy_contacts(stage, run, rng);
    if stage.phase.is_latched() {
        return;
    }
    resolve_bullets(stage, run);
    collect_orbs(&mut stage.orbs, &stage.player.body());
}

/// One-shot goal latch. Returns true when the goal was reached this frame.
fn resolve_goal(stage: &mut Stage, run: &mut RunState) -> bool {
    if stage.phase != StagePhase::Active || !stage.player.body().overlaps(&stage.world.goal) {
        return false;
    }
    stage.phase = StagePhase::StageClear;
    if run.has_effect(Effect::StageHeal) {
        run.heal(run.sum_effect(Effect::StageHeal).floor() as u32);
    }
    stage.enemies.spawning = false;
    stage
        .timers
        .schedule(stage.tuning.stage_clear_delay_secs, DeferredEvent::AdvanceStage);
    stage.events.push(GameEvent::StageCleared);
    log::info!(
        "Stage {} cleared (score {}, hp {}/{})",
        run.current_stage,
        run.score,
        run.hp,
        run.max_hp
    );
    true
}

/// Shared contact-damage pipeline. `None` while invincible.
///
/// Every hit that reaches `take_damage` (absorbed and reflected included)
/// starts the invincibility window and breaks the combo.
fn hit_player(
    stage: &mut Stage,
    run: &mut RunState,
    rng: &mut SimRng,
    damage: u32,
) -> Option<DamageOutcome> {
    if stage.player.is_invincible() {
        return None;
    }
    let outcome = run.take_damage(damage, rng);
    stage.player.invincible = stage.tuning.invincibility_secs;
    stage.combo = 0;
    stage.hit_flash = true;
    if let Some(id) = stage.hit_flash_timer.take() {
        stage.timers.cancel(id);
    }
    let id = stage
        .timers
        .schedule(stage.tuning.hit_flash_secs, DeferredEvent::EndHitFlash);
    stage.hit_flash_timer = Some(id);
    stage.events.push(GameEvent::PlayerHit);
    if let DamageOutcome::Reflected(amount) = outcome {
        stage.events.push(GameEvent::Reflected { amount });
    }
    Some(outcome)
}

fn resolve_spike(stage: &mut Stage, run: &mut RunState, rng: &mut SimRng) {
    let damage = stage.tuning.spike_damage(run.difficulty());
    if hit_player(stage, run, rng, damage).is_none() {
        return;
    }
    stage.player.vel.y = -stage.tuning.spike_knockback;
    if run.hp == 0 {
        resolve_death(stage, run);
    }
}

fn resolve_enemy_contacts(stage: &mut Stage, run: &mut RunState, rng: &mut SimRng) {
    let ids: Vec<u32> = stage.enemies.enemies.iter().map(|e| e.id).collect();
    for id in ids {
        if stage.phase.is_latched() {
            return;
        }
        let Some(enemy) = stage.enemies.enemies.iter().find(|e| e.id == id) else {
            continue;
        };
        let body = stage.player.body();
        let Some(contact) = classify_enemy_contact(&body, stage.player.vel, &enemy.body()) else {
            continue;
        };
        let (is_red, damage, enemy_x) = (enemy.is_red, enemy.damage, enemy.pos.x);

        if contact == Contact::Stomp && !is_red {
            kill_enemy(stage, run, id);
            if stage.weapon.reload() {
                stage.events.push(GameEvent::Reloaded);
            }
            stage.player.vel.y = -stage.tuning.stomp_bounce;
            continue;
        }

        let Some(outcome) = hit_player(stage, run, rng, damage) else {
            continue;
        };

        if let DamageOutcome::Reflected(amount) = outcome {
            let dead = stage.enemies.get_mut(id).is_some_and(|enemy| {
                enemy.hp -= amount as i32;
                enemy.is_dead()
            });
            if dead {
                kill_enemy(stage, run, id);
            }
        }

        if run.has_effect(Effect::FreezeChance) {
            let chance = run.sum_effect(Effect::FreezeChance).clamp(0.0, 1.0);
            if rng.random_bool(chance) {
                let freeze_secs = stage.tuning.freeze_secs;
                if let Some(enemy) = stage.enemies.get_mut(id) {
                    enemy.frozen = freeze_secs;
                    enemy.vel = glam::Vec2::ZERO;
                    let pos = enemy.pos;
                    stage.events.push(GameEvent::EnemyFrozen { pos });
                }
            }
        }

        if contact == Contact::Stomp {
            stage.player.vel.y = -stage.tuning.red_stomp_bounce;
        } else {
            let dir = knockback_dir(stage.player.pos.x, enemy_x);
            stage.player.vel.x = dir * stage.tuning.knockback_x;
            stage.player.vel.y = -stage.tuning.knockback_y;
        }

        if run.hp == 0 {
            resolve_death(stage, run);
        }
    }
}

fn resolve_bullets(stage: &mut Stage, run: &mut RunState) {
    let mut i = 0;
    while i < stage.bullets.len() {
        let body = stage.bullets[i].body();
        let target = stage
            .enemies
            .enemies
            .iter()
            .find(|e| e.body().overlaps(&body))
            .map(|e| e.id);
        let Some(id) = target else {
            i += 1;
            continue;
        };
        let bullet = stage.bullets.remove(i);
        let dead = stage.enemies.get_mut(id).is_some_and(|enemy| {
            enemy.hp -= bullet.damage as i32;
            enemy.is_dead()
        });
        if dead {
            kill_enemy(stage, run, id);
        }
    }
}

/// Remove an enemy and pay out its reward. No-op if it is already gone.
pub fn kill_enemy(stage: &mut Stage, run: &mut RunState, id: u32) -> bool {
    let Some(enemy) = stage.enemies.remove(id) else {
        return false;
    };
    let multiplier = 1.0 + stage.tuning.combo_step as f64 * stage.combo as f64;

    let levels = run.add_xp((enemy.xp_reward as f64 * multiplier).floor() as u32);
    if levels > 0 {
        stage.events.push(GameEvent::LevelUp { level: run.level });
    }
    run.score += (stage.tuning.kill_score as f64 * multiplier).floor() as u64;
    if run.has_effect(Effect::LifeSteal) {
        run.heal(run.sum_effect(Effect::LifeSteal) as u32);
    }

    stage.combo += 1;
    stage.orbs.push(XpOrb::new(enemy.pos));
    stage.events.push(GameEvent::EnemyKilled {
        pos: enemy.pos,
        red: enemy.is_red,
    });
    true
}

/// Revive chain, then the death latch. Ignored once the stage is latched.
pub fn resolve_death(stage: &mut Stage, run: &mut RunState) {
    if stage.phase.is_latched() {
        return;
    }

    if run.full_revive_available && run.consume_item(Effect::FullRevive) {
        run.hp = run.max_hp;
        revive(stage, true);
        return;
    }
    if run.revive_available && run.consume_item(Effect::Revive) {
        run.hp = (run.max_hp as f64 * 0.5).floor() as u32;
        revive(stage, false);
        return;
    }

    stage.phase = StagePhase::Dead;
    stage.enemies.spawning = false;
    stage
        .timers
        .schedule(stage.tuning.game_over_delay_secs, DeferredEvent::GameOver);
    stage.events.push(GameEvent::PlayerDied);
    log::info!(
        "Player died on stage {} (level {}, score {})",
        run.current_stage,
        run.level,
        run.score
    );
}

fn revive(stage: &mut Stage, full: bool) {
    stage.player.invincible = stage.tuning.revive_invincibility_secs;
    stage.player.offscreen_time = 0.0;
    stage.events.push(GameEvent::Revived { full });
    log::info!("Revived ({})", if full { "full" } else { "half" });
}
