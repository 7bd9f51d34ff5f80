//! Per-frame stage simulation
//!
//! `tick` advances one stage by a variable `dt`. Inside the active phase the
//! order is fixed: auto-scroll, physics, enemy AI, weapon, contacts, off-scroll
//! death check, read-outs.

use super::combat::{self, Contacts};
use super::enemy::EnemyController;
use super::orb::{XpOrb, magnet_radius, update_orbs};
use super::player::Player;
use super::state::{GameEvent, RunState, SimRng};
use super::timers::{DeferredEvent, TimerId, Timers};
use super::weapon::{Bullet, Weapon, update_bullets};
use super::world::{World, generate_stage};
use crate::consts::*;
use crate::tuning::Tuning;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// -1 left, 0 none, 1 right
    pub move_axis: i8,
    /// Touch-fire held (fires whenever the weapon is ready)
    pub fire_held: bool,
    /// Fire key pressed this frame
    pub fire_just_pressed: bool,
    /// Idle/demo mode - autopilot plays the stage
    pub idle_mode: bool,
}

/// How a stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Cleared,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StagePhase {
    /// Grace period: physics only, no enemies, no damage
    SafeStart { remaining: f32 },
    Active,
    /// Goal latched, waiting to leave
    StageClear,
    /// Death latched, waiting for game over
    Dead,
    Finished(StageOutcome),
}

impl StagePhase {
    /// Goal or death latched; no further gameplay updates
    pub fn is_latched(&self) -> bool {
        matches!(
            self,
            StagePhase::StageClear | StagePhase::Dead | StagePhase::Finished(_)
        )
    }
}

/// Display read-outs, refreshed at the end of every tick. Never read back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Readout {
    pub hp: u32,
    pub max_hp: u32,
    pub hp_ratio: f32,
    pub ammo: u32,
    pub max_ammo: u32,
    pub score: u64,
    pub level: u32,
    pub combo: u32,
    pub stage: u32,
    pub difficulty_label: &'static str,
    pub hit_flash: bool,
}

/// Everything that lives for one stage
#[derive(Debug, Clone)]
pub struct Stage {
    pub world: World,
    pub player: Player,
    pub weapon: Weapon,
    pub enemies: EnemyController,
    pub bullets: Vec<Bullet>,
    pub orbs: Vec<XpOrb>,
    /// World y at the top of the view
    pub camera_top: f32,
    /// The camera never scrolls above this line
    pub auto_scroll: f32,
    pub base_scroll_speed: f32,
    /// Seconds spent in the active phase
    pub stage_time: f32,
    pub combo: u32,
    pub phase: StagePhase,
    pub hit_flash: bool,
    /// Pending `EndHitFlash`, replaced on every hit
    pub hit_flash_timer: Option<TimerId>,
    pub timers: Timers,
    pub events: Vec<GameEvent>,
    pub readout: Readout,
    pub tuning: Tuning,
}

impl Stage {
    /// Generate the stage for `run.current_stage`
    pub fn new(run: &RunState, tuning: &Tuning, rng: &mut SimRng) -> Self {
        let world = generate_stage(run.current_stage, tuning, rng);
        let mut stage = Self {
            world,
            player: Player::new(),
            weapon: Weapon::new(),
            enemies: EnemyController::new(),
            bullets: Vec::new(),
            orbs: Vec::new(),
            camera_top: 0.0,
            auto_scroll: 0.0,
            base_scroll_speed: tuning.scroll_speed(run.current_stage, run.difficulty()),
            stage_time: 0.0,
            combo: 0,
            phase: StagePhase::SafeStart {
                remaining: tuning.safe_start_secs,
            },
            hit_flash: false,
            hit_flash_timer: None,
            timers: Timers::new(),
            events: Vec::new(),
            readout: Readout::default(),
            tuning: tuning.clone(),
        };
        stage.refresh_readout(run);
        stage
    }

    pub fn outcome(&self) -> Option<StageOutcome> {
        match self.phase {
            StagePhase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Cancel pending timers, stop spawns and drop transient entities
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.hit_flash_timer = None;
        self.enemies.clear();
        self.bullets.clear();
        self.orbs.clear();
    }

    /// Current auto-scroll speed including time acceleration
    pub fn scroll_speed(&self) -> f32 {
        let accel =
            (self.stage_time * self.tuning.scroll_accel_rate).min(self.tuning.scroll_accel_max);
        self.base_scroll_speed + accel
    }

    fn update_camera(&mut self, dt: f32) {
        let target = self.player.pos.y - self.tuning.camera_follow_offset;
        let t = (self.tuning.camera_lerp * 60.0 * dt).min(1.0);
        let follow = self.camera_top + (target - self.camera_top) * t;
        let max_top = (self.world.height - VIEW_HEIGHT).max(0.0);
        self.camera_top = follow.max(self.auto_scroll).clamp(0.0, max_top);
    }

    fn refresh_readout(&mut self, run: &RunState) {
        self.readout = Readout {
            hp: run.hp,
            max_hp: run.max_hp,
            hp_ratio: run.hp_ratio(),
            ammo: self.weapon.ammo,
            max_ammo: self.weapon.max_ammo,
            score: run.score,
            level: run.level,
            combo: self.combo,
            stage: run.current_stage,
            difficulty_label: run.difficulty_label(),
            hit_flash: self.hit_flash,
        };
    }

    fn handle_deferred(&mut self, run: &mut RunState, event: DeferredEvent) {
        match event {
            DeferredEvent::EndHitFlash => {
                self.hit_flash = false;
                self.hit_flash_timer = None;
            }
            DeferredEvent::AdvanceStage => {
                run.current_stage += 1;
                self.phase = StagePhase::Finished(StageOutcome::Cleared);
                self.teardown();
            }
            DeferredEvent::GameOver => {
                self.phase = StagePhase::Finished(StageOutcome::GameOver);
                self.teardown();
            }
        }
    }
}

/// Advance a stage by `dt` seconds
pub fn tick(stage: &mut Stage, run: &mut RunState, rng: &mut SimRng, input: &TickInput, dt: f32) {
    if matches!(stage.phase, StagePhase::Finished(_)) {
        return;
    }

    let input = if input.idle_mode {
        autopilot(stage)
    } else {
        *input
    };

    for event in stage.timers.advance(dt) {
        stage.handle_deferred(run, event);
    }

    match stage.phase {
        StagePhase::Active => {}
        StagePhase::SafeStart { remaining } => {
            stage.player.grounded = stage.player.step(dt, 0, run, &stage.world).platform;
            stage.update_camera(dt);
            let remaining = remaining - dt;
            if remaining <= 0.0 {
                stage.phase = StagePhase::Active;
                stage.enemies.populate(&stage.world, run, &stage.tuning, rng);
            } else {
                stage.phase = StagePhase::SafeStart { remaining };
            }
            stage.refresh_readout(run);
            return;
        }
        StagePhase::StageClear | StagePhase::Dead | StagePhase::Finished(_) => {
            stage.refresh_readout(run);
            return;
        }
    }

    // 1. Auto-scroll
    stage.stage_time += dt;
    stage.auto_scroll += stage.scroll_speed() * dt;

    // 2. Physics
    let was_grounded = stage.player.grounded;
    let landing = stage.player.step(dt, input.move_axis, run, &stage.world);
    stage.player.grounded = landing.platform;
    if landing.platform && !was_grounded {
        if stage.weapon.reload() {
            stage.events.push(GameEvent::Reloaded);
        }
        stage.combo = 0;
    }
    stage.player.invincible = (stage.player.invincible - dt).max(0.0);
    stage.enemies.integrate(dt);
    update_bullets(&mut stage.bullets, dt, stage.camera_top, &stage.tuning);
    let radius = magnet_radius(run, &stage.tuning);
    update_orbs(&mut stage.orbs, dt, stage.player.pos, radius, &stage.tuning);
    stage.update_camera(dt);

    // 3. Enemy AI and spawns
    stage.enemies.update(
        dt,
        stage.player.pos,
        stage.camera_top,
        stage.world.height,
        run,
        &stage.tuning,
        rng,
    );

    // 4. Weapon
    let trigger = input.fire_just_pressed || input.fire_held;
    let shots = stage.weapon.update(
        dt,
        trigger,
        &mut stage.player,
        run,
        &stage.tuning,
        &mut stage.bullets,
    );
    if shots > 0 {
        stage.events.push(GameEvent::Fired { shots });
    }

    // 5. Contacts
    combat::resolve(stage, run, rng, Contacts { on_spike: landing.spike });

    // 6. Behind the auto-scroll edge for too long
    if !stage.phase.is_latched() {
        if stage.player.pos.y < stage.camera_top {
            stage.player.offscreen_time += dt;
            if stage.player.offscreen_time > stage.tuning.offscreen_grace_secs {
                log::debug!("Player left behind the scroll line");
                combat::resolve_death(stage, run);
            }
        } else {
            stage.player.offscreen_time = 0.0;
        }
    }

    // 7. Read-outs
    stage.refresh_readout(run);
}

/// Demo-mode input: drift toward the next safe platform, shoot what is below
fn autopilot(stage: &Stage) -> TickInput {
    let player = &stage.player;
    let feet = player.bottom();

    let threat_below = stage.enemies.enemies.iter().any(|e| {
        let dy = e.pos.y - player.pos.y;
        dy > 0.0 && dy < 260.0 && (e.pos.x - player.pos.x).abs() < 40.0
    });
    let spike_below = stage.world.spikes.iter().find(|s| {
        let dy = s.top() - feet;
        dy > 0.0 && dy < 160.0 && (s.pos.x - player.pos.x).abs() < (s.size.x + PLAYER_WIDTH) * 0.5
    });

    let target_x = if let Some(spike) = spike_below {
        // Step off the side with more room
        if spike.pos.x > WORLD_WIDTH * 0.5 {
            spike.pos.x - spike.size.x
        } else {
            spike.pos.x + spike.size.x
        }
    } else if stage.world.height - player.pos.y < 600.0 {
        stage.world.goal.center.x
    } else {
        stage
            .world
            .platforms
            .iter()
            .filter(|p| p.top() >= feet)
            .min_by(|a, b| a.top().total_cmp(&b.top()))
            .map_or(player.pos.x, |p| p.pos.x)
    };

    let dx = target_x - player.pos.x;
    let move_axis = if dx.abs() < 8.0 { 0 } else if dx > 0.0 { 1 } else { -1 };

    // Recoil lifts the player, so only shoot with headroom below the camera top
    let headroom = player.pos.y - stage.camera_top > 250.0;
    TickInput {
        move_axis,
        fire_held: false,
        fire_just_pressed: threat_below && headroom,
        idle_mode: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rand::SeedableRng;

    fn setup(seed: u64, tuning: Tuning) -> (Stage, RunState, SimRng) {
        let mut rng = SimRng::seed_from_u64(seed);
        let run = RunState::default();
        let stage = Stage::new(&run, &tuning, &mut rng);
        (stage, run, rng)
    }

    fn run_for(
        stage: &mut Stage,
        run: &mut RunState,
        rng: &mut SimRng,
        input: &TickInput,
        secs: f32,
    ) {
        let steps = (secs / SIM_DT).ceil() as u32;
        for _ in 0..steps {
            tick(stage, run, rng, input, SIM_DT);
        }
    }

    #[test]
    fn test_safe_start_then_population() {
        let (mut stage, mut run, mut rng) = setup(1, Tuning::default());
        let idle = TickInput::default();

        run_for(&mut stage, &mut run, &mut rng, &idle, 1.0);
        assert!(matches!(stage.phase, StagePhase::SafeStart { .. }));
        assert!(stage.enemies.enemies.is_empty());
        assert_eq!(stage.auto_scroll, 0.0);
        assert!(stage.player.grounded, "player settles on the start platform");

        run_for(&mut stage, &mut run, &mut rng, &idle, 2.1);
        assert_eq!(stage.phase, StagePhase::Active);
        // At least the tier-0 hunters
        assert!(stage.enemies.enemies.len() >= 2);
        assert!(stage.enemies.spawning);
    }

    #[test]
    fn test_auto_scroll_bounds_camera() {
        let tuning = Tuning { safe_start_secs: 0.0, ..Tuning::default() };
        let (mut stage, mut run, mut rng) = setup(2, tuning);
        run_for(&mut stage, &mut run, &mut rng, &TickInput::default(), 2.0);
        assert!(stage.auto_scroll > 0.0);
        assert!(stage.camera_top >= stage.auto_scroll);
        assert!(stage.scroll_speed() > stage.base_scroll_speed);
    }

    #[test]
    fn test_landing_reloads_and_resets_combo() {
        let tuning = Tuning { safe_start_secs: 0.0, ..Tuning::default() };
        let (mut stage, mut run, mut rng) = setup(3, tuning);
        tick(&mut stage, &mut run, &mut rng, &TickInput::default(), SIM_DT);
        stage.player.pos = Vec2::new(200.0, 60.0);
        stage.player.vel = Vec2::ZERO;
        stage.player.grounded = false;
        stage.weapon.ammo = 0;
        stage.combo = 3;

        run_for(&mut stage, &mut run, &mut rng, &TickInput::default(), 0.5);
        assert!(stage.player.grounded);
        assert_eq!(stage.weapon.ammo, MAX_AMMO);
        assert_eq!(stage.combo, 0);
        assert!(stage.drain_events().contains(&GameEvent::Reloaded));
    }

    #[test]
    fn test_fire_spawns_bullet_and_recoils() {
        let tuning = Tuning { safe_start_secs: 0.0, ..Tuning::default() };
        let (mut stage, mut run, mut rng) = setup(4, tuning);
        tick(&mut stage, &mut run, &mut rng, &TickInput::default(), SIM_DT);
        let fire = TickInput { fire_just_pressed: true, ..Default::default() };
        tick(&mut stage, &mut run, &mut rng, &fire, SIM_DT);
        assert_eq!(stage.weapon.ammo, MAX_AMMO - 1);
        assert_eq!(stage.readout.ammo, MAX_AMMO - 1);
        assert!(stage.player.vel.y < 0.0);
        assert!(stage.events.contains(&GameEvent::Fired { shots: 1 }));
    }

    #[test]
    fn test_goal_clears_and_advances_stage() {
        let tuning = Tuning { safe_start_secs: 0.0, ..Tuning::default() };
        let (mut stage, mut run, mut rng) = setup(5, tuning);
        tick(&mut stage, &mut run, &mut rng, &TickInput::default(), SIM_DT);
        stage.enemies.clear();
        stage.player.pos = stage.world.goal.center;

        tick(&mut stage, &mut run, &mut rng, &TickInput::default(), SIM_DT);
        assert_eq!(stage.phase, StagePhase::StageClear);
        assert_eq!(run.current_stage, 1);

        run_for(&mut stage, &mut run, &mut rng, &TickInput::default(), 1.1);
        assert_eq!(stage.outcome(), Some(StageOutcome::Cleared));
        assert_eq!(run.current_stage, 2);
        assert!(stage.timers.is_empty());
    }

    #[test]
    fn test_left_behind_scroll_dies_after_grace() {
        let tuning = Tuning {
            safe_start_secs: 0.0,
            offscreen_grace_secs: 0.05,
            ..Tuning::default()
        };
        let (mut stage, mut run, mut rng) = setup(6, tuning);
        tick(&mut stage, &mut run, &mut rng, &TickInput::default(), SIM_DT);
        stage.enemies.clear();
        stage.auto_scroll = 3000.0;
        stage.player.pos = Vec2::new(200.0, 500.0);

        run_for(&mut stage, &mut run, &mut rng, &TickInput::default(), 0.1);
        assert_eq!(stage.phase, StagePhase::Dead);
        assert!(stage.events.contains(&GameEvent::PlayerDied));

        // Latched: nothing moves until game over fires
        let frozen_at = stage.player.pos;
        run_for(&mut stage, &mut run, &mut rng, &TickInput::default(), 0.9);
        assert_eq!(stage.player.pos, frozen_at);
        assert_eq!(stage.outcome(), Some(StageOutcome::GameOver));
        assert!(stage.enemies.enemies.is_empty());
        assert!(!stage.enemies.spawning);
    }

    #[test]
    fn test_finished_stage_ignores_ticks() {
        let (mut stage, mut run, mut rng) = setup(7, Tuning::default());
        stage.phase = StagePhase::Finished(StageOutcome::GameOver);
        let before = stage.player.pos;
        run_for(&mut stage, &mut run, &mut rng, &TickInput::default(), 1.0);
        assert_eq!(stage.player.pos, before);
    }

    #[test]
    fn test_determinism() {
        // Same seed and inputs give identical runs
        let (mut stage1, mut run1, mut rng1) = setup(99999, Tuning::default());
        let (mut stage2, mut run2, mut rng2) = setup(99999, Tuning::default());

        let idle = TickInput { idle_mode: true, ..Default::default() };
        for _ in 0..3000 {
            tick(&mut stage1, &mut run1, &mut rng1, &idle, SIM_DT);
            tick(&mut stage2, &mut run2, &mut rng2, &idle, SIM_DT);
        }

        assert_eq!(run1, run2);
        assert_eq!(stage1.player.pos, stage2.player.pos);
        assert_eq!(stage1.enemies.enemies.len(), stage2.enemies.enemies.len());
        assert_eq!(stage1.events, stage2.events);
        assert_eq!(stage1.phase, stage2.phase);
    }
}
