//! Screen flow: Menu → Playing → ItemSelect → Playing … → GameOver
//!
//! `Game` owns everything that outlives a single stage (run state, the session
//! RNG, tuning and the item collection). Only the `Playing` variant holds a
//! live [`Stage`]; every other screen is inert data for the presentation layer.

use rand::SeedableRng;
use serde::Serialize;

use crate::collection::Collection;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{
    GameEvent, GameMode, Item, OFFER_COUNT, RunState, SimRng, Stage, StageOutcome, TickInput,
    roll_offers, tick,
};
use crate::tuning::Tuning;

/// What the game-over screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub mode: GameMode,
    pub stage_reached: u32,
    pub level: u32,
    pub score: u64,
    pub difficulty_label: &'static str,
    pub items_held: usize,
}

impl RunSummary {
    fn capture(run: &RunState) -> Self {
        Self {
            mode: run.mode,
            stage_reached: run.current_stage,
            level: run.level,
            score: run.score,
            difficulty_label: run.difficulty_label(),
            items_held: run.items.len(),
        }
    }
}

#[derive(Debug)]
pub enum Screen {
    Menu,
    Playing(Box<Stage>),
    ItemSelect { offers: Vec<Item> },
    GameOver(RunSummary),
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Menu => "menu",
            Screen::Playing(_) => "playing",
            Screen::ItemSelect { .. } => "item select",
            Screen::GameOver(_) => "game over",
        }
    }
}

/// One play session
#[derive(Debug)]
pub struct Game {
    pub screen: Screen,
    pub run: RunState,
    pub rng: SimRng,
    pub tuning: Tuning,
    pub collection: Collection,
    /// Events gathered across stages until drained
    events: Vec<GameEvent>,
    accumulator: f32,
    /// Fire press waiting for the next substep
    pending_fire: bool,
}

impl Game {
    pub fn new(seed: u64, tuning: Tuning, collection: Collection) -> Self {
        Self {
            screen: Screen::Menu,
            run: RunState::default(),
            rng: SimRng::seed_from_u64(seed),
            tuning,
            collection,
            events: Vec::new(),
            accumulator: 0.0,
            pending_fire: false,
        }
    }

    /// Menu → Playing. Always a full reset, whatever the previous mode.
    pub fn start(&mut self, mode: GameMode) {
        log::info!("Starting {} run", mode.as_str());
        self.run = RunState::new(mode);
        self.begin_stage();
    }

    /// GameOver → Playing. The mode reset was applied when death was confirmed.
    pub fn retry(&mut self) -> bool {
        if !matches!(self.screen, Screen::GameOver(_)) {
            return false;
        }
        self.begin_stage();
        true
    }

    /// Any screen → Menu, applying the mode reset policy
    pub fn return_to_title(&mut self) {
        if let Screen::Playing(stage) = &mut self.screen {
            stage.teardown();
        }
        if !matches!(self.screen, Screen::GameOver(_) | Screen::Menu) {
            // Death already reset the run on the way into GameOver
            self.run.reset_after_death();
        }
        self.screen = Screen::Menu;
        self.accumulator = 0.0;
        self.pending_fire = false;
    }

    /// ItemSelect → Playing. Returns the chosen item, or `None` if `index` is
    /// not an offer on screen.
    pub fn choose_item(&mut self, index: usize) -> Option<Item> {
        let Screen::ItemSelect { offers } = &self.screen else {
            return None;
        };
        let item = *offers.get(index)?;
        self.run.add_item(item);
        if self.collection.mark_seen(item.id) {
            log::debug!("New collection entry: {}", item.name);
        }
        self.begin_stage();
        Some(item)
    }

    /// Advance one simulation step. A no-op outside `Playing`.
    pub fn update(&mut self, input: &TickInput, dt: f32) {
        let Screen::Playing(stage) = &mut self.screen else {
            return;
        };
        tick(stage, &mut self.run, &mut self.rng, input, dt);
        self.events.extend(stage.drain_events());

        match stage.outcome() {
            Some(StageOutcome::Cleared) => {
                let offers = roll_offers(&self.run, OFFER_COUNT, &mut self.rng);
                log::debug!(
                    "Offering {:?}",
                    offers.iter().map(|i| i.name).collect::<Vec<_>>()
                );
                self.screen = Screen::ItemSelect { offers };
            }
            Some(StageOutcome::GameOver) => {
                let summary = RunSummary::capture(&self.run);
                log::info!(
                    "Game over: stage {} level {} score {} ({})",
                    summary.stage_reached,
                    summary.level,
                    summary.score,
                    summary.mode.as_str()
                );
                self.run.reset_after_death();
                self.screen = Screen::GameOver(summary);
            }
            None => {}
        }
    }

    /// Fixed-timestep driver for one rendered frame. A fire press is held
    /// until a substep consumes it, even across frames that run none.
    pub fn frame(&mut self, input: &TickInput, frame_dt: f32) {
        self.accumulator += frame_dt.min(0.1);
        self.pending_fire |= input.fire_just_pressed;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let step_input = TickInput {
                fire_just_pressed: self.pending_fire,
                ..*input
            };
            self.update(&step_input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.pending_fire = false;
        }
    }

    pub fn stage(&self) -> Option<&Stage> {
        match &self.screen {
            Screen::Playing(stage) => Some(stage.as_ref()),
            _ => None,
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn begin_stage(&mut self) {
        let stage = Stage::new(&self.run, &self.tuning, &mut self.rng);
        self.screen = Screen::Playing(Box::new(stage));
        self.accumulator = 0.0;
        self.pending_fire = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MAX_AMMO;
    use crate::sim::StagePhase;
    use crate::sim::items::find;

    fn quick_tuning() -> Tuning {
        Tuning {
            safe_start_secs: 0.0,
            offscreen_grace_secs: 0.05,
            ..Tuning::default()
        }
    }

    fn step(game: &mut Game, secs: f32) {
        let steps = (secs / SIM_DT).ceil() as u32;
        for _ in 0..steps {
            game.update(&TickInput::default(), SIM_DT);
        }
    }

    fn stage_mut(game: &mut Game) -> &mut Stage {
        match &mut game.screen {
            Screen::Playing(stage) => stage.as_mut(),
            other => panic!("expected playing, got {}", other.name()),
        }
    }

    fn clear_stage(game: &mut Game) {
        step(game, SIM_DT);
        let stage = stage_mut(game);
        stage.enemies.clear();
        stage.player.pos = stage.world.goal.center;
        step(game, 1.2);
    }

    fn die(game: &mut Game) {
        step(game, SIM_DT);
        let stage = stage_mut(game);
        stage.enemies.clear();
        stage.auto_scroll = 3000.0;
        stage.player.pos.y = 500.0;
        step(game, 1.0);
    }

    #[test]
    fn test_menu_ignores_updates() {
        let mut game = Game::new(1, Tuning::default(), Collection::memory());
        step(&mut game, 1.0);
        assert!(matches!(game.screen, Screen::Menu));
        assert!(game.stage().is_none());
    }

    #[test]
    fn test_start_is_full_reset() {
        let mut game = Game::new(1, Tuning::default(), Collection::memory());
        game.run.level = 9;
        game.run.score = 5000;
        game.start(GameMode::Hard);
        assert_eq!(game.run, RunState::new(GameMode::Hard));
        assert!(matches!(
            game.stage().map(|s| s.phase),
            Some(StagePhase::SafeStart { .. })
        ));
    }

    #[test]
    fn test_clear_offers_then_choice_starts_next_stage() {
        let mut game = Game::new(2, quick_tuning(), Collection::memory());
        game.start(GameMode::Normal);
        clear_stage(&mut game);

        let Screen::ItemSelect { offers } = &game.screen else {
            panic!("expected item select, got {}", game.screen.name());
        };
        assert_eq!(offers.len(), OFFER_COUNT);
        let expected = offers[1];

        assert!(game.choose_item(7).is_none());
        let chosen = game.choose_item(1);
        assert_eq!(chosen, Some(expected));
        assert_eq!(game.run.items, vec![expected]);
        assert!(game.collection.contains(expected.id));
        assert_eq!(game.run.current_stage, 2);
        assert_eq!(game.stage().map(|s| s.world.height), Some(5500.0));
        assert!(game.drain_events().contains(&GameEvent::StageCleared));
    }

    #[test]
    fn test_normal_death_keeps_progression() {
        let mut game = Game::new(3, quick_tuning(), Collection::memory());
        game.start(GameMode::Normal);
        game.run.level = 4;
        game.run.score = 900;
        game.run.add_item(*find(3).unwrap());
        die(&mut game);

        let Screen::GameOver(summary) = &game.screen else {
            panic!("expected game over, got {}", game.screen.name());
        };
        assert_eq!(summary.level, 4);
        assert_eq!(summary.items_held, 1);
        assert_eq!(game.run.level, 4);
        assert_eq!(game.run.score, 900);
        assert!(game.run.items.is_empty());

        assert!(game.retry());
        assert!(game.stage().is_some());
        assert_eq!(game.run.level, 4);
    }

    #[test]
    fn test_hard_death_wipes_progression() {
        let mut game = Game::new(4, quick_tuning(), Collection::memory());
        game.start(GameMode::Hard);
        game.run.level = 6;
        game.run.score = 1200;
        die(&mut game);

        assert!(matches!(game.screen, Screen::GameOver(_)));
        assert_eq!(game.run, RunState::new(GameMode::Hard));
    }

    #[test]
    fn test_quit_to_title_applies_reset_policy() {
        let mut game = Game::new(5, Tuning::default(), Collection::memory());
        game.start(GameMode::Normal);
        game.run.level = 3;
        game.run.current_stage = 4;
        game.return_to_title();

        assert!(matches!(game.screen, Screen::Menu));
        assert_eq!(game.run.level, 3);
        assert_eq!(game.run.current_stage, 1);
        assert!(!game.retry());
    }

    #[test]
    fn test_frame_caps_substeps() {
        let mut game = Game::new(6, Tuning::default(), Collection::memory());
        game.start(GameMode::Normal);
        game.frame(&TickInput::default(), 1.0);
        let Some(StagePhase::SafeStart { remaining }) = game.stage().map(|s| s.phase) else {
            panic!("still in safe start");
        };
        let elapsed = game.tuning.safe_start_secs - remaining;
        assert!((elapsed - MAX_SUBSTEPS as f32 * SIM_DT).abs() < 1e-4);
    }

    #[test]
    fn test_fire_press_survives_short_frames() {
        let mut game = Game::new(7, quick_tuning(), Collection::memory());
        game.start(GameMode::Normal);
        step(&mut game, SIM_DT);
        game.drain_events();

        let press = TickInput {
            fire_just_pressed: true,
            ..Default::default()
        };
        let frame_dt = 1.0 / 144.0;
        game.frame(&press, frame_dt);
        for _ in 0..10 {
            game.frame(&TickInput::default(), frame_dt);
        }

        let fired = game
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Fired { .. }))
            .count();
        assert_eq!(fired, 1);
        assert_eq!(game.stage().map(|s| s.weapon.ammo), Some(MAX_AMMO - 1));
    }
}
