//! Abyss Fall headless runner
//!
//! Plays a seeded autopilot run and logs the outcome.
//!
//! Usage: `abyss-fall [seed] [max-stages] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use abyss_fall::collection::{self, Collection};
    use abyss_fall::sim::{GameMode, TickInput};
    use abyss_fall::{Game, Screen, Tuning};

    /// Rendered frame rate the driver pretends to run at
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Hard stop in case the autopilot never resolves a stage
    const MAX_FRAMES: u64 = 60 * 60 * 30;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0xAB55);
    let max_stages: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);
    let tuning = match args.next() {
        Some(path) => Tuning::from_file(&path).unwrap_or_else(|e| {
            log::warn!("Ignoring tuning file {}: {}", path, e);
            Tuning::default()
        }),
        None => Tuning::default(),
    };

    log::info!("Abyss Fall (headless) seed={} stages={}", seed, max_stages);

    let collection = Collection::load(collection::default_store());
    let mut game = Game::new(seed, tuning, collection);
    game.start(GameMode::Normal);

    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let mut frames = 0u64;
    loop {
        game.frame(&input, FRAME_DT);
        frames += 1;

        for event in game.drain_events() {
            log::trace!("{:?}", event);
        }

        match &game.screen {
            Screen::Playing(_) if frames >= MAX_FRAMES => {
                log::warn!("Stopping after {} frames without an outcome", frames);
                break;
            }
            Screen::Playing(_) | Screen::Menu => {}
            Screen::ItemSelect { .. } => {
                if game.run.current_stage > max_stages {
                    log::info!(
                        "Cleared {} stages: level {} score {}",
                        max_stages,
                        game.run.level,
                        game.run.score
                    );
                    break;
                }
                if let Some(item) = game.choose_item(0) {
                    log::info!("Took {} ({:?})", item.name, item.rarity);
                }
            }
            Screen::GameOver(summary) => {
                log::info!(
                    "Run over on stage {} ({}): level {} score {}, {} items",
                    summary.stage_reached,
                    summary.difficulty_label,
                    summary.level,
                    summary.score,
                    summary.items_held
                );
                break;
            }
        }
    }

    log::info!(
        "Collection: {} items seen{}",
        game.collection.len(),
        if game.collection.is_memory_only() {
            " (not persisted)"
        } else {
            ""
        }
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page on the web
}
