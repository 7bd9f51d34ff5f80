//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, one generator per session
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod combat;
pub mod enemy;
pub mod items;
pub mod loot;
pub mod orb;
pub mod player;
pub mod progression;
pub mod state;
pub mod stats;
pub mod tick;
pub mod timers;
pub mod weapon;
pub mod world;

pub use combat::DamageOutcome;
pub use enemy::{AiType, Enemy, EnemyController, WavePattern};
pub use items::{CATALOG, Effect, Item, Rarity};
pub use loot::{OFFER_COUNT, roll_offers};
pub use state::{GameEvent, GameMode, RunState, SimRng};
pub use tick::{Readout, Stage, StageOutcome, StagePhase, TickInput, tick};
pub use world::{Ledge, World, generate_stage};
