//! Item catalog
//!
//! Static templates only. Picking an item copies the template into the run's
//! item list; the catalog is never mutated.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::UnknownItem;

/// Rarity tiers, ordered common → legendary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];

    /// Base loot weight before luck
    pub fn base_weight(self) -> f64 {
        match self {
            Rarity::Common => 50.0,
            Rarity::Uncommon => 30.0,
            Rarity::Rare => 13.0,
            Rarity::Epic => 5.0,
            Rarity::Legendary => 2.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// Closed set of item effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Effect {
    Heal,
    Shield,
    SpdUp,
    AtkUp,
    XpRange,
    LuckUp,
    StageHeal,
    FallSlow,
    MaxHpUp,
    DoubleHit,
    XpBoost,
    FlameDmg,
    FreezeChance,
    Toughness,
    Berserker,
    LifeSteal,
    Reflect,
    RarityUp,
    WindWalk,
    Revive,
    FullRevive,
    TimeSlow,
    AntiGravity,
    DamageReduce,
    AtkMult,
    AllStats,
    SoulCollect,
}

/// An item template (or a copy of one held by the player)
///
/// Serializes as its catalog id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "u32")]
pub struct Item {
    pub id: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub effect: Effect,
    pub value: f64,
    pub icon: &'static str,
}

impl From<Item> for u32 {
    fn from(item: Item) -> u32 {
        item.id
    }
}

impl TryFrom<u32> for Item {
    type Error = UnknownItem;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        find(id).copied().ok_or(UnknownItem(id))
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = u32::deserialize(deserializer)?;
        Item::try_from(id).map_err(serde::de::Error::custom)
    }
}

/// Look up a catalog entry by id
pub fn find(id: u32) -> Option<&'static Item> {
    CATALOG.iter().find(|item| item.id == id)
}

/// All catalog entries of one rarity, in catalog order
pub fn by_rarity(rarity: Rarity) -> impl Iterator<Item = &'static Item> {
    CATALOG.iter().filter(move |item| item.rarity == rarity)
}

const fn item(
    id: u32,
    name: &'static str,
    description: &'static str,
    rarity: Rarity,
    effect: Effect,
    value: f64,
    icon: &'static str,
) -> Item {
    Item {
        id,
        name,
        description,
        rarity,
        effect,
        value,
        icon,
    }
}

use Effect as E;
use Rarity as R;

/// The full item catalog (30 entries)
#[rustfmt::skip]
pub static CATALOG: [Item; 30] = [
    // Common
    item(1, "Potion", "Restore 30 HP", R::Common, E::Heal, 30.0, "🧪"),
    item(2, "Shield", "Negate the next hit", R::Common, E::Shield, 1.0, "🛡️"),
    item(3, "Speed Boots", "Move speed +15%", R::Common, E::SpdUp, 0.15, "👟"),
    item(4, "Attack Charm", "Attack +5", R::Common, E::AtkUp, 5.0, "⚔️"),
    item(5, "Magnet", "XP pickup range +50%", R::Common, E::XpRange, 0.5, "🧲"),
    item(6, "Lucky Coin", "Luck +2", R::Common, E::LuckUp, 2.0, "🪙"),
    item(7, "Ring of Mending", "Heal 15 HP on stage clear", R::Common, E::StageHeal, 15.0, "💍"),
    item(8, "Light Cloak", "Fall speed -5%", R::Common, E::FallSlow, 0.05, "🧣"),
    // Uncommon
    item(9, "Iron Armor", "Max HP +25", R::Uncommon, E::MaxHpUp, 25.0, "🪖"),
    item(10, "Double Strike", "Every shot hits twice", R::Uncommon, E::DoubleHit, 2.0, "⚡"),
    item(11, "Air Brake", "Fall speed -15%", R::Uncommon, E::FallSlow, 0.15, "🪂"),
    item(12, "XP Booster", "XP gain +30%", R::Uncommon, E::XpBoost, 0.3, "📈"),
    item(13, "Flame Sword", "Attack +10 fire damage", R::Uncommon, E::FlameDmg, 10.0, "🔥"),
    item(14, "Ice Shield", "25% chance to freeze an attacker", R::Uncommon, E::FreezeChance, 0.25, "❄️"),
    item(15, "Dash Boots", "Move speed +30%", R::Uncommon, E::SpdUp, 0.30, "💨"),
    item(16, "Toughness Ring", "Max HP +35, Attack -3", R::Uncommon, E::Toughness, 35.0, "🔵"),
    // Rare
    item(17, "Berserker Axe", "Double attack at or below 50% HP", R::Rare, E::Berserker, 2.0, "🪓"),
    item(18, "Vampire Fang", "Heal 5 HP per kill", R::Rare, E::LifeSteal, 5.0, "🦷"),
    item(19, "Mirror Shield", "30% chance to reflect damage", R::Rare, E::Reflect, 0.30, "🪞"),
    item(20, "Teleport Ring", "Move speed +60%", R::Rare, E::SpdUp, 0.60, "🌀"),
    item(21, "Gold Rush", "Better item rarity", R::Rare, E::RarityUp, 1.0, "💰"),
    item(22, "Wind Walker", "Fall speed -25%, move speed +20%", R::Rare, E::WindWalk, 0.25, "🌬️"),
    // Epic
    item(23, "Phoenix Feather", "Revive once at 50% HP", R::Epic, E::Revive, 0.5, "🔥"),
    item(24, "Orb of Rebirth", "Revive once at full HP", R::Epic, E::FullRevive, 1.0, "🔮"),
    item(25, "Time Slow", "Enemy speed -35%", R::Epic, E::TimeSlow, 0.35, "⏳"),
    item(26, "Anti-Gravity Core", "Fall speed -40%", R::Epic, E::AntiGravity, 0.40, "🌌"),
    // Legendary
    item(27, "Dragon Scale", "Damage taken -50%", R::Legendary, E::DamageReduce, 0.50, "🐉"),
    item(28, "Godslayer", "Attack x3", R::Legendary, E::AtkMult, 3.0, "⚜️"),
    item(29, "Rainbow Crystal", "All stats +25%", R::Legendary, E::AllStats, 0.25, "💎"),
    item(30, "Soul Collector", "Double XP from kills", R::Legendary, E::SoulCollect, 2.0, "👻"),
];
