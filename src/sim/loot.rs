//! Weighted item offers after a stage clear

use rand::Rng;

use super::items::{self, Effect, Item, Rarity};
use super::state::{RunState, SimRng};

/// Offers shown on the item-select screen
pub const OFFER_COUNT: usize = 3;

/// Luck bonus used to skew rarity weights
pub fn luck_bonus(run: &RunState) -> f64 {
    run.luck as f64 + 10.0 * run.sum_effect(Effect::RarityUp) + run.sum_effect(Effect::LuckUp)
}

/// Per-tier weights in `Rarity::ALL` order. Every non-common tier gains half
/// the luck bonus; all weights are floored at 1.
pub fn rarity_weights(luck_bonus: f64) -> [f64; 5] {
    Rarity::ALL.map(|rarity| {
        let mut w = rarity.base_weight();
        if rarity != Rarity::Common {
            w += luck_bonus * 0.5;
        }
        w.max(1.0)
    })
}

/// Pick a tier: first tier whose cumulative weight reaches the roll
fn pick_rarity(weights: &[f64; 5], rng: &mut SimRng) -> Rarity {
    let total: f64 = weights.iter().sum();
    let roll = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (rarity, w) in Rarity::ALL.iter().zip(weights) {
        cumulative += w;
        if roll <= cumulative {
            return *rarity;
        }
    }
    Rarity::Common
}

/// Roll `n` independent offers (duplicates possible)
pub fn roll_offers(run: &RunState, n: usize, rng: &mut SimRng) -> Vec<Item> {
    let weights = rarity_weights(luck_bonus(run));
    let mut offers = Vec::with_capacity(n);
    while offers.len() < n {
        let rarity = pick_rarity(&weights, rng);
        let pool: Vec<&Item> = items::by_rarity(rarity).collect();
        if pool.is_empty() {
            continue;
        }
        let index = rng.random_range(0..pool.len());
        offers.push(*pool[index]);
    }
    offers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::items::find;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn test_roll_returns_exact_count() {
        let mut rng = SimRng::seed_from_u64(7);
        let run = RunState::default();
        for n in 0..10 {
            assert_eq!(roll_offers(&run, n, &mut rng).len(), n);
        }
    }

    #[test]
    fn test_base_weights() {
        assert_eq!(rarity_weights(0.0), [50.0, 30.0, 13.0, 5.0, 2.0]);
        assert_eq!(rarity_weights(4.0), [50.0, 32.0, 15.0, 7.0, 4.0]);
        // Negative luck cannot push a tier below 1
        assert_eq!(rarity_weights(-100.0)[4], 1.0);
    }

    #[test]
    fn test_luck_bonus_sources() {
        let mut run = RunState::default();
        run.luck = 2;
        run.add_item(*find(21).unwrap()); // rarityUp 1 → +10
        run.add_item(*find(6).unwrap()); // luckUp 2
        assert_eq!(luck_bonus(&run), 14.0);
    }

    #[test]
    fn test_luck_shifts_mass_off_common() {
        let common_share = |bonus: f64| {
            let w = rarity_weights(bonus);
            w[0] / w.iter().sum::<f64>()
        };
        let mut previous = common_share(0.0);
        for bonus in 1..50 {
            let share = common_share(bonus as f64);
            assert!(share < previous, "bonus {} did not lower common share", bonus);
            previous = share;
        }
    }

    #[test]
    fn test_large_sample_tracks_weights() {
        let mut rng = SimRng::seed_from_u64(42);
        let run = RunState::default();
        let offers = roll_offers(&run, 20_000, &mut rng);
        let commons = offers.iter().filter(|i| i.rarity == Rarity::Common).count();
        let share = commons as f64 / offers.len() as f64;
        assert!((share - 0.5).abs() < 0.03, "common share {}", share);
    }

    #[test]
    fn test_same_seed_same_offers() {
        let run = RunState::default();
        let a = roll_offers(&run, 3, &mut SimRng::seed_from_u64(9));
        let b = roll_offers(&run, 3, &mut SimRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    proptest! {
        #[test]
        fn prop_offer_count_is_exact(seed in any::<u64>(), n in 0usize..12, luck in 0u32..40) {
            let mut run = RunState::default();
            run.luck = luck;
            let offers = roll_offers(&run, n, &mut SimRng::seed_from_u64(seed));
            prop_assert_eq!(offers.len(), n);
            prop_assert!(offers.iter().all(|i| find(i.id).is_some()));
        }
    }
}
