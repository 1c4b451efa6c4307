//! Seeded creature generator for populating record stores.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::IoError;
use crate::record::{Rarity, Record};
use crate::store::RecordStore;

const PREFIXES: [&str; 10] = [
    "Ashen", "Gloom", "Frost", "Ember", "Hollow", "Iron", "Mire", "Storm", "Thorn", "Void",
];
const SPECIES: [&str; 10] = [
    "Imp", "Wraith", "Golem", "Drake", "Ghoul", "Basilisk", "Harpy", "Shade", "Troll", "Wyrm",
];
const KINDS: [&str; 6] = ["Demonic", "Devilkin", "Dragon", "Elemental", "Undead", "Fey"];

/// Relative frequency of each tier, in [`Rarity::ALL`] order.
const RARITY_WEIGHTS: [f64; 5] = [0.48, 0.26, 0.14, 0.08, 0.04];

/// Produces synthetic creature records.
///
/// Rarity is drawn from a skewed distribution; level and the three numeric
/// attributes grow with the tier, plus uniform noise, so tiers are
/// learnable but overlap at the edges.
#[derive(Debug, Clone)]
pub struct CreatureGenerator {
    rng: ChaCha8Rng,
}

impl CreatureGenerator {
    /// Create a generator from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn draw_rarity(&mut self) -> Rarity {
        let total: f64 = RARITY_WEIGHTS.iter().sum();
        let mut threshold = self.rng.gen_range(0.0..total);
        for (rarity, &w) in Rarity::ALL.iter().zip(&RARITY_WEIGHTS) {
            if threshold < w {
                return *rarity;
            }
            threshold -= w;
        }
        Rarity::Legendary
    }

    /// Generate one creature stamped with `timestamp`.
    pub fn creature(&mut self, timestamp: &str) -> Record {
        let rarity = self.draw_rarity();
        let rank = rarity.rank() as u32;

        let level = 1 + rank * 4 + self.rng.gen_range(0..6);
        let scale = f64::from(level);
        let mut attribute = |per_level: f64| -> f64 {
            let noise: f64 = self.rng.gen_range(0.85..1.15);
            (per_level * scale * noise * 100.0).round() / 100.0
        };
        let health = attribute(10.0 + f64::from(rank) * 2.0);
        let energy = attribute(8.0 + f64::from(rank) * 2.5);
        let sanity = attribute(6.0 + f64::from(rank) * 3.0);

        let dice = self.rng.gen_range(1..=rank + 2);
        let sides = [4, 6, 8, 10, 12][self.rng.gen_range(0..5)];
        let name = format!(
            "{} {}",
            PREFIXES[self.rng.gen_range(0..PREFIXES.len())],
            SPECIES[self.rng.gen_range(0..SPECIES.len())]
        );
        let kind = KINDS[self.rng.gen_range(0..KINDS.len())].to_string();

        Record {
            name,
            kind,
            level,
            rarity: rarity.as_str().to_string(),
            damage: format!("{dice}d{sides}"),
            health,
            energy,
            sanity,
            timestamp: timestamp.to_string(),
        }
    }

    /// Generate `amount` creatures stamped with the current local time.
    pub fn generate(&mut self, amount: usize) -> Vec<Record> {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        (0..amount).map(|_| self.creature(&now)).collect()
    }
}

/// Insert `amount` freshly generated creatures into `store`.
///
/// Returns the store's acknowledgement.
///
/// # Errors
///
/// Propagates the store's insert error.
#[instrument(skip(store, generator))]
pub fn seed_store<S: RecordStore + ?Sized>(
    store: &mut S,
    generator: &mut CreatureGenerator,
    amount: usize,
) -> Result<bool, IoError> {
    let records = generator.generate(amount);
    let acknowledged = store.insert_many(&records)?;
    info!(amount, acknowledged, "store seeded");
    Ok(acknowledged)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn same_seed_same_creatures() {
        let a: Vec<Record> = (0..20)
            .map({
                let mut g = CreatureGenerator::new(5);
                move |_| g.creature("t")
            })
            .collect();
        let b: Vec<Record> = (0..20)
            .map({
                let mut g = CreatureGenerator::new(5);
                move |_| g.creature("t")
            })
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn rarity_distribution_is_skewed() {
        let mut g = CreatureGenerator::new(42);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..2000 {
            *counts.entry(g.creature("t").rarity).or_insert(0) += 1;
        }
        let common = counts.get("Common").copied().unwrap_or(0);
        let legendary = counts.get("Legendary").copied().unwrap_or(0);
        assert!(common > legendary * 5, "common {common}, legendary {legendary}");
        assert!(legendary > 0);
    }

    #[test]
    fn attributes_are_positive_and_level_tracks_tier() {
        let mut g = CreatureGenerator::new(9);
        for _ in 0..200 {
            let r = g.creature("t");
            assert!(r.health > 0.0 && r.energy > 0.0 && r.sanity > 0.0);
            if r.rarity == "Legendary" {
                assert!(r.level >= 17, "legendary level {}", r.level);
            }
            if r.rarity == "Common" {
                assert!(r.level <= 6, "common level {}", r.level);
            }
        }
    }

    #[test]
    fn seed_store_inserts_amount() {
        let mut store = MemoryStore::new();
        let mut g = CreatureGenerator::new(1);
        assert!(seed_store(&mut store, &mut g, 25).unwrap());
        assert_eq!(store.count().unwrap(), 25);
    }
}
