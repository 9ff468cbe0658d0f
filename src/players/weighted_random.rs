use rand::distributions::{Distribution, WeightedIndex};
use rand_xorshift::XorShiftRng;
use std::sync::Mutex;

use super::{lock_rng, seeded_rng, DecisionStrategy};
use crate::rules::RulesEngine;

/// Random pick that favours the actions the engine weighs higher
/// (for the bundled rules: cities, then settlements, then development cards).
pub struct WeightedRandomStrategy {
    rng: Mutex<XorShiftRng>,
}

impl WeightedRandomStrategy {
    pub fn new() -> Self {
        Self::with_seed(None)
    }

    pub fn with_seed(seed: Option<u64>) -> Self {
        WeightedRandomStrategy {
            rng: Mutex::new(seeded_rng(seed)),
        }
    }
}

impl Default for WeightedRandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RulesEngine> DecisionStrategy<E> for WeightedRandomStrategy {
    fn name(&self) -> &str {
        "weighted_random"
    }

    fn decide(&self, engine: &E, _state: &E::State, legal_actions: &[E::Action]) -> Option<usize> {
        if legal_actions.len() == 1 {
            return Some(0);
        }

        // All-zero weights (or no actions) leave the choice to the caller
        let weights: Vec<u32> = legal_actions
            .iter()
            .map(|action| engine.action_weight(action))
            .collect();
        let distribution = WeightedIndex::new(&weights).ok()?;
        Some(distribution.sample(&mut *lock_rng(&self.rng)))
    }
}
