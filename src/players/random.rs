use rand::Rng;
use rand_xorshift::XorShiftRng;
use std::sync::Mutex;

use super::{lock_rng, seeded_rng, DecisionStrategy};
use crate::rules::RulesEngine;

/// Picks uniformly among the legal actions.
pub struct RandomStrategy {
    rng: Mutex<XorShiftRng>,
}

impl RandomStrategy {
    pub fn new() -> Self {
        Self::with_seed(None)
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_seed(Some(seed))
    }

    pub fn with_seed(seed: Option<u64>) -> Self {
        RandomStrategy {
            rng: Mutex::new(seeded_rng(seed)),
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RulesEngine> DecisionStrategy<E> for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn decide(&self, _engine: &E, _state: &E::State, legal_actions: &[E::Action]) -> Option<usize> {
        if legal_actions.is_empty() {
            return None;
        }
        Some(lock_rng(&self.rng).gen_range(0..legal_actions.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{Color, SeatType};
    use crate::rules::{SeatDescriptor, SettlersAction, SettlersConfig, SettlersEngine};

    #[test]
    fn test_random_stays_in_range() {
        let engine = SettlersEngine::new(SettlersConfig::default());
        let state = engine.new_game(&[SeatDescriptor {
            color: Color::Red,
            name: "Bot1".to_string(),
            kind: SeatType::Automated,
        }]);
        let actions = engine.legal_actions(&state);
        let strategy = RandomStrategy::seeded(42);

        for _ in 0..100 {
            let choice = strategy.decide(&engine, &state, &actions).unwrap();
            assert!(choice < actions.len());
        }
    }

    #[test]
    fn test_random_has_no_decision_for_empty_listing() {
        let engine = SettlersEngine::default();
        let state = engine.new_game(&[]);
        let actions: Vec<SettlersAction> = Vec::new();
        let strategy = RandomStrategy::seeded(42);

        assert_eq!(strategy.decide(&engine, &state, &actions), None);
    }
}
