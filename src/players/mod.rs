// Players module - Decision strategies for automated seats
//
// This file defines the DecisionStrategy trait and re-exports the strategy implementations

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use clap::ValueEnum;
use rand::seq::SliceRandom;
use rand::Rng;
use rand::SeedableRng;
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};

use crate::rules::RulesEngine;

pub mod greedy;
pub mod mcts;
pub mod random;
pub mod weighted_random;

pub use self::greedy::GreedyStrategy;
pub use self::mcts::MctsStrategy;
pub use self::random::RandomStrategy;
pub use self::weighted_random::WeightedRandomStrategy;

// Upper bound on moves in a simulated game, so playouts always end
pub const MAX_PLAYOUT_DEPTH: usize = 1000;

/// Chooses an action for an automated seat.
pub trait DecisionStrategy<E: RulesEngine>: Send + Sync {
    /// Short label used in logs and seat summaries
    fn name(&self) -> &str;

    /// Returns a position in `legal_actions`, or `None` when the strategy has no preference.
    fn decide(&self, engine: &E, state: &E::State, legal_actions: &[E::Action]) -> Option<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Random,
    Weighted,
    Greedy,
    Mcts,
}

/// Builds the strategy used for default automated seats.
pub fn create_strategy<E: RulesEngine>(
    kind: StrategyKind,
    seed: Option<u64>,
) -> Arc<dyn DecisionStrategy<E>> {
    match kind {
        StrategyKind::Random => Arc::new(RandomStrategy::with_seed(seed)),
        StrategyKind::Weighted => Arc::new(WeightedRandomStrategy::with_seed(seed)),
        StrategyKind::Greedy => Arc::new(GreedyStrategy::with_seed(seed)),
        StrategyKind::Mcts => Arc::new(MctsStrategy::with_seed(seed)),
    }
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> XorShiftRng {
    match seed {
        Some(seed) => XorShiftRng::seed_from_u64(seed),
        None => XorShiftRng::from_entropy(),
    }
}

// A poisoned rng is still a usable rng
pub(crate) fn lock_rng(rng: &Mutex<XorShiftRng>) -> MutexGuard<'_, XorShiftRng> {
    rng.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Plays uniformly random moves from `state` and returns the winning seat, if any.
pub fn playout<E: RulesEngine, R: Rng + ?Sized>(
    engine: &E,
    mut state: E::State,
    rng: &mut R,
) -> Option<usize> {
    for _ in 0..MAX_PLAYOUT_DEPTH {
        if let Some(winner) = engine.winner(&state) {
            return Some(winner);
        }

        let actions = engine.legal_actions(&state);
        let Some(action) = actions.choose(rng) else {
            break;
        };
        if engine.apply(&mut state, action).is_err() {
            break;
        }
    }

    engine.winner(&state)
}
