use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use rayon::prelude::*;
use std::sync::Mutex;
use std::time::Instant;

use super::{lock_rng, playout, seeded_rng, DecisionStrategy};
use crate::rules::RulesEngine;

const SIMULATIONS_PER_ACTION: usize = 3;

/// Greedy Monte Carlo strategy
/// Evaluates each action by running random playouts and choosing the one with the highest win rate.
/// Has no preference when none of the playouts is won by the deciding seat.
pub struct GreedyStrategy {
    num_simulations_per_action: usize,
    use_parallel: bool,
    rng: Mutex<XorShiftRng>,
}

impl GreedyStrategy {
    pub fn new() -> Self {
        Self::with_seed(None)
    }

    pub fn with_seed(seed: Option<u64>) -> Self {
        Self::with_parameters(SIMULATIONS_PER_ACTION, seed)
    }

    pub fn with_simulations(num_simulations_per_action: usize) -> Self {
        Self::with_parameters(num_simulations_per_action, None)
    }

    pub fn with_parameters(num_simulations_per_action: usize, seed: Option<u64>) -> Self {
        GreedyStrategy {
            num_simulations_per_action,
            use_parallel: true,
            rng: Mutex::new(seeded_rng(seed)),
        }
    }

    pub fn sequential(mut self) -> Self {
        self.use_parallel = false;
        self
    }

    fn win_rate<E: RulesEngine>(
        &self,
        engine: &E,
        state: &E::State,
        action: &E::Action,
        seat: usize,
        playout_seed: u64,
    ) -> f64 {
        if self.num_simulations_per_action == 0 {
            return 0.0;
        }

        let mut after = state.clone();
        if engine.apply(&mut after, action).is_err() {
            return 0.0;
        }

        let mut rng = XorShiftRng::seed_from_u64(playout_seed);
        let wins = (0..self.num_simulations_per_action)
            .filter(|_| playout(engine, after.clone(), &mut rng) == Some(seat))
            .count();
        wins as f64 / self.num_simulations_per_action as f64
    }
}

impl Default for GreedyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: RulesEngine> DecisionStrategy<E> for GreedyStrategy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn decide(&self, engine: &E, state: &E::State, legal_actions: &[E::Action]) -> Option<usize> {
        if legal_actions.len() == 1 {
            return Some(0);
        }

        let start = Instant::now();
        let seat = engine.current_seat_index(state);
        // One draw per decision; each action's playouts get their own stream so
        // parallel evaluation gives the same rates as sequential
        let base_seed: u64 = lock_rng(&self.rng).gen();
        let seed_for = |index: usize| base_seed.wrapping_add(index as u64);

        let win_rates: Vec<f64> = if self.use_parallel {
            legal_actions
                .par_iter()
                .enumerate()
                .map(|(index, action)| self.win_rate(engine, state, action, seat, seed_for(index)))
                .collect()
        } else {
            legal_actions
                .iter()
                .enumerate()
                .map(|(index, action)| self.win_rate(engine, state, action, seat, seed_for(index)))
                .collect()
        };

        // First action with the strictly highest rate wins ties
        let mut best: Option<(usize, f64)> = None;
        for (index, &rate) in win_rates.iter().enumerate() {
            if rate > best.map_or(0.0, |(_, best_rate)| best_rate) {
                best = Some((index, rate));
            }
        }

        log::debug!(
            "Greedy took {:?} to evaluate {} actions for seat {} (best win rate {:.2}%)",
            start.elapsed(),
            legal_actions.len(),
            seat,
            best.map_or(0.0, |(_, rate)| rate * 100.0)
        );

        best.map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{SeatType, COLORS};
    use crate::rules::{SeatDescriptor, SettlersConfig, SettlersEngine};

    fn seats() -> Vec<SeatDescriptor> {
        COLORS
            .iter()
            .map(|&color| SeatDescriptor {
                color,
                name: color.to_string(),
                kind: SeatType::Automated,
            })
            .collect()
    }

    #[test]
    fn test_greedy_single_action_is_forced() {
        let engine = SettlersEngine::default();
        let mut state = engine.new_game(&seats());
        while state.is_initial_build_phase() {
            let action = engine.legal_actions(&state)[0];
            engine.apply(&mut state, &action).unwrap();
        }
        let actions = engine.legal_actions(&state);

        assert_eq!(actions.len(), 1);
        assert_eq!(GreedyStrategy::new().decide(&engine, &state, &actions), Some(0));
    }

    #[test]
    fn test_greedy_without_simulations_has_no_decision() {
        let engine = SettlersEngine::default();
        let state = engine.new_game(&seats());
        let actions = engine.legal_actions(&state);

        let strategy = GreedyStrategy::with_simulations(0).sequential();

        assert_eq!(strategy.decide(&engine, &state, &actions), None);
    }

    #[test]
    fn test_greedy_picks_within_listing() {
        let engine = SettlersEngine::new(SettlersConfig {
            vps_to_win: 3,
            seed: Some(9),
        });
        let state = engine.new_game(&seats());
        let actions = engine.legal_actions(&state);

        let strategy = GreedyStrategy::with_simulations(2);
        if let Some(choice) = strategy.decide(&engine, &state, &actions) {
            assert!(choice < actions.len());
        }
    }

    #[test]
    fn test_seeded_greedy_is_reproducible_in_parallel_and_sequential() {
        let engine = SettlersEngine::new(SettlersConfig {
            vps_to_win: 4,
            seed: Some(11),
        });
        let state = engine.new_game(&seats());
        let actions = engine.legal_actions(&state);

        let parallel = GreedyStrategy::with_parameters(2, Some(8));
        let sequential = GreedyStrategy::with_parameters(2, Some(8)).sequential();

        for _ in 0..3 {
            assert_eq!(
                parallel.decide(&engine, &state, &actions),
                sequential.decide(&engine, &state, &actions)
            );
        }
    }
}
