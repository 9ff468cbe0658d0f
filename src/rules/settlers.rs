use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{RulesEngine, SeatDescriptor};
use crate::enums::{Color, FreqDeck, Resource, RESOURCES};
use crate::errors::{RulesError, RulesResult};

pub const NUM_NODES: u8 = 24;

// Dice number each node produces on, cycled over the node ids (no 7)
const NUMBER_TOKENS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

pub const SETTLEMENT_COST: FreqDeck = [1, 1, 1, 1, 0];
pub const CITY_COST: FreqDeck = [0, 0, 0, 2, 3];
pub const DEVELOPMENT_CARD_COST: FreqDeck = [0, 0, 1, 1, 1];

const MAX_SETTLEMENTS: usize = 5;
const MAX_CITIES: usize = 4;
const DEVELOPMENT_DECK_SIZE: u8 = 5;
const MARITIME_RATIO: u8 = 4;
const DISCARD_LIMIT: u32 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlersConfig {
    pub vps_to_win: u32,
    /// Seed for the dice. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for SettlersConfig {
    fn default() -> Self {
        SettlersConfig {
            vps_to_win: 10,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlersAction {
    Roll { color: Color },
    BuildSettlement { color: Color, node_id: u8 },
    BuildCity { color: Color, node_id: u8 },
    BuyDevelopmentCard { color: Color },
    MaritimeTrade { color: Color, give: Resource, take: Resource },
    EndTurn { color: Color },
}

impl fmt::Display for SettlersAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlersAction::Roll { color } => write!(f, "{} ROLL", color),
            SettlersAction::BuildSettlement { color, node_id } => {
                write!(f, "{} BUILD_SETTLEMENT node {}", color, node_id)
            }
            SettlersAction::BuildCity { color, node_id } => {
                write!(f, "{} BUILD_CITY node {}", color, node_id)
            }
            SettlersAction::BuyDevelopmentCard { color } => {
                write!(f, "{} BUY_DEVELOPMENT_CARD", color)
            }
            SettlersAction::MaritimeTrade { color, give, take } => write!(
                f,
                "{} MARITIME_TRADE {} {} for 1 {}",
                color, MARITIME_RATIO, give, take
            ),
            SettlersAction::EndTurn { color } => write!(f, "{} END_TURN", color),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Building {
    Settlement(usize),
    City(usize),
}

impl Building {
    fn owner(self) -> usize {
        match self {
            Building::Settlement(seat) | Building::City(seat) => seat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    InitialBuild,
    Roll,
    Main,
}

#[derive(Debug, Clone)]
pub struct SettlersState {
    colors: Vec<Color>,
    hands: Vec<FreqDeck>,
    // Indexed by node id
    buildings: Vec<Option<Building>>,
    dev_points: Vec<u32>,
    dev_deck: u8,
    phase: Phase,
    initial_order: Vec<usize>,
    initial_step: usize,
    current: usize,
    turns: u32,
    last_roll: Option<(u8, u8)>,
    winner: Option<usize>,
    rng: XorShiftRng,
}

impl SettlersState {
    pub fn num_seats(&self) -> usize {
        self.colors.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_initial_build_phase(&self) -> bool {
        self.phase == Phase::InitialBuild
    }

    pub fn hand(&self, seat: usize) -> Option<&FreqDeck> {
        self.hands.get(seat)
    }

    pub fn building(&self, node_id: u8) -> Option<Building> {
        self.buildings.get(node_id as usize).copied().flatten()
    }

    pub fn last_roll(&self) -> Option<(u8, u8)> {
        self.last_roll
    }

    pub fn victory_points(&self, seat: usize) -> u32 {
        let buildings: u32 = self
            .buildings
            .iter()
            .flatten()
            .map(|building| match *building {
                Building::Settlement(owner) if owner == seat => 1,
                Building::City(owner) if owner == seat => 2,
                _ => 0,
            })
            .sum();
        buildings + self.dev_points.get(seat).copied().unwrap_or(0)
    }

    fn count_buildings(&self, seat: usize, city: bool) -> usize {
        self.buildings
            .iter()
            .flatten()
            .filter(|building| match **building {
                Building::Settlement(owner) => !city && owner == seat,
                Building::City(owner) => city && owner == seat,
            })
            .count()
    }

    fn empty_nodes(&self) -> impl Iterator<Item = u8> + '_ {
        (0..NUM_NODES).filter(move |&node_id| self.building(node_id).is_none())
    }
}

pub fn node_resource(node_id: u8) -> Resource {
    RESOURCES[node_id as usize % RESOURCES.len()]
}

pub fn node_number(node_id: u8) -> u8 {
    NUMBER_TOKENS[node_id as usize % NUMBER_TOKENS.len()]
}

fn can_afford(hand: &FreqDeck, cost: &FreqDeck) -> bool {
    hand.iter().zip(cost.iter()).all(|(have, need)| have >= need)
}

fn pay(hand: &mut FreqDeck, cost: &FreqDeck) {
    for (have, need) in hand.iter_mut().zip(cost.iter()) {
        *have -= need;
    }
}

/// Compact Catan-style rules: free snake-order opening settlements, then
/// roll / build / trade turns until someone reaches `vps_to_win`.
#[derive(Debug, Clone, Default)]
pub struct SettlersEngine {
    config: SettlersConfig,
}

impl SettlersEngine {
    pub fn new(config: SettlersConfig) -> Self {
        SettlersEngine { config }
    }

    fn roll_dice(&self, state: &mut SettlersState) {
        let dice = (state.rng.gen_range(1..=6), state.rng.gen_range(1..=6));
        state.last_roll = Some(dice);
        state.phase = Phase::Main;

        let total = dice.0 + dice.1;
        if total == 7 {
            Self::discard_half(state);
            return;
        }

        for node_id in 0..NUM_NODES {
            if node_number(node_id) != total {
                continue;
            }
            let yield_amount = match state.building(node_id) {
                Some(Building::Settlement(_)) => 1,
                Some(Building::City(_)) => 2,
                None => continue,
            };
            let owner = state.building(node_id).map(Building::owner);
            if let Some(hand) = owner.and_then(|seat| state.hands.get_mut(seat)) {
                let slot = &mut hand[node_resource(node_id).index()];
                *slot = slot.saturating_add(yield_amount);
            }
        }
    }

    // Hands above the limit lose half, taken one card at a time from the largest pile
    fn discard_half(state: &mut SettlersState) {
        for hand in state.hands.iter_mut() {
            let total: u32 = hand.iter().map(|&count| count as u32).sum();
            if total <= DISCARD_LIMIT {
                continue;
            }
            for _ in 0..total / 2 {
                if let Some(largest) = hand.iter().position_max() {
                    hand[largest] -= 1;
                }
            }
        }
    }

    fn place_initial_settlement(&self, state: &mut SettlersState, seat: usize, node_id: u8) {
        state.buildings[node_id as usize] = Some(Building::Settlement(seat));

        // Second round settlements pay out their node once
        if state.initial_step >= state.num_seats() {
            let slot = &mut state.hands[seat][node_resource(node_id).index()];
            *slot = slot.saturating_add(1);
        }

        state.initial_step += 1;
        match state.initial_order.get(state.initial_step) {
            Some(&next) => state.current = next,
            None => {
                state.phase = Phase::Roll;
                state.current = 0;
            }
        }
    }
}

impl RulesEngine for SettlersEngine {
    type State = SettlersState;
    type Action = SettlersAction;

    fn new_game(&self, seats: &[SeatDescriptor]) -> SettlersState {
        let num_seats = seats.len();
        let initial_order: Vec<usize> = (0..num_seats).chain((0..num_seats).rev()).collect();
        let rng = match self.config.seed {
            Some(seed) => XorShiftRng::seed_from_u64(seed),
            None => XorShiftRng::from_entropy(),
        };

        SettlersState {
            colors: seats.iter().map(|seat| seat.color).collect(),
            hands: vec![[0; 5]; num_seats],
            buildings: vec![None; NUM_NODES as usize],
            dev_points: vec![0; num_seats],
            dev_deck: DEVELOPMENT_DECK_SIZE,
            phase: Phase::InitialBuild,
            current: initial_order.first().copied().unwrap_or(0),
            initial_order,
            initial_step: 0,
            turns: 0,
            last_roll: None,
            winner: None,
            rng,
        }
    }

    fn legal_actions(&self, state: &SettlersState) -> Vec<SettlersAction> {
        if state.winner.is_some() {
            return Vec::new();
        }
        let seat = state.current;
        let Some(color) = state.colors.get(seat).copied() else {
            return Vec::new();
        };

        match state.phase {
            Phase::InitialBuild => state
                .empty_nodes()
                .map(|node_id| SettlersAction::BuildSettlement { color, node_id })
                .collect(),
            Phase::Roll => vec![SettlersAction::Roll { color }],
            Phase::Main => {
                let hand = &state.hands[seat];
                let mut actions = vec![SettlersAction::EndTurn { color }];

                if can_afford(hand, &SETTLEMENT_COST)
                    && state.count_buildings(seat, false) + state.count_buildings(seat, true)
                        < MAX_SETTLEMENTS
                {
                    actions.extend(
                        state
                            .empty_nodes()
                            .map(|node_id| SettlersAction::BuildSettlement { color, node_id }),
                    );
                }

                if can_afford(hand, &CITY_COST) && state.count_buildings(seat, true) < MAX_CITIES {
                    actions.extend(
                        (0..NUM_NODES)
                            .filter(|&node_id| {
                                state.building(node_id) == Some(Building::Settlement(seat))
                            })
                            .map(|node_id| SettlersAction::BuildCity { color, node_id }),
                    );
                }

                if state.dev_deck > 0 && can_afford(hand, &DEVELOPMENT_CARD_COST) {
                    actions.push(SettlersAction::BuyDevelopmentCard { color });
                }

                for give in RESOURCES {
                    if hand[give.index()] < MARITIME_RATIO {
                        continue;
                    }
                    for take in RESOURCES.into_iter().filter(|&take| take != give) {
                        actions.push(SettlersAction::MaritimeTrade { color, give, take });
                    }
                }

                actions
            }
        }
    }

    fn apply(&self, state: &mut SettlersState, action: &SettlersAction) -> RulesResult<()> {
        if !self.legal_actions(state).contains(action) {
            return Err(RulesError::illegal_action(
                action.to_string(),
                "not in the current legal-action listing",
            ));
        }

        let seat = state.current;
        match *action {
            SettlersAction::Roll { .. } => self.roll_dice(state),
            SettlersAction::BuildSettlement { node_id, .. } => {
                if state.is_initial_build_phase() {
                    self.place_initial_settlement(state, seat, node_id);
                } else {
                    pay(&mut state.hands[seat], &SETTLEMENT_COST);
                    state.buildings[node_id as usize] = Some(Building::Settlement(seat));
                }
            }
            SettlersAction::BuildCity { node_id, .. } => {
                pay(&mut state.hands[seat], &CITY_COST);
                state.buildings[node_id as usize] = Some(Building::City(seat));
            }
            SettlersAction::BuyDevelopmentCard { .. } => {
                pay(&mut state.hands[seat], &DEVELOPMENT_CARD_COST);
                state.dev_deck -= 1;
                state.dev_points[seat] += 1;
            }
            SettlersAction::MaritimeTrade { give, take, .. } => {
                let hand = &mut state.hands[seat];
                hand[give.index()] -= MARITIME_RATIO;
                hand[take.index()] = hand[take.index()].saturating_add(1);
            }
            SettlersAction::EndTurn { .. } => {
                state.current = (state.current + 1) % state.num_seats();
                state.turns += 1;
                state.phase = Phase::Roll;
                state.last_roll = None;
            }
        }

        if state.victory_points(seat) >= self.config.vps_to_win {
            state.winner = Some(seat);
        }
        Ok(())
    }

    fn current_seat_index(&self, state: &SettlersState) -> usize {
        state.current
    }

    fn turn_number(&self, state: &SettlersState) -> u32 {
        state.turns
    }

    fn winner(&self, state: &SettlersState) -> Option<usize> {
        state.winner
    }

    fn describe_action(&self, action: &SettlersAction) -> String {
        action.to_string()
    }

    fn describe_state(&self, state: &SettlersState) -> String {
        let players = state
            .colors
            .iter()
            .enumerate()
            .map(|(seat, color)| {
                format!(
                    "{} {}vp {:?}",
                    color,
                    state.victory_points(seat),
                    state.hands[seat]
                )
            })
            .join(", ");
        let roll = match state.last_roll {
            Some((a, b)) => format!("{}+{}", a, b),
            None => "-".to_string(),
        };
        let to_play = state
            .colors
            .get(state.current)
            .map(|color| color.to_string())
            .unwrap_or_default();
        format!(
            "turn {} | {} to play ({:?}) | roll {} | {}",
            state.turns, to_play, state.phase, roll, players
        )
    }

    fn action_weight(&self, action: &SettlersAction) -> u32 {
        match action {
            SettlersAction::BuildCity { .. } => 10,
            SettlersAction::BuildSettlement { .. } => 8,
            SettlersAction::BuyDevelopmentCard { .. } => 5,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::{SeatType, COLORS};

    fn seats(count: usize) -> Vec<SeatDescriptor> {
        COLORS
            .iter()
            .take(count)
            .enumerate()
            .map(|(i, &color)| SeatDescriptor {
                color,
                name: format!("Bot{}", i + 1),
                kind: SeatType::Automated,
            })
            .collect()
    }

    fn engine(vps_to_win: u32) -> SettlersEngine {
        SettlersEngine::new(SettlersConfig {
            vps_to_win,
            seed: Some(7),
        })
    }

    fn finish_initial_build(engine: &SettlersEngine, state: &mut SettlersState) {
        while state.is_initial_build_phase() {
            let action = engine.legal_actions(state)[0];
            engine.apply(state, &action).unwrap();
        }
    }

    #[test]
    fn test_initial_build_follows_snake_order() {
        let engine = engine(10);
        let mut state = engine.new_game(&seats(4));
        let mut order = Vec::new();

        while state.is_initial_build_phase() {
            order.push(engine.current_seat_index(&state));
            let action = engine.legal_actions(&state)[0];
            engine.apply(&mut state, &action).unwrap();
        }

        assert_eq!(order, vec![0, 1, 2, 3, 3, 2, 1, 0]);
        assert_eq!(state.phase(), Phase::Roll);
        assert_eq!(engine.current_seat_index(&state), 0);
        assert_eq!(engine.turn_number(&state), 0);
    }

    #[test]
    fn test_second_settlement_yields_resources() {
        let engine = engine(10);
        let mut state = engine.new_game(&seats(4));
        finish_initial_build(&engine, &mut state);

        let total_cards: u32 = (0..4)
            .map(|seat| state.hand(seat).unwrap().iter().map(|&c| c as u32).sum::<u32>())
            .sum();
        assert_eq!(total_cards, 4);
        for seat in 0..4 {
            assert_eq!(state.victory_points(seat), 2);
        }
    }

    #[test]
    fn test_illegal_action_is_rejected_without_mutation() {
        let engine = engine(10);
        let mut state = engine.new_game(&seats(4));

        let result = engine.apply(&mut state, &SettlersAction::EndTurn { color: Color::Red });

        assert!(matches!(result, Err(RulesError::IllegalAction { .. })));
        assert!(state.is_initial_build_phase());
        assert_eq!(engine.current_seat_index(&state), 0);
        assert_eq!(engine.legal_actions(&state).len(), NUM_NODES as usize);
    }

    #[test]
    fn test_end_turn_is_listed_first_after_roll() {
        let engine = engine(10);
        let mut state = engine.new_game(&seats(4));
        finish_initial_build(&engine, &mut state);

        assert_eq!(
            engine.legal_actions(&state),
            vec![SettlersAction::Roll { color: Color::Red }]
        );
        engine
            .apply(&mut state, &SettlersAction::Roll { color: Color::Red })
            .unwrap();

        assert!(state.last_roll().is_some());
        assert_eq!(
            engine.legal_actions(&state)[0],
            SettlersAction::EndTurn { color: Color::Red }
        );
    }

    #[test]
    fn test_end_turn_advances_seat_and_turn() {
        let engine = engine(10);
        let mut state = engine.new_game(&seats(4));
        finish_initial_build(&engine, &mut state);

        engine
            .apply(&mut state, &SettlersAction::Roll { color: Color::Red })
            .unwrap();
        engine
            .apply(&mut state, &SettlersAction::EndTurn { color: Color::Red })
            .unwrap();

        assert_eq!(engine.current_seat_index(&state), 1);
        assert_eq!(engine.turn_number(&state), 1);
        assert_eq!(state.phase(), Phase::Roll);
    }

    #[test]
    fn test_reaching_target_declares_winner() {
        let engine = engine(2);
        let mut state = engine.new_game(&seats(4));

        // Seat 3 places both of its settlements back to back in the snake
        for _ in 0..5 {
            let action = engine.legal_actions(&state)[0];
            engine.apply(&mut state, &action).unwrap();
        }

        assert_eq!(engine.winner(&state), Some(3));
        assert!(engine.legal_actions(&state).is_empty());
    }

    #[test]
    fn test_build_settlement_spends_resources() {
        let engine = engine(10);
        let mut state = engine.new_game(&seats(4));
        finish_initial_build(&engine, &mut state);
        engine
            .apply(&mut state, &SettlersAction::Roll { color: Color::Red })
            .unwrap();
        state.hands[0] = [2, 2, 2, 2, 0];

        let build = engine
            .legal_actions(&state)
            .into_iter()
            .find(|action| matches!(action, SettlersAction::BuildSettlement { .. }))
            .expect("settlement should be affordable");
        engine.apply(&mut state, &build).unwrap();

        assert_eq!(state.hand(0), Some(&[1, 1, 1, 1, 0]));
        assert_eq!(state.victory_points(0), 3);
    }

    #[test]
    fn test_maritime_trade_needs_four_of_a_kind() {
        let engine = engine(10);
        let mut state = engine.new_game(&seats(4));
        finish_initial_build(&engine, &mut state);
        engine
            .apply(&mut state, &SettlersAction::Roll { color: Color::Red })
            .unwrap();
        state.hands[0] = [4, 3, 0, 0, 0];

        let trades: Vec<SettlersAction> = engine
            .legal_actions(&state)
            .into_iter()
            .filter(|action| matches!(action, SettlersAction::MaritimeTrade { .. }))
            .collect();

        assert_eq!(trades.len(), 4);
        assert!(trades.iter().all(|action| matches!(
            action,
            SettlersAction::MaritimeTrade {
                give: Resource::Wood,
                ..
            }
        )));
    }

    #[test]
    fn test_discard_halves_large_hands() {
        let engine = engine(10);
        let mut state = engine.new_game(&seats(2));
        state.hands[0] = [4, 4, 1, 0, 0];
        state.hands[1] = [3, 2, 1, 1, 0];

        SettlersEngine::discard_half(&mut state);

        assert_eq!(state.hands[0].iter().map(|&c| c as u32).sum::<u32>(), 5);
        assert_eq!(state.hands[1], [3, 2, 1, 1, 0]);
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let engine = engine(10);
        let mut first = engine.new_game(&seats(4));
        let mut second = engine.new_game(&seats(4));

        for _ in 0..40 {
            let a = engine.legal_actions(&first)[0];
            let b = engine.legal_actions(&second)[0];
            assert_eq!(a, b);
            engine.apply(&mut first, &a).unwrap();
            engine.apply(&mut second, &b).unwrap();
        }

        assert_eq!(first.last_roll(), second.last_roll());
        assert_eq!(first.hands, second.hands);
    }
}
