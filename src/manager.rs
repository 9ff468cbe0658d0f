use std::sync::Arc;
use uuid::Uuid;

use crate::actions::{
    ActionEntry, ActionOutcome, DecisionSource, MatchId, SeatSummary, StartSummary, StateSnapshot,
};
use crate::config::SessionConfig;
use crate::enums::COLORS;
use crate::errors::{RulesError, SessionError, SessionResult};
use crate::player::Seat;
use crate::players::{create_strategy, DecisionStrategy};
use crate::rules::{RulesEngine, SeatDescriptor};

/// Number of seats in every match
pub const TOTAL_SEATS: usize = 4;

/// Produces the strategy for the automated seat at the given index.
pub type StrategyProvider<E> = Box<dyn Fn(usize) -> Arc<dyn DecisionStrategy<E>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NoMatch,
    MatchInProgress,
}

/// Result of `GameSession::run_automated_turns`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomatedRun {
    /// Applied actions, in order
    pub outcomes: Vec<ActionOutcome>,
    /// The error that ended the run early, if any
    pub stopped_by: Option<SessionError>,
}

/// The single live game: fixed seats plus the engine-owned state.
pub struct Match<E: RulesEngine> {
    id: MatchId,
    seats: Vec<Seat<E>>,
    state: E::State,
}

impl<E: RulesEngine> Match<E> {
    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn state(&self) -> &E::State {
        &self.state
    }
}

/// Owns the live match and mediates every action applied to it.
///
/// Callers must serialize access: mutating operations take `&mut self`, so a
/// shared session has to sit behind a lock (see `application::AppState`).
/// Automated turns run synchronously; a slow strategy holds that lock for as
/// long as it thinks.
pub struct GameSession<E: RulesEngine> {
    engine: E,
    config: SessionConfig,
    strategies: StrategyProvider<E>,
    current: Option<Match<E>>,
}

impl<E: RulesEngine> GameSession<E> {
    pub fn new(engine: E, config: SessionConfig) -> Self {
        let kind = config.default_strategy;
        let seed = config.seed;
        let strategies: StrategyProvider<E> = Box::new(move |seat_index| {
            create_strategy(kind, seed.map(|seed| seed.wrapping_add(seat_index as u64)))
        });

        GameSession {
            engine,
            config,
            strategies,
            current: None,
        }
    }

    /// Replaces the strategy factory used for automated seats in future matches.
    pub fn with_strategy_provider(
        mut self,
        provider: impl Fn(usize) -> Arc<dyn DecisionStrategy<E>> + Send + Sync + 'static,
    ) -> Self {
        self.strategies = Box::new(provider);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn current_match(&self) -> Option<&Match<E>> {
        self.current.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        match self.current {
            Some(_) => SessionStatus::MatchInProgress,
            None => SessionStatus::NoMatch,
        }
    }

    /// Starts a fresh match with `human_seats` human seats followed by automated ones,
    /// discarding any previous match.
    pub fn start_match(&mut self, human_seats: i64) -> SessionResult<StartSummary> {
        let human_count = usize::try_from(human_seats)
            .ok()
            .filter(|&count| count <= TOTAL_SEATS)
            .ok_or_else(|| {
                SessionError::invalid_configuration(format!(
                    "numHumans must be between 0..{}, got {}",
                    TOTAL_SEATS, human_seats
                ))
            })?;

        let seats: Vec<Seat<E>> = COLORS
            .iter()
            .take(TOTAL_SEATS)
            .enumerate()
            .map(|(index, &color)| {
                if index < human_count {
                    Seat::human(color, format!("Human{}", index + 1))
                } else {
                    let strategy = (self.strategies)(index);
                    Seat::automated(color, format!("Bot{}", index - human_count + 1), strategy)
                }
            })
            .collect();

        let descriptors: Vec<SeatDescriptor> = seats.iter().map(Seat::descriptor).collect();
        let state = self.engine.new_game(&descriptors);
        let game = Match {
            id: Uuid::new_v4(),
            seats,
            state,
        };

        let summary = StartSummary {
            match_id: game.id,
            seat_count: TOTAL_SEATS,
            human_count,
            ai_count: TOTAL_SEATS - human_count,
            current_seat_index: self.engine.current_seat_index(&game.state),
        };

        if let Some(previous) = self.current.replace(game) {
            log::info!("Discarding match {} in favour of {}", previous.id, summary.match_id);
        }
        log::info!(
            "Started a new {}-player match {} ({} human, {} automated)",
            TOTAL_SEATS,
            summary.match_id,
            summary.human_count,
            summary.ai_count
        );

        Ok(summary)
    }

    pub fn query_state(&self) -> SessionResult<StateSnapshot> {
        let game = self.live_match()?;

        let seats = game
            .seats
            .iter()
            .enumerate()
            .map(|(index, seat)| SeatSummary {
                index,
                name: seat.name().to_string(),
                color: seat.color(),
                kind: seat.seat_type(),
                strategy: seat.strategy_name().map(str::to_string),
                description: seat.to_string(),
            })
            .collect();

        Ok(StateSnapshot {
            match_id: game.id,
            turn: self.engine.turn_number(&game.state),
            current_seat_index: self.engine.current_seat_index(&game.state),
            seats,
            winner: self.engine.winner(&game.state),
            summary: self.engine.describe_state(&game.state),
        })
    }

    /// Lists the actions legal right now. Positions are invalidated by the next mutation.
    pub fn list_legal_actions(&self) -> SessionResult<Vec<ActionEntry>> {
        let game = self.live_match()?;

        Ok(self
            .engine
            .legal_actions(&game.state)
            .iter()
            .enumerate()
            .map(|(index, action)| ActionEntry {
                index,
                description: self.engine.describe_action(action),
            })
            .collect())
    }

    /// Applies the action at `index` of the current listing on behalf of the current seat.
    pub fn apply_human_action(&mut self, index: i64) -> SessionResult<ActionOutcome> {
        let game = self.live_match()?;
        let seat_index = self.engine.current_seat_index(&game.state);

        if self.config.enforce_seat_kind {
            let is_human = game.seats.get(seat_index).map_or(false, Seat::is_human);
            if !is_human {
                return Err(SessionError::NotHumanSeat { seat_index });
            }
        }

        let actions = self.engine.legal_actions(&game.state);
        let position = usize::try_from(index)
            .ok()
            .filter(|&position| position < actions.len())
            .ok_or(SessionError::ActionIndexOutOfRange {
                index,
                available: actions.len(),
            })?;

        self.commit(&actions[position], position, DecisionSource::Human)
    }

    /// Lets the current automated seat pick and apply one action.
    pub fn run_automated_turn(&mut self) -> SessionResult<ActionOutcome> {
        let game = self.live_match()?;
        let seat_index = self.engine.current_seat_index(&game.state);
        let seat = game
            .seats
            .get(seat_index)
            .filter(|seat| !seat.is_human())
            .ok_or(SessionError::NotAutomatedSeat { seat_index })?;

        let actions = self.engine.legal_actions(&game.state);
        if actions.is_empty() {
            return Err(SessionError::NoActionsAvailable { seat_index });
        }

        let (position, source) = match seat.decide(&self.engine, &game.state, &actions) {
            Some(position) if position < actions.len() => (position, DecisionSource::Strategy),
            Some(position) => {
                log::error!(
                    "Strategy {} for seat {} returned index {} outside 0..{}; falling back to the first legal action",
                    seat.strategy_name().unwrap_or_default(),
                    seat_index,
                    position,
                    actions.len()
                );
                (0, DecisionSource::Fallback)
            }
            None => {
                log::warn!(
                    "Strategy {} for seat {} made no decision; falling back to the first legal action",
                    seat.strategy_name().unwrap_or_default(),
                    seat_index
                );
                (0, DecisionSource::Fallback)
            }
        };

        self.commit(&actions[position], position, source)
    }

    /// Runs automated seats until a human seat is up, no action is available,
    /// or `limit` actions have been applied.
    ///
    /// Fails only when there is no match. A failure after that stops the run and
    /// is reported in `AutomatedRun::stopped_by` next to the actions already applied.
    pub fn run_automated_turns(&mut self, limit: usize) -> SessionResult<AutomatedRun> {
        self.live_match()?;
        let mut run = AutomatedRun::default();

        while run.outcomes.len() < limit {
            let game = self.live_match()?;
            let seat_index = self.engine.current_seat_index(&game.state);
            let automated = game.seats.get(seat_index).map_or(false, |seat| !seat.is_human());
            if !automated || self.engine.legal_actions(&game.state).is_empty() {
                break;
            }
            match self.run_automated_turn() {
                Ok(outcome) => run.outcomes.push(outcome),
                Err(err) => {
                    log::warn!(
                        "Automated run stopped after {} actions: {}",
                        run.outcomes.len(),
                        err
                    );
                    run.stopped_by = Some(err);
                    break;
                }
            }
        }

        log::debug!("Ran {} automated actions", run.outcomes.len());
        Ok(run)
    }

    fn live_match(&self) -> SessionResult<&Match<E>> {
        self.current.as_ref().ok_or(SessionError::NoActiveMatch)
    }

    // Applies to a copy so a rejected action leaves the match untouched
    fn commit(
        &mut self,
        action: &E::Action,
        position: usize,
        decision: DecisionSource,
    ) -> SessionResult<ActionOutcome> {
        let engine = &self.engine;
        let game = self.current.as_mut().ok_or(SessionError::NoActiveMatch)?;
        let seat_index = engine.current_seat_index(&game.state);
        let description = engine.describe_action(action);
        let Some(color) = game.seats.get(seat_index).map(Seat::color) else {
            log::error!(
                "Rules engine reports seat {} but the match has {} seats",
                seat_index,
                game.seats.len()
            );
            return Err(RulesError::illegal_action(
                description,
                format!("seat index {} out of range", seat_index),
            )
            .into());
        };

        let mut next = game.state.clone();
        if let Err(err) = engine.apply(&mut next, action) {
            log::error!(
                "Rules engine rejected listed action {} for seat {}: {}",
                description,
                seat_index,
                err
            );
            return Err(err.into());
        }
        game.state = next;

        let outcome = ActionOutcome {
            action: description,
            action_index: position,
            seat_index,
            color,
            decision,
            next_seat_index: engine.current_seat_index(&game.state),
            turn: engine.turn_number(&game.state),
            winner: engine.winner(&game.state),
        };

        log::info!(
            "Seat {} ({}) applied {} [{:?}]; next seat {}, turn {}",
            outcome.seat_index,
            outcome.color,
            outcome.action,
            outcome.decision,
            outcome.next_seat_index,
            outcome.turn
        );
        if let Some(winner) = outcome.winner {
            log::info!("Match {} won by seat {}", game.id, winner);
        }

        Ok(outcome)
    }
}
