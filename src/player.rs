// Player module - Seats of a match
//
// A seat is either driven by a client (human) or by a decision strategy.

use std::fmt;
use std::sync::Arc;

use crate::enums::{Color, SeatType};
use crate::errors::{SessionError, SessionResult};
use crate::players::DecisionStrategy;
use crate::rules::{RulesEngine, SeatDescriptor};

pub enum SeatKind<E: RulesEngine> {
    Human,
    Automated(Arc<dyn DecisionStrategy<E>>),
}

impl<E: RulesEngine> Clone for SeatKind<E> {
    fn clone(&self) -> Self {
        match self {
            SeatKind::Human => SeatKind::Human,
            SeatKind::Automated(strategy) => SeatKind::Automated(Arc::clone(strategy)),
        }
    }
}

/// One slot of a match. Color and kind never change once the seat exists.
pub struct Seat<E: RulesEngine> {
    color: Color,
    name: String,
    kind: SeatKind<E>,
}

impl<E: RulesEngine> Seat<E> {
    /// Builds a seat from loose configuration, rejecting an automated seat without a strategy.
    pub fn new(
        color: Color,
        name: impl Into<String>,
        seat_type: SeatType,
        strategy: Option<Arc<dyn DecisionStrategy<E>>>,
    ) -> SessionResult<Self> {
        let name = name.into();
        let kind = match (seat_type, strategy) {
            (SeatType::Human, _) => SeatKind::Human,
            (SeatType::Automated, Some(strategy)) => SeatKind::Automated(strategy),
            (SeatType::Automated, None) => {
                return Err(SessionError::invalid_configuration(format!(
                    "automated seat {} ({}) has no decision strategy",
                    name, color
                )))
            }
        };
        Ok(Seat { color, name, kind })
    }

    pub fn human(color: Color, name: impl Into<String>) -> Self {
        Seat {
            color,
            name: name.into(),
            kind: SeatKind::Human,
        }
    }

    pub fn automated(
        color: Color,
        name: impl Into<String>,
        strategy: Arc<dyn DecisionStrategy<E>>,
    ) -> Self {
        Seat {
            color,
            name: name.into(),
            kind: SeatKind::Automated(strategy),
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seat_type(&self) -> SeatType {
        match self.kind {
            SeatKind::Human => SeatType::Human,
            SeatKind::Automated(_) => SeatType::Automated,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self.kind, SeatKind::Human)
    }

    /// Name of the strategy driving an automated seat.
    pub fn strategy_name(&self) -> Option<&str> {
        match &self.kind {
            SeatKind::Human => None,
            SeatKind::Automated(strategy) => Some(strategy.name()),
        }
    }

    /// Asks the seat's strategy for a position in `legal_actions`.
    /// Human seats never decide; their actions come from the client.
    pub fn decide(
        &self,
        engine: &E,
        state: &E::State,
        legal_actions: &[E::Action],
    ) -> Option<usize> {
        match &self.kind {
            SeatKind::Human => None,
            SeatKind::Automated(strategy) => strategy.decide(engine, state, legal_actions),
        }
    }

    pub fn descriptor(&self) -> SeatDescriptor {
        SeatDescriptor {
            color: self.color,
            name: self.name.clone(),
            kind: self.seat_type(),
        }
    }
}

impl<E: RulesEngine> Clone for Seat<E> {
    fn clone(&self) -> Self {
        Seat {
            color: self.color,
            name: self.name.clone(),
            kind: self.kind.clone(),
        }
    }
}

impl<E: RulesEngine> fmt::Debug for Seat<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Seat")
            .field("color", &self.color)
            .field("name", &self.name)
            .field("kind", &self.seat_type())
            .field("strategy", &self.strategy_name())
            .finish()
    }
}

impl<E: RulesEngine> fmt::Display for Seat<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy_name() {
            Some(strategy) => write!(
                f,
                "<AutomatedSeat color={} name={} strategy={}>",
                self.color, self.name, strategy
            ),
            None => write!(f, "<HumanSeat color={} name={}>", self.color, self.name),
        }
    }
}
