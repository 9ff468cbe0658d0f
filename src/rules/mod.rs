// Rules module - Boundary to the game rules
//
// The session manager only talks to a game through `RulesEngine`. It never
// builds or inspects actions itself: it lists them, picks one by position and
// hands it back.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::{Color, SeatType};
use crate::errors::RulesResult;

pub mod settlers;

pub use self::settlers::{SettlersAction, SettlersConfig, SettlersEngine, SettlersState};

/// What the engine is told about each seat when a game is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatDescriptor {
    pub color: Color,
    pub name: String,
    pub kind: SeatType,
}

/// Legality and state transitions of a turn-based game.
pub trait RulesEngine: Send + Sync + 'static {
    type State: Clone + Send + Sync + 'static;
    type Action: Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    /// Builds a fresh game for the given seats, in seat order.
    fn new_game(&self, seats: &[SeatDescriptor]) -> Self::State;

    /// Actions legal in `state`. Ordering is only stable while `state` is unchanged.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Applies `action`, failing with `RulesError::IllegalAction` if it is not legal in `state`.
    fn apply(&self, state: &mut Self::State, action: &Self::Action) -> RulesResult<()>;

    fn current_seat_index(&self, state: &Self::State) -> usize;

    fn turn_number(&self, state: &Self::State) -> u32;

    /// Seat index of the winner once the game is over.
    fn winner(&self, state: &Self::State) -> Option<usize>;

    fn describe_action(&self, action: &Self::Action) -> String;

    fn describe_state(&self, state: &Self::State) -> String;

    /// Preference hint for weighted strategies. Higher is more attractive.
    fn action_weight(&self, _action: &Self::Action) -> u32 {
        1
    }
}
