use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the session manager at the command boundary.
///
/// Every variant leaves the live match exactly as it was before the failed call.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SessionError {
    #[error("No game in progress")]
    NoActiveMatch,

    #[error("Invalid seat configuration: {details}")]
    InvalidConfiguration { details: String },

    #[error("Action index {index} out of range (0..{available})")]
    ActionIndexOutOfRange { index: i64, available: usize },

    #[error("Seat {seat_index} is not an automated seat")]
    NotAutomatedSeat { seat_index: usize },

    #[error("Seat {seat_index} is not a human seat")]
    NotHumanSeat { seat_index: usize },

    #[error("No actions available for seat {seat_index}")]
    NoActionsAvailable { seat_index: usize },

    #[error("Rules engine rejected action: {0}")]
    IllegalAction(#[from] RulesError),
}

/// Errors reported by a rules engine.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RulesError {
    #[error("Illegal action '{action}': {reason}")]
    IllegalAction { action: String, reason: String },
}

pub type SessionResult<T> = Result<T, SessionError>;
pub type RulesResult<T> = Result<T, RulesError>;

impl SessionError {
    pub fn invalid_configuration(details: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            details: details.into(),
        }
    }

    /// Stable identifier for clients that branch on the failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::NoActiveMatch => "NO_ACTIVE_MATCH",
            SessionError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            SessionError::ActionIndexOutOfRange { .. } => "ACTION_INDEX_OUT_OF_RANGE",
            SessionError::NotAutomatedSeat { .. } => "NOT_AUTOMATED_SEAT",
            SessionError::NotHumanSeat { .. } => "NOT_HUMAN_SEAT",
            SessionError::NoActionsAvailable { .. } => "NO_ACTIONS_AVAILABLE",
            SessionError::IllegalAction(_) => "ILLEGAL_ACTION",
        }
    }

    /// True when the failure points at an inconsistency between the session and the engine.
    pub fn is_internal(&self) -> bool {
        matches!(self, SessionError::IllegalAction(_))
    }
}

impl RulesError {
    pub fn illegal_action(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IllegalAction {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_error_converts_into_illegal_action() {
        let err: SessionError = RulesError::illegal_action("EndTurn", "not your turn").into();
        assert_eq!(err.code(), "ILLEGAL_ACTION");
        assert!(err.is_internal());
        assert!(err.to_string().contains("not your turn"));
    }

    #[test]
    fn test_client_errors_are_not_internal() {
        let errors = vec![
            SessionError::NoActiveMatch,
            SessionError::invalid_configuration("numHumans must be between 0..4"),
            SessionError::ActionIndexOutOfRange {
                index: -1,
                available: 3,
            },
            SessionError::NotAutomatedSeat { seat_index: 0 },
            SessionError::NotHumanSeat { seat_index: 2 },
            SessionError::NoActionsAvailable { seat_index: 1 },
        ];
        for err in errors {
            assert!(!err.is_internal(), "{} should be a client error", err);
        }
    }
}
