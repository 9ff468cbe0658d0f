use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{Color, SeatType};

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Reply to a successful start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSummary {
    pub match_id: MatchId,
    pub seat_count: usize,
    pub human_count: usize,
    pub ai_count: usize,
    pub current_seat_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatSummary {
    pub index: usize,
    pub name: String,
    pub color: Color,
    pub kind: SeatType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    /// Seat display string, e.g. `<HumanSeat color=RED name=Human1>`
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub match_id: MatchId,
    pub turn: u32,
    pub current_seat_index: usize,
    pub seats: Vec<SeatSummary>,
    pub winner: Option<usize>,
    pub summary: String,
}

/// One entry of a legal-action listing. `index` is only valid until the next mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEntry {
    pub index: usize,
    pub description: String,
}

/// Where an applied action came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    Human,
    Strategy,
    /// The strategy made no usable decision and the first listed action was applied
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionOutcome {
    pub action: String,
    pub action_index: usize,
    pub seat_index: usize,
    pub color: Color,
    pub decision: DecisionSource,
    pub next_seat_index: usize,
    pub turn: u32,
    pub winner: Option<usize>,
}

/// Events pushed to WebSocket subscribers after every successful mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    MatchStarted(StartSummary),
    ActionApplied(ActionOutcome),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_uses_camel_case_fields() {
        let outcome = ActionOutcome {
            action: "RED ROLL".to_string(),
            action_index: 0,
            seat_index: 0,
            color: Color::Red,
            decision: DecisionSource::Fallback,
            next_seat_index: 0,
            turn: 3,
            winner: None,
        };

        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["nextSeatIndex"], 0);
        assert_eq!(json["decision"], "fallback");
        assert_eq!(json["color"], "RED");
    }

    #[test]
    fn test_event_is_tagged() {
        let event = SessionEvent::MatchStarted(StartSummary {
            match_id: Uuid::nil(),
            seat_count: 4,
            human_count: 1,
            ai_count: 3,
            current_seat_index: 0,
        });

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "match_started");
        assert_eq!(json["data"]["aiCount"], 3);
    }
}
