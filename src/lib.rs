// Catan Session Library - Core Module Organization
//
// A single-match session coordinator: seats (human or automated), a rules
// engine behind a trait, the session manager and its HTTP/WebSocket surface.

// Core data structures and enums
pub mod actions;
pub mod enums;
pub mod errors;

// Rules and decision making
pub mod player;
pub mod players;
pub mod rules;

// Session management
pub mod config;
pub mod manager;

// Server implementation
pub mod application;
pub mod handlers;

// Re-export common types for convenient access
pub use crate::actions::{
    ActionEntry, ActionOutcome, DecisionSource, SessionEvent, StartSummary, StateSnapshot,
};
pub use crate::config::{ServerConfig, SessionConfig};
pub use crate::enums::{Color, SeatType};
pub use crate::errors::{RulesError, SessionError, SessionResult};
pub use crate::manager::{AutomatedRun, GameSession, SessionStatus, TOTAL_SEATS};
pub use crate::player::{Seat, SeatKind};
pub use crate::players::{create_strategy, DecisionStrategy, StrategyKind};
pub use crate::rules::{RulesEngine, SettlersConfig, SettlersEngine};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
