use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::players::StrategyKind;
use crate::rules::SettlersConfig;

/// Behaviour of the session manager itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Strategy given to the automated seats created by `start_match`
    pub default_strategy: StrategyKind,
    /// Seed for automated seats; each seat derives its own from it
    pub seed: Option<u64>,
    /// Reject human actions while an automated seat is current
    pub enforce_seat_kind: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            default_strategy: StrategyKind::Mcts,
            seed: None,
            enforce_seat_kind: true,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "catan-session")]
#[command(about = "Single-match Catan session server with human and automated seats")]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Strategy for automated seats
    #[arg(long, value_enum, default_value = "mcts")]
    pub strategy: StrategyKind,

    /// Seed for dice and automated seats (deterministic games)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Victory points needed to win
    #[arg(long, default_value_t = 10)]
    pub vps_to_win: u32,

    /// Let /perform_action act for automated seats too
    #[arg(long)]
    pub allow_any_seat: bool,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            default_strategy: self.strategy,
            seed: self.seed,
            enforce_seat_kind: !self.allow_any_seat,
        }
    }

    pub fn rules_config(&self) -> SettlersConfig {
        SettlersConfig {
            vps_to_win: self.vps_to_win,
            seed: self.seed,
        }
    }
}
