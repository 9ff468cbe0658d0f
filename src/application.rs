use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tower_http::cors::{Any, CorsLayer};

use crate::actions::SessionEvent;
use crate::handlers::{http, ws};
use crate::manager::GameSession;
use crate::rules::SettlersEngine;

const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Application state shared by every request.
///
/// The mutex is the one serialization point for the session: mutations and
/// snapshots never interleave.
pub struct AppState {
    pub session: Mutex<GameSession<SettlersEngine>>,
    pub events: broadcast::Sender<SessionEvent>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(session: GameSession<SettlersEngine>) -> SharedState {
        let (events, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(AppState {
            session: Mutex::new(session),
            events,
        })
    }

    pub fn publish(&self, event: SessionEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/", get(http::index))
        .route("/start_game", post(http::start_game))
        .route("/get_state", get(http::get_state))
        .route("/possible_actions", get(http::possible_actions))
        .route("/perform_action", post(http::perform_action))
        .route("/auto_ai", post(http::auto_ai))
        .route("/auto_ai/until_human", post(http::auto_ai_until_human))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .layer(cors)
}
