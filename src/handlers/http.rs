use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ApiError, ApiResult};
use crate::actions::{ActionEntry, ActionOutcome, SessionEvent, StartSummary, StateSnapshot};
use crate::application::SharedState;
use crate::manager::TOTAL_SEATS;

const DEFAULT_AUTO_RUN_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartGameRequest {
    #[serde(default = "default_num_humans")]
    pub num_humans: i64,
}

fn default_num_humans() -> i64 {
    1
}

impl Default for StartGameRequest {
    fn default() -> Self {
        StartGameRequest {
            num_humans: default_num_humans(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformActionRequest {
    pub action_index: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AutoRunRequest {
    #[serde(default = "default_auto_run_limit")]
    pub limit: usize,
}

fn default_auto_run_limit() -> usize {
    DEFAULT_AUTO_RUN_LIMIT
}

impl Default for AutoRunRequest {
    fn default() -> Self {
        AutoRunRequest {
            limit: default_auto_run_limit(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StartGameResponse {
    pub message: String,
    #[serde(flatten)]
    pub summary: StartSummary,
}

#[derive(Debug, Serialize)]
pub struct ActionsResponse {
    pub actions: Vec<ActionEntry>,
}

#[derive(Debug, Serialize)]
pub struct AutoRunResponse {
    pub actions: Vec<ActionOutcome>,
    pub state: StateSnapshot,
}

// Missing or empty bodies fall back to the request defaults
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

pub async fn index() -> &'static str {
    "Catan session server: POST /start_game to begin a match"
}

pub async fn start_game(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<StartGameResponse>> {
    let request: StartGameRequest = parse_body(&body)?;
    log::info!("Starting game with {} human seats", request.num_humans);

    let mut session = state.session.lock().await;
    let summary = session.start_match(request.num_humans)?;
    state.publish(SessionEvent::MatchStarted(summary.clone()));

    Ok(Json(StartGameResponse {
        message: format!("Started a new {}-player game", TOTAL_SEATS),
        summary,
    }))
}

pub async fn get_state(State(state): State<SharedState>) -> ApiResult<Json<StateSnapshot>> {
    let session = state.session.lock().await;
    Ok(Json(session.query_state()?))
}

pub async fn possible_actions(
    State(state): State<SharedState>,
) -> ApiResult<Json<ActionsResponse>> {
    let session = state.session.lock().await;
    let actions = session.list_legal_actions()?;
    Ok(Json(ActionsResponse { actions }))
}

pub async fn perform_action(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<ActionOutcome>> {
    let request: PerformActionRequest = parse_body(&body)?;
    let index = request
        .action_index
        .ok_or_else(|| ApiError::BadRequest("Must provide actionIndex".to_string()))?;

    let mut session = state.session.lock().await;
    let outcome = session.apply_human_action(index)?;
    state.publish(SessionEvent::ActionApplied(outcome.clone()));

    Ok(Json(outcome))
}

pub async fn auto_ai(State(state): State<SharedState>) -> ApiResult<Json<ActionOutcome>> {
    let mut session = state.session.lock().await;
    let outcome = session.run_automated_turn()?;
    state.publish(SessionEvent::ActionApplied(outcome.clone()));

    Ok(Json(outcome))
}

pub async fn auto_ai_until_human(
    State(state): State<SharedState>,
    body: Bytes,
) -> ApiResult<Json<AutoRunResponse>> {
    let request: AutoRunRequest = parse_body(&body)?;

    let mut session = state.session.lock().await;
    let run = session.run_automated_turns(request.limit)?;
    // Applied actions are announced even when the run stopped on an error
    for outcome in &run.outcomes {
        state.publish(SessionEvent::ActionApplied(outcome.clone()));
    }
    if let Some(err) = run.stopped_by {
        return Err(err.into());
    }
    let snapshot = session.query_state()?;

    Ok(Json(AutoRunResponse {
        actions: run.outcomes,
        state: snapshot,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppState;
    use crate::config::SessionConfig;
    use crate::manager::GameSession;
    use crate::players::StrategyKind;
    use crate::rules::{SettlersConfig, SettlersEngine};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    fn app() -> SharedState {
        let engine = SettlersEngine::new(SettlersConfig {
            vps_to_win: 10,
            seed: Some(5),
        });
        let config = SessionConfig {
            default_strategy: StrategyKind::Random,
            seed: Some(5),
            enforce_seat_kind: true,
        };
        AppState::new(GameSession::new(engine, config))
    }

    fn json(body: &str) -> Bytes {
        Bytes::from(body.to_string())
    }

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[tokio::test]
    async fn test_get_state_before_start_is_bad_request() {
        let err = get_state(State(app())).await.unwrap_err();

        assert_eq!(err.code(), "NO_ACTIVE_MATCH");
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_start_game_defaults_to_one_human() {
        let state = app();

        let Json(response) = start_game(State(state.clone()), Bytes::new()).await.unwrap();

        assert_eq!(response.summary.human_count, 1);
        assert_eq!(response.summary.ai_count, 3);
        assert_eq!(response.summary.current_seat_index, 0);
        assert_eq!(response.message, "Started a new 4-player game");
    }

    #[tokio::test]
    async fn test_start_game_rejects_bad_counts() {
        let state = app();

        let err = start_game(State(state.clone()), json(r#"{"numHumans": 5}"#))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_CONFIGURATION");

        let err = start_game(State(state), json("not json")).await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_human_flow_lists_then_applies() {
        let state = app();
        let mut events = state.events.subscribe();
        start_game(State(state.clone()), json(r#"{"numHumans": 4}"#))
            .await
            .unwrap();

        let Json(listing) = possible_actions(State(state.clone())).await.unwrap();
        assert!(!listing.actions.is_empty());

        let Json(outcome) = perform_action(State(state.clone()), json(r#"{"actionIndex": 0}"#))
            .await
            .unwrap();
        assert_eq!(outcome.action, listing.actions[0].description);
        assert_eq!(outcome.next_seat_index, 1);

        assert!(matches!(events.recv().await, Ok(SessionEvent::MatchStarted(_))));
        assert!(matches!(events.recv().await, Ok(SessionEvent::ActionApplied(_))));
    }

    #[tokio::test]
    async fn test_perform_action_requires_index() {
        let state = app();
        start_game(State(state.clone()), json(r#"{"numHumans": 4}"#))
            .await
            .unwrap();

        let err = perform_action(State(state.clone()), json("{}")).await.unwrap_err();
        assert_eq!(err.to_string(), "Must provide actionIndex");

        let err = perform_action(State(state), json(r#"{"actionIndex": 999}"#))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ACTION_INDEX_OUT_OF_RANGE");
    }

    #[tokio::test]
    async fn test_auto_ai_refuses_human_seat() {
        let state = app();
        start_game(State(state.clone()), json(r#"{"numHumans": 1}"#))
            .await
            .unwrap();

        let err = auto_ai(State(state)).await.unwrap_err();

        assert_eq!(err.code(), "NOT_AUTOMATED_SEAT");
    }

    #[tokio::test]
    async fn test_auto_ai_until_human_hands_back_control() {
        let state = app();
        start_game(State(state.clone()), json(r#"{"numHumans": 1}"#))
            .await
            .unwrap();
        perform_action(State(state.clone()), json(r#"{"actionIndex": 0}"#))
            .await
            .unwrap();

        let Json(response) = auto_ai_until_human(State(state), Bytes::new()).await.unwrap();

        assert_eq!(response.actions.len(), 6);
        assert_eq!(response.state.current_seat_index, 0);
    }
}
