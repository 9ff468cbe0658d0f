use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use crate::actions::{SessionEvent, StateSnapshot};
use crate::application::SharedState;

// WebSocket message types
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    Greeting(String),
    State(StateSnapshot),
    Event(SessionEvent),
    Error(String),
}

impl WsMessage {
    fn to_message(&self) -> Option<Message> {
        match serde_json::to_string(self) {
            Ok(json) => Some(Message::Text(json.into())),
            Err(e) => {
                log::error!("Failed to serialize WebSocket message: {}", e);
                None
            }
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_session_connection(socket, state))
}

async fn ws_session_connection(socket: WebSocket, state: SharedState) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the snapshot so nothing applied in between is missed
    let events = BroadcastStream::new(state.events.subscribe());

    let greeting = WsMessage::Greeting("Connected to the Catan session server".to_string());
    let initial = {
        let session = state.session.lock().await;
        match session.query_state() {
            Ok(snapshot) => WsMessage::State(snapshot),
            Err(err) => WsMessage::Error(err.to_string()),
        }
    };

    for message in [greeting, initial] {
        if let Some(frame) = message.to_message() {
            if sender.send(frame).await.is_err() {
                return; // Client disconnected
            }
        }
    }

    let mut send_task = tokio::spawn(async move {
        let mut events = events;
        while let Some(item) = events.next().await {
            let event = match item {
                Ok(event) => event,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    log::warn!("WebSocket subscriber lagged, skipped {} events", skipped);
                    continue;
                }
            };
            if let Some(frame) = WsMessage::Event(event).to_message() {
                if sender.send(frame).await.is_err() {
                    break;
                }
            }
        }
    });

    // Client messages are ignored apart from Close
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        },
        _ = (&mut recv_task) => {
            send_task.abort();
        },
    }

    log::info!("WebSocket connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::StartSummary;
    use uuid::Uuid;

    #[test]
    fn test_messages_are_tagged() {
        let greeting = serde_json::to_value(WsMessage::Greeting("hi".to_string())).unwrap();
        assert_eq!(greeting["type"], "Greeting");
        assert_eq!(greeting["data"], "hi");

        let event = WsMessage::Event(SessionEvent::MatchStarted(StartSummary {
            match_id: Uuid::nil(),
            seat_count: 4,
            human_count: 0,
            ai_count: 4,
            current_seat_index: 0,
        }));
        let json = serde_json::to_value(event).unwrap();

        assert_eq!(json["type"], "Event");
        assert_eq!(json["data"]["type"], "match_started");
        assert_eq!(json["data"]["data"]["humanCount"], 0);
    }

    #[test]
    fn test_error_message_carries_text() {
        let message = WsMessage::Error("No active match".to_string());

        assert!(matches!(message.to_message(), Some(Message::Text(_))));
    }
}
