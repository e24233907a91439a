use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc, oneshot};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::game_loop::{GameBroadcast, GameCommand};
use crate::hook::HookIntent;
use hookball_shared::protocol::{ClientMsg, ServerMsg};

/// Largest inbound text message accepted; bigger ones close the connection
pub const MAX_MESSAGE_SIZE: usize = 1024;

/// Shared app state passed to each WebSocket handler
#[derive(Clone)]
pub struct AppState {
    pub game_tx: mpsc::Sender<GameCommand>,
    pub broadcast_tx: broadcast::Sender<GameBroadcast>,
}

/// `/ws` for the game, everything else served from `static_dir`.
pub fn router(app_state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// HTTP handler for WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before joining so the first state after `init` is not missed
    let mut broadcast_rx = app_state.broadcast_tx.subscribe();

    // Join the game
    let (resp_tx, resp_rx) = oneshot::channel();
    let (eliminated_tx, mut eliminated_rx) = oneshot::channel();
    if app_state
        .game_tx
        .send(GameCommand::PlayerJoin {
            response: resp_tx,
            eliminated: eliminated_tx,
        })
        .await
        .is_err()
    {
        tracing::error!("Failed to send PlayerJoin command");
        return;
    }

    let (my_id, init) = match resp_rx.await {
        Ok(result) => result,
        Err(_) => {
            tracing::error!("Failed to receive init");
            return;
        }
    };

    tracing::info!("Player {} connected", my_id);

    let sent_init = match serde_json::to_string(&ServerMsg::Init(init)) {
        Ok(json) => sink.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize init: {}", e);
            false
        }
    };

    let mut eliminated_done = false;

    if sent_init {
        loop {
            tokio::select! {
                // Client -> Server
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if text.len() > MAX_MESSAGE_SIZE {
                                tracing::warn!(
                                    "Player {} sent oversized message ({} bytes)",
                                    my_id,
                                    text.len()
                                );
                                break;
                            }
                            match serde_json::from_str::<ClientMsg>(&text) {
                                Ok(ClientMsg::Hook(hook)) => match HookIntent::from_msg(&hook) {
                                    Some(intent) => {
                                        let _ = app_state
                                            .game_tx
                                            .send(GameCommand::Hook { id: my_id, intent })
                                            .await;
                                    }
                                    None => {
                                        tracing::debug!("Player {} sent incomplete hook", my_id);
                                    }
                                },
                                Err(e) => {
                                    tracing::debug!("Player {} sent unparsable message: {}", my_id, e);
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::debug!("Player {} socket error: {}", my_id, e);
                            break;
                        }
                        _ => {} // Ignore ping/pong/binary
                    }
                }

                // Server -> this client only
                result = &mut eliminated_rx, if !eliminated_done => {
                    eliminated_done = true;
                    // Err: the loop dropped the notifier without an elimination
                    if result.is_ok() {
                        tracing::info!("Player {} eliminated", my_id);
                        if let Ok(json) = serde_json::to_string(&ServerMsg::Eliminated) {
                            if sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                }

                // Server -> Client (broadcast)
                result = broadcast_rx.recv() => {
                    match result {
                        Ok(GameBroadcast::State(msg)) => {
                            if let Ok(json) = serde_json::to_string(&ServerMsg::State(msg)) {
                                if sink.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!("Player {} lagged by {} messages", my_id, n);
                            // Continue - every state message is a full snapshot
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }
    }

    // Cleanup on disconnect; a no-op if the player was already eliminated
    let _ = app_state
        .game_tx
        .send(GameCommand::PlayerLeave { id: my_id })
        .await;
    tracing::info!("Player {} disconnected", my_id);
}
