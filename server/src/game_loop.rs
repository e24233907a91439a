use crate::arena::PlayerId;
use crate::config::ServerConfig;
use crate::hook::HookIntent;
use crate::state::GameState;
use hookball_shared::config::ArenaConfig;
use hookball_shared::protocol::{InitMsg, StateMsg};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Commands from client connections to the game loop
pub enum GameCommand {
    PlayerJoin {
        response: oneshot::Sender<(PlayerId, InitMsg)>,
        /// Fired once if this player is eliminated
        eliminated: oneshot::Sender<()>,
    },
    PlayerLeave {
        id: PlayerId,
    },
    Hook {
        id: PlayerId,
        intent: HookIntent,
    },
}

/// Broadcasts from game loop to all clients.
/// Elimination notices never go through here, see `GameCommand::PlayerJoin`.
#[derive(Debug, Clone)]
pub enum GameBroadcast {
    State(StateMsg),
}

/// Run the main game loop. Owns all game state.
///
/// Commands are applied between ticks, so no tick ever sees a half-applied
/// join, leave or hook update.
pub async fn run_game_loop(
    mut cmd_rx: mpsc::Receiver<GameCommand>,
    broadcast_tx: broadcast::Sender<GameBroadcast>,
    server_config: ServerConfig,
    arena_config: ArenaConfig,
) {
    let mut state = GameState::new(&server_config, arena_config);
    let mut eliminated_notifiers: HashMap<PlayerId, oneshot::Sender<()>> = HashMap::new();

    let tick_duration = Duration::from_secs_f64(1.0 / server_config.tick_rate_hz as f64);
    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                for elimination in state.tick() {
                    tracing::info!(
                        "Player {} eliminated by player {}",
                        elimination.loser,
                        elimination.winner
                    );
                    if let Some(notify) = eliminated_notifiers.remove(&elimination.loser) {
                        let _ = notify.send(());
                    }
                }

                let _ = broadcast_tx.send(GameBroadcast::State(state.state_msg()));
            }

            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    GameCommand::PlayerJoin { response, eliminated } => {
                        let Some((player_id, init)) = state.add_player() else {
                            tracing::warn!("No free player id, rejecting connection");
                            continue;
                        };
                        if response.send((player_id, init)).is_err() {
                            // Connection went away before it got its id
                            state.remove_player(player_id);
                        } else {
                            eliminated_notifiers.insert(player_id, eliminated);
                        }
                    }
                    GameCommand::PlayerLeave { id } => {
                        eliminated_notifiers.remove(&id);
                        if state.remove_player(id) {
                            tracing::info!("Player {} left", id);
                        }
                    }
                    GameCommand::Hook { id, intent } => {
                        state.handle_hook(id, intent);
                    }
                }
            }

            else => break,
        }
    }

    tracing::info!("Game loop ended");
}
