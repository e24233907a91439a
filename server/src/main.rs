use hookball_server::config::ServerConfig;
use hookball_server::game_loop::{run_game_loop, GameBroadcast, GameCommand};
use hookball_server::ws::{router, AppState};
use hookball_shared::config::ArenaConfig;
use tokio::sync::{broadcast, mpsc};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ServerConfig::from_env();
    let arena_config = ArenaConfig::default();

    // Validate configuration before starting
    if let Err(e) = config.validate().and_then(|_| arena_config.validate()) {
        tracing::error!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();
    let static_dir = config.static_dir.clone();

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let (broadcast_tx, _) = broadcast::channel::<GameBroadcast>(64);

    // Spawn game loop
    let bc_tx = broadcast_tx.clone();
    tokio::spawn(async move {
        run_game_loop(game_rx, bc_tx, config, arena_config).await;
    });

    let app = router(
        AppState {
            game_tx,
            broadcast_tx,
        },
        &static_dir,
    );

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", listen_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Hookball server listening on {}", listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
