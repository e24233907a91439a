//! Load test for the hookball server.
//!
//! Spawns multiple fake WebSocket clients that:
//! - Connect to the server and wait for `init`
//! - Periodically hook a random pillar or release the hook
//! - Receive and count `state` broadcasts and eliminations
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --clients N      Number of clients to spawn (default: 50)
//!   --duration S     Test duration in seconds (default: 30)
//!   --hook-rate R    Hook/release messages per second per client (default: 2)
//!   --url URL        Server URL (default: ws://127.0.0.1:3000/ws)

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

// === Protocol types (minimal subset) ===

#[derive(Serialize)]
#[serde(tag = "type", rename = "hook")]
struct HookOut {
    #[serde(skip_serializing_if = "Option::is_none")]
    release: Option<bool>,
    #[serde(rename = "mouseX", skip_serializing_if = "Option::is_none")]
    mouse_x: Option<f64>,
    #[serde(rename = "mouseY", skip_serializing_if = "Option::is_none")]
    mouse_y: Option<f64>,
}

#[derive(Deserialize)]
struct PillarIn {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ServerMsg {
    #[serde(rename = "init")]
    Init { pillars: Vec<PillarIn> },
    #[serde(rename = "state")]
    State { players: Vec<serde_json::Value> },
    #[serde(rename = "eliminated")]
    Eliminated,
}

// === Metrics ===

#[derive(Default)]
struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    states_received: AtomicU64,
    players_seen: AtomicU64,
    eliminations: AtomicU64,
    hooks_sent: AtomicU64,
    errors: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

// === Client task ===

async fn run_client(
    client_id: u32,
    url: String,
    hook_rate: f64,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    metrics
        .latency_sum_ms
        .fetch_add(connect_start.elapsed().as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    // Wait for init before doing anything else
    let init = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                    if let Ok(ServerMsg::Init { pillars }) = serde_json::from_str(&text) {
                        return Some(pillars);
                    }
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                _ => {}
            }
        }
        None
    })
    .await;

    let pillars = match init {
        Ok(Some(pillars)) => pillars,
        _ => {
            if client_id < 3 {
                eprintln!("Client {} never got init", client_id);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            metrics.connected.fetch_sub(1, Ordering::Relaxed);
            return;
        }
    };

    let hook_interval = if hook_rate > 0.0 {
        Duration::from_secs_f64(1.0 / hook_rate)
    } else {
        Duration::from_secs(3600) // Effectively never
    };
    let mut hook_timer = tokio::time::interval(hook_interval);
    hook_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let test_end = Instant::now() + duration;
    let mut rng_state: u64 = client_id as u64 * 12345 + 67890;
    let mut hooked = false;

    loop {
        if Instant::now() >= test_end {
            break;
        }

        tokio::select! {
            _ = hook_timer.tick() => {
                // Simple LCG to pick a pillar to aim at
                rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
                let msg = if hooked || pillars.is_empty() {
                    HookOut { release: Some(true), mouse_x: None, mouse_y: None }
                } else {
                    let pillar = &pillars[(rng_state >> 33) as usize % pillars.len()];
                    HookOut { release: None, mouse_x: Some(pillar.x), mouse_y: Some(pillar.y) }
                };
                hooked = !hooked;

                let Ok(json) = serde_json::to_string(&msg) else {
                    continue;
                };
                if ws.send(Message::Text(json.into())).await.is_ok() {
                    metrics.hooks_sent.fetch_add(1, Ordering::Relaxed);
                } else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::State { players }) => {
                                metrics.states_received.fetch_add(1, Ordering::Relaxed);
                                metrics.players_seen.fetch_add(players.len() as u64, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Eliminated) => {
                                metrics.eliminations.fetch_add(1, Ordering::Relaxed);
                            }
                            _ => {}
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        if client_id < 3 {
                            eprintln!("Client {} error: {}", client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_clients: u32 = 50;
    let mut duration_secs: u64 = 30;
    let mut hook_rate: f64 = 2.0;
    let mut url = "ws://127.0.0.1:3000/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" => {
                i += 1;
                num_clients = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(50);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--hook-rate" => {
                i += 1;
                hook_rate = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(2.0);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    println!("=== Hookball Server Load Test ===");
    println!("Clients: {}", num_clients);
    println!("Duration: {}s", duration_secs);
    println!("Hook rate: {}/s per client", hook_rate);
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::default());
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(num_clients as usize);
    for client_id in 0..num_clients {
        let url = url.clone();
        let metrics = Arc::clone(&metrics);
        handles.push(tokio::spawn(async move {
            run_client(client_id, url, hook_rate, duration, metrics).await;
        }));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    // Print stats periodically
    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();
        loop {
            interval.tick().await;
            println!(
                "[{:3}s] connected={}, msgs={}, states={}, hooks={}, eliminated={}, errors={}",
                start.elapsed().as_secs(),
                metrics_clone.connected.load(Ordering::Relaxed),
                metrics_clone.messages_received.load(Ordering::Relaxed),
                metrics_clone.states_received.load(Ordering::Relaxed),
                metrics_clone.hooks_sent.load(Ordering::Relaxed),
                metrics_clone.eliminations.load(Ordering::Relaxed),
                metrics_clone.errors.load(Ordering::Relaxed),
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }
    stats_handle.abort();

    println!();
    println!("=== Final Results ===");
    let msgs = metrics.messages_received.load(Ordering::Relaxed);
    let states = metrics.states_received.load(Ordering::Relaxed);
    let players_seen = metrics.players_seen.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!("Total messages received: {}", msgs);
    println!("Total state messages: {}", states);
    println!("Total hook messages sent: {}", metrics.hooks_sent.load(Ordering::Relaxed));
    println!("Total eliminations: {}", metrics.eliminations.load(Ordering::Relaxed));
    println!("Total errors: {}", metrics.errors.load(Ordering::Relaxed));
    if states > 0 {
        println!("Average players per state: {}", players_seen / states);
    }
    if latency_count > 0 {
        println!("Average connect latency: {}ms", latency_sum / latency_count);
    }

    let states_per_client = states as f64 / num_clients.max(1) as f64;
    let expected = duration_secs as f64 * 60.0; // 60 Hz broadcast
    println!("States per client: {:.1}", states_per_client);
    println!("Delivery rate: {:.1}%", states_per_client / expected * 100.0);
}
