use std::env;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub tick_rate_hz: u32,
    /// Seed for pillar layout and spawn points; random when unset
    pub rng_seed: Option<u64>,
    /// Directory served for every non-websocket path
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3000".to_string(),
            tick_rate_hz: 60,
            rng_seed: None,
            static_dir: "public".to_string(),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

impl ServerConfig {
    /// Defaults overridden by `LISTEN_ADDR` (or `PORT`), `TICK_RATE_HZ`,
    /// `RNG_SEED` and `STATIC_DIR`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let listen_addr = env::var("LISTEN_ADDR").ok().unwrap_or_else(|| {
            match env_parse::<u16>("PORT") {
                Some(port) => format!("0.0.0.0:{}", port),
                None => defaults.listen_addr.clone(),
            }
        });

        Self {
            listen_addr,
            tick_rate_hz: env_parse("TICK_RATE_HZ").unwrap_or(defaults.tick_rate_hz),
            rng_seed: env_parse("RNG_SEED").or(defaults.rng_seed),
            static_dir: env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.trim().is_empty() {
            return Err("listen_addr must not be empty".to_string());
        }
        if self.tick_rate_hz == 0 || self.tick_rate_hz > 1000 {
            return Err("tick_rate_hz must be within 1..=1000".to_string());
        }
        Ok(())
    }

    /// Engine step length in milliseconds
    pub fn tick_ms(&self) -> f64 {
        1000.0 / self.tick_rate_hz as f64
    }
}
