use crate::arena::{Arena, PlayerId};
use crate::config::ServerConfig;
use crate::elimination::{resolve_eliminations, Elimination};
use crate::engine::ArenaWorld;
use crate::hook::{apply_hook_intent, HookIntent};
use crate::physics::PhysicsEngine;
use crate::publish::{build_init, build_state};
use crate::tick::advance;
use hookball_shared::config::ArenaConfig;
use hookball_shared::protocol::{InitMsg, StateMsg};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Central game state owned by the game loop task.
///
/// All mutation goes through `&mut self`, so joins, leaves and hook intents
/// can only land between ticks.
pub struct GameState<E: PhysicsEngine = ArenaWorld> {
    pub arena: Arena,
    engine: E,
    rng: ChaCha8Rng,
    next_player_id: PlayerId,
    tick_ms: f64,
}

impl GameState<ArenaWorld> {
    pub fn new(server_config: &ServerConfig, arena_config: ArenaConfig) -> Self {
        let seed = server_config.rng_seed.unwrap_or_else(rand::random);
        tracing::info!("Arena seed {}", seed);
        Self::with_engine(
            arena_config,
            ArenaWorld::new(),
            ChaCha8Rng::seed_from_u64(seed),
            server_config.tick_ms(),
        )
    }
}

impl<E: PhysicsEngine> GameState<E> {
    pub fn with_engine(
        arena_config: ArenaConfig,
        mut engine: E,
        mut rng: ChaCha8Rng,
        tick_ms: f64,
    ) -> Self {
        let arena = Arena::generate(arena_config, &mut rng);
        arena.register_pillars(&mut engine);
        Self {
            arena,
            engine,
            rng,
            next_player_id: 1,
            tick_ms,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Add a new player at a random position, returns (player_id, init message).
    /// Returns None only if every id is taken.
    pub fn add_player(&mut self) -> Option<(PlayerId, InitMsg)> {
        let id = self.allocate_id()?;
        let spawn = self.arena.random_spawn_point(&mut self.rng);
        if !self.arena.spawn_player(&mut self.engine, id, spawn) {
            return None;
        }
        Some((id, build_init(&self.arena, id)))
    }

    /// Next id not held by a live player. Ids wrap around.
    fn allocate_id(&mut self) -> Option<PlayerId> {
        for _ in 0..=self.arena.player_count() {
            let id = self.next_player_id;
            self.next_player_id = self.next_player_id.wrapping_add(1);
            if !self.arena.contains(id) {
                return Some(id);
            }
        }
        None
    }

    /// Remove a player and its body. Returns false if it was already gone
    /// (e.g. eliminated before the connection closed).
    pub fn remove_player(&mut self, id: PlayerId) -> bool {
        self.arena.despawn_player(&mut self.engine, id).is_some()
    }

    /// Apply a hook intent. Intents for unknown players are ignored.
    /// Returns true if the player's hook state changed.
    pub fn handle_hook(&mut self, id: PlayerId, intent: HookIntent) -> bool {
        let range = self.arena.config.hook_range;
        let Some(body) = self.arena.player(id).map(|p| p.body) else {
            return false;
        };
        let Some(position) = self.engine.position(body) else {
            return false;
        };
        match self.arena.player_with_pillars_mut(id) {
            Some((player, pillars)) => apply_hook_intent(player, position, pillars, intent, range),
            None => false,
        }
    }

    /// Run one tick: physics step, hook forces and speed cap, then eliminations.
    pub fn tick(&mut self) -> Vec<Elimination> {
        advance(&self.arena, &mut self.engine, self.tick_ms);
        resolve_eliminations(&mut self.arena, &mut self.engine)
    }

    /// Snapshot broadcast to every client after a tick
    pub fn state_msg(&self) -> StateMsg {
        build_state(&self.arena, &self.engine)
    }

    pub fn player_count(&self) -> usize {
        self.arena.player_count()
    }
}
