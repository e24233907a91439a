use crate::physics::{BodyDesc, BodyHandle, PhysicsEngine};
use hookball_shared::config::ArenaConfig;
use hookball_shared::vec2::Vec2;
use rand::Rng;
use std::collections::BTreeMap;

pub type PlayerId = u32;

/// Fixed obstacle players can hook onto. Never mutated after startup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pillar {
    pub position: Vec2,
    pub radius: f64,
}

/// Hook state of a player. The target is an index into the arena's pillar list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookState {
    #[default]
    Unhooked,
    Hooked { pillar: usize },
}

impl HookState {
    pub fn is_hooked(&self) -> bool {
        matches!(self, HookState::Hooked { .. })
    }

    pub fn target(&self) -> Option<usize> {
        match self {
            HookState::Hooked { pillar } => Some(*pillar),
            HookState::Unhooked => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub body: BodyHandle,
    pub hook: HookState,
    pub score: u32,
}

/// Players plus the immutable pillar list.
///
/// Players and their engine bodies are only created and destroyed through
/// [`Arena::spawn_player`] and [`Arena::despawn_player`], which keeps a body
/// registered exactly while its player is in the map.
pub struct Arena {
    pub config: ArenaConfig,
    pillars: Vec<Pillar>,
    players: BTreeMap<PlayerId, Player>,
}

impl Arena {
    pub fn new(config: ArenaConfig, pillars: Vec<Pillar>) -> Self {
        Self {
            config,
            pillars,
            players: BTreeMap::new(),
        }
    }

    /// Scatter `config.pillar_count` pillars uniformly over the world.
    pub fn generate(config: ArenaConfig, rng: &mut impl Rng) -> Self {
        let pillars = (0..config.pillar_count)
            .map(|_| Pillar {
                position: random_point(&config, rng),
                radius: config.pillar_radius,
            })
            .collect();
        Self::new(config, pillars)
    }

    /// Register every pillar as a static body.
    pub fn register_pillars(&self, engine: &mut impl PhysicsEngine) {
        for pillar in &self.pillars {
            engine.create_body(BodyDesc::fixed(pillar.position, pillar.radius));
        }
    }

    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    pub fn pillar(&self, index: usize) -> Option<&Pillar> {
        self.pillars.get(index)
    }

    /// Players in ascending id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    /// A player together with the pillar list, for updating its hook.
    pub fn player_with_pillars_mut(&mut self, id: PlayerId) -> Option<(&mut Player, &[Pillar])> {
        let player = self.players.get_mut(&id)?;
        Some((player, &self.pillars))
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Create a player and its backing body at `position`.
    /// Returns false if the id is already taken.
    pub fn spawn_player(
        &mut self,
        engine: &mut impl PhysicsEngine,
        id: PlayerId,
        position: Vec2,
    ) -> bool {
        if self.players.contains_key(&id) {
            return false;
        }
        let desc = BodyDesc::dynamic(position, self.config.player_radius).with_material(
            self.config.player_restitution,
            self.config.player_friction,
            self.config.player_air_friction,
        );
        let body = engine.create_body(desc);
        self.players.insert(
            id,
            Player {
                id,
                body,
                hook: HookState::Unhooked,
                score: 0,
            },
        );
        true
    }

    /// Remove a player and its body. Idempotent.
    pub fn despawn_player(
        &mut self,
        engine: &mut impl PhysicsEngine,
        id: PlayerId,
    ) -> Option<Player> {
        let player = self.players.remove(&id)?;
        engine.remove_body(player.body);
        Some(player)
    }

    pub fn random_spawn_point(&self, rng: &mut impl Rng) -> Vec2 {
        random_point(&self.config, rng)
    }
}

fn random_point(config: &ArenaConfig, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.gen::<f64>() * config.world_width,
        rng.gen::<f64>() * config.world_height,
    )
}
