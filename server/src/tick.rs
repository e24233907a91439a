use crate::arena::Arena;
use crate::hook::hook_force;
use crate::physics::PhysicsEngine;
use hookball_shared::vec2::{self, Vec2};

/// Advance the world by one step: engine integration and contacts first,
/// then hook forces (consumed by the following step) and speed clamping.
pub fn advance(arena: &Arena, engine: &mut impl PhysicsEngine, dt_ms: f64) {
    engine.step(dt_ms);
    apply_hooks_and_clamp(arena, engine);
}

/// Per-player hook force and speed cap, run after the engine step.
pub fn apply_hooks_and_clamp(arena: &Arena, engine: &mut impl PhysicsEngine) {
    let config = &arena.config;

    for player in arena.players() {
        let Some(position) = engine.position(player.body) else {
            continue;
        };

        if let Some(target) = player.hook.target().and_then(|i| arena.pillar(i)) {
            let force = hook_force(
                position,
                target.position,
                config.hook_strength,
                config.hook_max,
            );
            engine.apply_force(player.body, position, force);
        }

        if let Some(velocity) = engine.velocity(player.body) {
            if let Some(clamped) = clamp_speed(velocity, config.max_speed) {
                engine.set_velocity(player.body, clamped);
            }
        }
    }
}

/// Rescale `velocity` to `max_speed` when it is faster, keeping its direction.
/// `None` when no clamp is needed.
pub fn clamp_speed(velocity: Vec2, max_speed: f64) -> Option<Vec2> {
    let speed = vec2::length(velocity);
    if speed > max_speed {
        Some(vec2::scale(vec2::normalize(velocity), max_speed))
    } else {
        None
    }
}
