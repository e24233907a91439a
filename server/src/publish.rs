use crate::arena::{Arena, PlayerId};
use crate::physics::PhysicsEngine;
use hookball_shared::protocol::{InitMsg, PillarWire, PlayerStateWire, PointWire, StateMsg};

/// Per-tick snapshot of every surviving player, in arena order.
/// Players without a registered body are left out.
pub fn build_state(arena: &Arena, engine: &impl PhysicsEngine) -> StateMsg {
    let players = arena
        .players()
        .filter_map(|p| {
            let position = engine.position(p.body)?;
            let velocity = engine.velocity(p.body)?;
            let hook_target = p
                .hook
                .target()
                .and_then(|i| arena.pillar(i))
                .map(|pillar| PointWire {
                    x: pillar.position.x,
                    y: pillar.position.y,
                });
            Some(PlayerStateWire {
                id: p.id,
                x: position.x,
                y: position.y,
                vx: velocity.x,
                vy: velocity.y,
                hooked: p.hook.is_hooked(),
                hook_target,
                score: p.score,
            })
        })
        .collect();

    StateMsg { players }
}

/// Message sent once to a newly connected player.
pub fn build_init(arena: &Arena, id: PlayerId) -> InitMsg {
    InitMsg {
        id,
        world_width: arena.config.world_width,
        world_height: arena.config.world_height,
        pillars: arena
            .pillars()
            .iter()
            .map(|p| PillarWire {
                x: p.position.x,
                y: p.position.y,
                radius: p.radius,
            })
            .collect(),
    }
}
