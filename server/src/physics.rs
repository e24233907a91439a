//! Boundary between the game rules and the rigid-body engine.
//!
//! The tick logic only reads positions/velocities and injects forces through
//! [`PhysicsEngine`], so it can be driven by the built-in
//! [`ArenaWorld`](crate::engine::ArenaWorld) or by a deterministic stub in tests.

use hookball_shared::vec2::Vec2;

/// Opaque handle to a body registered in an engine world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

/// Parameters for a new circular body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec2,
    pub radius: f64,
    pub restitution: f64,
    pub friction: f64,
    pub air_friction: f64,
    /// Static bodies never move and have infinite mass
    pub is_static: bool,
}

impl BodyDesc {
    pub fn dynamic(position: Vec2, radius: f64) -> Self {
        Self {
            position,
            radius,
            restitution: 0.0,
            friction: 0.1,
            air_friction: 0.01,
            is_static: false,
        }
    }

    pub fn fixed(position: Vec2, radius: f64) -> Self {
        Self {
            is_static: true,
            air_friction: 0.0,
            ..Self::dynamic(position, radius)
        }
    }

    pub fn with_material(mut self, restitution: f64, friction: f64, air_friction: f64) -> Self {
        self.restitution = restitution;
        self.friction = friction;
        self.air_friction = air_friction;
        self
    }
}

/// Operations the game rules need from a 2D rigid-body engine.
///
/// Velocities are expressed in world units per step, forces follow the
/// convention `Δv = F / m · dt²` and are consumed by the next [`step`](Self::step).
pub trait PhysicsEngine: Send {
    /// Create a body and register it in the world.
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Remove a body from the world. Unknown handles are ignored.
    fn remove_body(&mut self, handle: BodyHandle);

    fn contains(&self, handle: BodyHandle) -> bool;

    /// Advance the world by `dt_ms` milliseconds.
    fn step(&mut self, dt_ms: f64);

    fn position(&self, handle: BodyHandle) -> Option<Vec2>;

    fn velocity(&self, handle: BodyHandle) -> Option<Vec2>;

    /// Accumulate a force that takes effect on the next step.
    fn apply_force(&mut self, handle: BodyHandle, at: Vec2, force: Vec2);

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);

    fn body_count(&self) -> usize;
}
