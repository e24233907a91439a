use crate::physics::{BodyDesc, BodyHandle, PhysicsEngine};
use hookball_shared::vec2::{self, Vec2};

/// Mass per unit area of dynamic bodies
const DENSITY: f64 = 0.001;

/// Penetration allowed before positional correction kicks in
const CONTACT_SLOP: f64 = 0.05;

/// Fraction of the remaining penetration corrected per step
const POSITION_CORRECTION: f64 = 0.8;

#[derive(Debug, Clone)]
struct Body {
    position: Vec2,
    velocity: Vec2,
    force: Vec2,
    /// Contact impulse from the last step, folded into `velocity` on the next one
    pending_impulse: Vec2,
    inv_mass: f64,
    radius: f64,
    restitution: f64,
    friction: f64,
    air_friction: f64,
    is_static: bool,
}

impl Body {
    fn from_desc(desc: BodyDesc) -> Self {
        let inv_mass = if desc.is_static {
            0.0
        } else {
            let area = std::f64::consts::PI * desc.radius * desc.radius;
            1.0 / (DENSITY * area)
        };
        Self {
            position: desc.position,
            velocity: Vec2::ZERO,
            force: Vec2::ZERO,
            pending_impulse: Vec2::ZERO,
            inv_mass,
            radius: desc.radius,
            restitution: desc.restitution,
            friction: desc.friction,
            air_friction: desc.air_friction,
            is_static: desc.is_static,
        }
    }
}

/// Zero-gravity world of circular bodies.
///
/// Velocities are in units per step. Each step folds in the contact impulses
/// of the previous step, integrates accumulated forces (`Δv = F / m · dt²`),
/// applies air drag, moves bodies, then resolves circle contacts with partial
/// positional correction. Contacts are not fully separated in one step, so
/// bodies that hit each other are still overlapping when the step returns.
///
/// The restitution and friction impulse of a contact is only queued: after a
/// step, `velocity` still reports the speed each body had at impact, and the
/// bounce shows up on the following step.
#[derive(Default)]
pub struct ArenaWorld {
    /// Sorted by handle; handles are allocated monotonically
    bodies: Vec<(BodyHandle, Body)>,
    next_handle: u32,
}

impl ArenaWorld {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        self.bodies.binary_search_by_key(&handle, |(h, _)| *h).ok()
    }

    fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.index_of(handle).map(|i| &self.bodies[i].1)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.index_of(handle).map(|i| &mut self.bodies[i].1)
    }

    fn integrate(&mut self, dt_ms: f64) {
        let dt_sq = dt_ms * dt_ms;
        for (_, body) in self.bodies.iter_mut() {
            if body.is_static {
                body.force = Vec2::ZERO;
                body.pending_impulse = Vec2::ZERO;
                continue;
            }
            let bounced = vec2::add(body.velocity, body.pending_impulse);
            body.pending_impulse = Vec2::ZERO;
            let damped = vec2::scale(bounced, 1.0 - body.air_friction);
            let accel = vec2::scale(body.force, body.inv_mass * dt_sq);
            body.velocity = vec2::add(damped, accel);
            body.position = vec2::add(body.position, body.velocity);
            body.force = Vec2::ZERO;
        }
    }

    fn resolve_contacts(&mut self) {
        let n = self.bodies.len();
        for j in 1..n {
            let (left, right) = self.bodies.split_at_mut(j);
            let b = &mut right[0].1;
            for (_, a) in left.iter_mut() {
                if a.is_static && b.is_static {
                    continue;
                }
                resolve_pair(a, b);
            }
        }
    }
}

fn resolve_pair(a: &mut Body, b: &mut Body) {
    let delta = vec2::sub(b.position, a.position);
    let dist = vec2::length(delta);
    let min_dist = a.radius + b.radius;
    if dist >= min_dist {
        return;
    }

    let inv_sum = a.inv_mass + b.inv_mass;
    if inv_sum == 0.0 {
        return;
    }

    // Coincident centers: push apart along +x
    let normal = if dist < 1e-10 {
        Vec2::new(1.0, 0.0)
    } else {
        vec2::scale(delta, 1.0 / dist)
    };

    let penetration = min_dist - dist;
    let correction = (penetration - CONTACT_SLOP).max(0.0) * POSITION_CORRECTION / inv_sum;
    a.position = vec2::sub(a.position, vec2::scale(normal, correction * a.inv_mass));
    b.position = vec2::add(b.position, vec2::scale(normal, correction * b.inv_mass));

    let relative = vec2::sub(
        vec2::add(b.velocity, b.pending_impulse),
        vec2::add(a.velocity, a.pending_impulse),
    );
    let vn = vec2::dot(relative, normal);
    if vn >= 0.0 {
        // Already separating
        return;
    }

    let restitution = a.restitution.max(b.restitution);
    let j = -(1.0 + restitution) * vn / inv_sum;
    let impulse = vec2::scale(normal, j);

    let tangent = Vec2::new(-normal.y, normal.x);
    let vt = vec2::dot(relative, tangent);
    let friction = a.friction.min(b.friction);
    let jt = (-vt / inv_sum).clamp(-friction * j, friction * j);
    let total = vec2::add(impulse, vec2::scale(tangent, jt));
    a.pending_impulse = vec2::sub(a.pending_impulse, vec2::scale(total, a.inv_mass));
    b.pending_impulse = vec2::add(b.pending_impulse, vec2::scale(total, b.inv_mass));
}

impl PhysicsEngine for ArenaWorld {
    fn create_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        self.bodies.push((handle, Body::from_desc(desc)));
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if let Some(i) = self.index_of(handle) {
            self.bodies.remove(i);
        }
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.index_of(handle).is_some()
    }

    fn step(&mut self, dt_ms: f64) {
        self.integrate(dt_ms);
        self.resolve_contacts();
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| b.position)
    }

    fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| b.velocity)
    }

    fn apply_force(&mut self, handle: BodyHandle, _at: Vec2, force: Vec2) {
        // Point of application only matters for torque, and bodies never rotate
        if let Some(body) = self.body_mut(handle) {
            if !body.is_static {
                body.force = vec2::add(body.force, force);
            }
        }
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            if !body.is_static {
                body.velocity = velocity;
            }
        }
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}
