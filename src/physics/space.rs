//! Simulation space: integration, contact solving and begin-contact reporting

use std::collections::HashSet;

use glam::Vec2;

use super::body::{Body, BodyDesc, BodyHandle, BodyKind, CollisionTag};
use super::shape::{Manifold, collide};

/// Largest distance any body may travel inside one solver substep
const MAX_SUBSTEP_DISTANCE: f32 = 4.0;
/// Upper bound on solver substeps per step
const MAX_SOLVER_SUBSTEPS: u32 = 16;

/// A pair that started touching during the last step
///
/// `a` and `b` are ordered to match the registered handler, so a handler
/// added as `(Ball, Brick)` always reports the ball as `a`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: BodyHandle,
    pub b: BodyHandle,
    pub tag_a: CollisionTag,
    pub tag_b: CollisionTag,
}

/// Pair key, smaller id first
type PairKey = (u32, u32);

/// Container for all bodies and the contact state between them
#[derive(Debug, Clone)]
pub struct Space {
    gravity: Vec2,
    damping: f32,
    /// Sorted by handle id for deterministic iteration
    bodies: Vec<Body>,
    handlers: Vec<(CollisionTag, CollisionTag)>,
    touching: HashSet<PairKey>,
    next_id: u32,
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl Space {
    pub fn new() -> Self {
        Self {
            gravity: Vec2::ZERO,
            damping: 1.0,
            bodies: Vec::new(),
            handlers: Vec::new(),
            touching: HashSet::new(),
            next_id: 1,
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Fraction of velocity kept per second (1 = no damping)
    pub fn damping(&self) -> f32 {
        self.damping
    }

    pub fn set_damping(&mut self, damping: f32) {
        self.damping = damping.clamp(0.0, 1.0);
    }

    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.push(Body::from_desc(handle, desc));
        handle
    }

    /// Remove a body; removing an unknown handle is a no-op
    pub fn remove_body(&mut self, handle: BodyHandle) -> Option<Body> {
        let idx = self.index_of(handle)?;
        let id = handle.id();
        self.touching.retain(|&(a, b)| a != id && b != id);
        Some(self.bodies.remove(idx))
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.index_of(handle).map(|i| &self.bodies[i])
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.index_of(handle).map(move |i| &mut self.bodies[i])
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.index_of(handle).is_some()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        self.bodies
            .binary_search_by_key(&handle.id(), |b| b.handle().id())
            .ok()
    }

    /// Report begin contacts between bodies tagged `a` and `b`
    pub fn add_collision_handler(&mut self, a: CollisionTag, b: CollisionTag) {
        if self.handler_order(a, b).is_none() {
            self.handlers.push((a, b));
        }
    }

    pub fn has_collision_handler(&self, a: CollisionTag, b: CollisionTag) -> bool {
        self.handler_order(a, b).is_some()
    }

    /// `Some(false)` if the pair matches a handler as given, `Some(true)` if swapped
    fn handler_order(&self, a: CollisionTag, b: CollisionTag) -> Option<bool> {
        self.handlers.iter().find_map(|&(ha, hb)| {
            if ha == a && hb == b {
                Some(false)
            } else if ha == b && hb == a {
                Some(true)
            } else {
                None
            }
        })
    }

    /// Advance the space by `dt` seconds and return contacts that began
    pub fn step(&mut self, dt: f32) -> Vec<Contact> {
        if dt <= 0.0 {
            return Vec::new();
        }

        // Velocity integration (once per step)
        let damping = self.damping.powf(dt);
        for body in &mut self.bodies {
            if body.kind() == BodyKind::Dynamic {
                let accel = self.gravity + body.force() * body.inverse_mass();
                body.velocity = body.velocity * damping + accel * dt;
            }
            body.clear_force();
        }

        // Substep so fast bodies cannot skip through thin ones
        let max_travel = self
            .bodies
            .iter()
            .filter(|b| b.kind() != BodyKind::Static)
            .map(|b| b.velocity.length() * dt)
            .fold(0.0_f32, f32::max);
        let substeps = ((max_travel / MAX_SUBSTEP_DISTANCE).ceil() as u32).clamp(1, MAX_SOLVER_SUBSTEPS);
        let h = dt / substeps as f32;

        let mut touching_now: HashSet<PairKey> = HashSet::new();
        let mut began: Vec<PairKey> = Vec::new();

        for _ in 0..substeps {
            for body in &mut self.bodies {
                if body.kind() != BodyKind::Static {
                    body.position += body.velocity * h;
                }
            }

            for key in solve_overlaps(&mut self.bodies) {
                if touching_now.insert(key) && !self.touching.contains(&key) {
                    began.push(key);
                }
            }
        }

        let mut contacts = Vec::new();
        for (id_a, id_b) in began {
            let (Some(a), Some(b)) = (self.body(BodyHandle(id_a)), self.body(BodyHandle(id_b)))
            else {
                continue;
            };
            log::debug!("COLLISION {} {}", a.tag.as_u16(), b.tag.as_u16());

            let Some(swapped) = self.handler_order(a.tag, b.tag) else {
                continue;
            };
            let contact = if swapped {
                Contact {
                    a: b.handle(),
                    b: a.handle(),
                    tag_a: b.tag,
                    tag_b: a.tag,
                }
            } else {
                Contact {
                    a: a.handle(),
                    b: b.handle(),
                    tag_a: a.tag,
                    tag_b: b.tag,
                }
            };
            contacts.push(contact);
        }

        self.touching = touching_now;
        contacts
    }
}

/// Detect and resolve every overlapping pair; returns the overlapping pairs
fn solve_overlaps(bodies: &mut [Body]) -> Vec<PairKey> {
    let mut overlaps = Vec::new();
    for j in 1..bodies.len() {
        let (left, right) = bodies.split_at_mut(j);
        let b = &mut right[0];
        for a in left.iter_mut() {
            if a.kind() != BodyKind::Dynamic && b.kind() != BodyKind::Dynamic {
                continue;
            }
            let Some(manifold) = collide(a.position, a.shape(), b.position, b.shape()) else {
                continue;
            };
            if !a.sensor && !b.sensor {
                resolve(a, b, &manifold);
            }
            overlaps.push((a.handle().id(), b.handle().id()));
        }
    }
    overlaps
}

/// Positional correction plus normal and friction impulses
fn resolve(a: &mut Body, b: &mut Body, m: &Manifold) {
    let inv_a = a.inverse_mass();
    let inv_b = b.inverse_mass();
    let inv_sum = inv_a + inv_b;
    if inv_sum <= 0.0 {
        return;
    }

    let n = m.normal;
    let correction = n * (m.depth / inv_sum);
    a.position -= correction * inv_a;
    b.position += correction * inv_b;

    let rel = b.velocity - a.velocity;
    let vn = rel.dot(n);
    if vn >= 0.0 {
        return; // Already separating
    }

    let restitution = a.elasticity * b.elasticity;
    let j = -(1.0 + restitution) * vn / inv_sum;
    let impulse = n * j;
    a.velocity -= impulse * inv_a;
    b.velocity += impulse * inv_b;

    // Coulomb friction along the contact tangent
    let rel = b.velocity - a.velocity;
    let tangential = rel - n * rel.dot(n);
    if tangential.length_squared() > 1e-8 {
        let t = tangential.normalize();
        let mu = a.friction * b.friction;
        let jt = (-rel.dot(t) / inv_sum).clamp(-j * mu, j * mu);
        let friction_impulse = t * jt;
        a.velocity -= friction_impulse * inv_a;
        b.velocity += friction_impulse * inv_b;
    }
}
