//! Bodies, handles and collision tags

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::Shape;

/// Stable identifier of a body inside a [`super::Space`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub(crate) u32);

impl BodyHandle {
    pub fn id(self) -> u32 {
        self.0
    }
}

/// How a body takes part in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyKind {
    /// Moved by forces and impulses
    #[default]
    Dynamic,
    /// Moved only by its own velocity, infinite mass
    Kinematic,
    /// Never moves
    Static,
}

/// Classification attached to a body, used to route contacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u16)]
pub enum CollisionTag {
    #[default]
    None = 0,
    Bar = 1,
    Ball = 2,
    Brick = 3,
    Wall = 4,
    Limit = 5,
    PowerUp = 6,
}

impl CollisionTag {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Construction parameters for a body
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    pub moment: f32,
    pub infinite_moment: bool,
    pub friction: f32,
    pub elasticity: f32,
    pub tag: CollisionTag,
    /// Sensors report contacts but never push or get pushed
    pub sensor: bool,
}

impl BodyDesc {
    pub fn new(kind: BodyKind, shape: Shape) -> Self {
        Self {
            kind,
            shape,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 1.0,
            moment: 1.0,
            infinite_moment: false,
            friction: 0.0,
            elasticity: 0.0,
            tag: CollisionTag::None,
            sensor: false,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_moment(mut self, moment: f32, infinite: bool) -> Self {
        self.moment = moment;
        self.infinite_moment = infinite;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_elasticity(mut self, elasticity: f32) -> Self {
        self.elasticity = elasticity;
        self
    }

    pub fn with_tag(mut self, tag: CollisionTag) -> Self {
        self.tag = tag;
        self
    }

    pub fn sensor(mut self) -> Self {
        self.sensor = true;
        self
    }
}

/// A body living in a space
///
/// Rotation is not simulated: `angle` is carried for rendering and the
/// inspector, and `moment` only matters to callers that read it back.
#[derive(Debug, Clone)]
pub struct Body {
    handle: BodyHandle,
    kind: BodyKind,
    shape: Shape,
    pub position: Vec2,
    pub velocity: Vec2,
    force: Vec2,
    pub angle: f32,
    mass: f32,
    moment: f32,
    pub infinite_moment: bool,
    pub friction: f32,
    pub elasticity: f32,
    pub tag: CollisionTag,
    pub sensor: bool,
    pub visible: bool,
}

impl Body {
    pub(crate) fn from_desc(handle: BodyHandle, desc: BodyDesc) -> Self {
        Self {
            handle,
            kind: desc.kind,
            shape: desc.shape,
            position: desc.position,
            velocity: desc.velocity,
            force: Vec2::ZERO,
            angle: 0.0,
            mass: desc.mass.max(f32::EPSILON),
            moment: desc.moment,
            infinite_moment: desc.infinite_moment,
            friction: desc.friction,
            elasticity: desc.elasticity,
            tag: desc.tag,
            sensor: desc.sensor,
            visible: true,
        }
    }

    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Set mass (must stay positive)
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass.max(f32::EPSILON);
    }

    pub fn moment(&self) -> f32 {
        self.moment
    }

    pub fn set_moment(&mut self, moment: f32) {
        self.moment = moment;
    }

    /// Inverse mass used by the solver (zero for kinematic and static bodies)
    pub fn inverse_mass(&self) -> f32 {
        match self.kind {
            BodyKind::Dynamic => 1.0 / self.mass,
            BodyKind::Kinematic | BodyKind::Static => 0.0,
        }
    }

    /// Replace the accumulated force (cleared after every step)
    pub fn set_force(&mut self, force: Vec2) {
        self.force = force;
    }

    pub fn force(&self) -> Vec2 {
        self.force
    }

    pub(crate) fn clear_force(&mut self) {
        self.force = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip_values() {
        assert_eq!(CollisionTag::Bar.as_u16(), 1);
        assert_eq!(CollisionTag::PowerUp.as_u16(), 6);
        assert_eq!(CollisionTag::Limit.as_u16(), 5);
    }

    #[test]
    fn test_static_bodies_have_no_inverse_mass() {
        let desc = BodyDesc::new(BodyKind::Static, Shape::rect(10.0, 10.0)).with_mass(5.0);
        let body = Body::from_desc(BodyHandle(1), desc);
        assert_eq!(body.inverse_mass(), 0.0);

        let desc = BodyDesc::new(BodyKind::Dynamic, Shape::circle(4.0)).with_mass(4.0);
        let body = Body::from_desc(BodyHandle(2), desc);
        assert!((body.inverse_mass() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_moment_and_infinite_flag() {
        let desc = BodyDesc::new(BodyKind::Dynamic, Shape::circle(4.0)).with_moment(0.5, true);
        let mut body = Body::from_desc(BodyHandle(1), desc);
        assert!(body.infinite_moment);
        assert_eq!(body.moment(), 0.5);
        body.set_moment(2.0);
        assert_eq!(body.moment(), 2.0);
    }
}
