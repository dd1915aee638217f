//! Rigid-body space
//!
//! A small impulse solver tailored to the game: circles and axis-aligned
//! boxes, dynamic/kinematic/static bodies, and tagged contact reporting.
//! Contacts are returned from [`Space::step`] instead of being delivered
//! through callbacks, so the game can mutate the space once the step is done.

pub mod body;
pub mod shape;
pub mod space;

pub use body::{Body, BodyDesc, BodyHandle, BodyKind, CollisionTag};
pub use shape::{Manifold, Shape, collide};
pub use space::{Contact, Space};
