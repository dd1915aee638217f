//! Collision shapes and narrow-phase tests
//!
//! Boxes are axis-aligned: every box in the stage (walls, bricks, bar,
//! capsules) is upright, so rotation never enters the contact math.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision geometry, centred on the body position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Box { half: Vec2 },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    /// Box from full width and height
    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Box {
            half: Vec2::new(width / 2.0, height / 2.0),
        }
    }

    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Box { half } => half,
        }
    }

    pub fn width(&self) -> f32 {
        self.half_extents().x * 2.0
    }

    pub fn height(&self) -> f32 {
        self.half_extents().y * 2.0
    }
}

/// Contact information for an overlapping pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vec2,
    /// Overlap depth along the normal
    pub depth: f32,
}

/// Test two shapes for overlap
pub fn collide(pos_a: Vec2, a: &Shape, pos_b: Vec2, b: &Shape) -> Option<Manifold> {
    match (*a, *b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(pos_a, ra, pos_b, rb)
        }
        (Shape::Circle { radius }, Shape::Box { half }) => {
            circle_box(pos_a, radius, pos_b, half)
        }
        (Shape::Box { half }, Shape::Circle { radius }) => {
            circle_box(pos_b, radius, pos_a, half).map(|m| Manifold {
                normal: -m.normal,
                ..m
            })
        }
        (Shape::Box { half: ha }, Shape::Box { half: hb }) => box_box(pos_a, ha, pos_b, hb),
    }
}

fn circle_circle(pa: Vec2, ra: f32, pb: Vec2, rb: f32) -> Option<Manifold> {
    let delta = pb - pa;
    let dist = delta.length();
    let sum = ra + rb;
    if dist >= sum {
        return None;
    }
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::Y };
    Some(Manifold {
        normal,
        depth: sum - dist,
    })
}

/// Circle (first) against box (second); normal points from circle to box
fn circle_box(center: Vec2, radius: f32, box_pos: Vec2, half: Vec2) -> Option<Manifold> {
    let d = center - box_pos;
    let inside = d.x.abs() <= half.x && d.y.abs() <= half.y;

    if inside {
        // Center buried in the box: push out along the shallowest axis
        let ox = half.x - d.x.abs();
        let oy = half.y - d.y.abs();
        let (outward, depth) = if ox < oy {
            let sx = if d.x >= 0.0 { 1.0 } else { -1.0 };
            (Vec2::new(sx, 0.0), radius + ox)
        } else {
            let sy = if d.y >= 0.0 { 1.0 } else { -1.0 };
            (Vec2::new(0.0, sy), radius + oy)
        };
        return Some(Manifold {
            normal: -outward,
            depth,
        });
    }

    let closest = box_pos + d.clamp(-half, half);
    let delta = center - closest;
    let dist = delta.length();
    if dist >= radius {
        return None;
    }
    let outward = delta / dist.max(1e-6);
    Some(Manifold {
        normal: -outward,
        depth: radius - dist,
    })
}

fn box_box(pa: Vec2, ha: Vec2, pb: Vec2, hb: Vec2) -> Option<Manifold> {
    let d = pb - pa;
    let ox = ha.x + hb.x - d.x.abs();
    let oy = ha.y + hb.y - d.y.abs();
    if ox <= 0.0 || oy <= 0.0 {
        return None;
    }
    let (normal, depth) = if ox < oy {
        (Vec2::new(if d.x >= 0.0 { 1.0 } else { -1.0 }, 0.0), ox)
    } else {
        (Vec2::new(0.0, if d.y >= 0.0 { 1.0 } else { -1.0 }), oy)
    };
    Some(Manifold { normal, depth })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_above_box() {
        let ball = Shape::circle(8.0);
        let brick = Shape::rect(46.0, 26.0);

        // Ball 5px above the brick top edge
        let hit = collide(Vec2::new(0.0, -13.0 - 5.0), &ball, Vec2::ZERO, &brick);
        let m = hit.expect("overlap expected");
        assert!((m.depth - 3.0).abs() < 1e-4);
        // Normal points from ball (above, smaller y) down into the brick
        assert!((m.normal - Vec2::Y).length() < 1e-4);

        let miss = collide(Vec2::new(0.0, -13.0 - 9.0), &ball, Vec2::ZERO, &brick);
        assert!(miss.is_none());
    }

    #[test]
    fn test_circle_corner_miss() {
        let ball = Shape::circle(8.0);
        let brick = Shape::rect(20.0, 20.0);
        // Diagonal from the corner at distance > radius
        let pos = Vec2::new(10.0 + 6.0, 10.0 + 6.0);
        assert!(collide(pos, &ball, Vec2::ZERO, &brick).is_none());
        let pos = Vec2::new(10.0 + 5.0, 10.0 + 5.0);
        assert!(collide(pos, &ball, Vec2::ZERO, &brick).is_some());
    }

    #[test]
    fn test_box_circle_flips_normal() {
        let ball = Shape::circle(8.0);
        let wall = Shape::rect(20.0, 700.0);
        let ball_pos = Vec2::new(15.0, 0.0);
        let a = collide(ball_pos, &ball, Vec2::ZERO, &wall).unwrap();
        let b = collide(Vec2::ZERO, &wall, ball_pos, &ball).unwrap();
        assert!((a.normal + b.normal).length() < 1e-5);
        assert!((a.depth - b.depth).abs() < 1e-5);
    }

    #[test]
    fn test_buried_circle_pushes_along_shallow_axis() {
        let ball = Shape::circle(4.0);
        let wall = Shape::rect(100.0, 20.0);
        // Center inside the box, close to its bottom edge
        let m = collide(Vec2::new(0.0, 8.0), &ball, Vec2::ZERO, &wall).unwrap();
        // Outward is +y, so normal (circle -> box) is -y
        assert!((m.normal - Vec2::NEG_Y).length() < 1e-5);
        assert!((m.depth - (4.0 + 2.0)).abs() < 1e-5);
    }

    #[test]
    fn test_box_box_overlap() {
        let a = Shape::rect(100.0, 20.0);
        let b = Shape::rect(30.0, 14.0);
        let m = collide(Vec2::ZERO, &a, Vec2::new(10.0, 15.0), &b).unwrap();
        assert_eq!(m.normal, Vec2::Y);
        assert!((m.depth - 2.0).abs() < 1e-5);
        assert!(collide(Vec2::ZERO, &a, Vec2::new(0.0, 40.0), &b).is_none());
    }
}
