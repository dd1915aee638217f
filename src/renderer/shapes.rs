//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::physics::{Body, CollisionTag, Shape};
use crate::sim::{EngineScene, life_icon_positions};

/// Segments used for the ball outline
const BALL_SEGMENTS: u32 = 20;

/// Generate vertices for an axis-aligned filled rectangle
pub fn rect(center: Vec2, half: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let min = center - half;
    let max = center + half;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

fn body_vertices(body: &Body, color: [f32; 4], out: &mut Vec<Vertex>) {
    match *body.shape() {
        Shape::Circle { radius } => {
            out.extend(circle(body.position, radius, color, BALL_SEGMENTS));
        }
        Shape::Box { half } => out.extend(rect(body.position, half, color)),
    }
}

/// Stage-space triangles for everything visible in the scene
pub fn scene_vertices(scene: &EngineScene) -> Vec<Vertex> {
    let mut vertices = Vec::new();
    let space = scene.space();

    if let Some(walls) = scene.walls() {
        for handle in walls.all() {
            if let Some(body) = space.body(handle).filter(|b| b.visible) {
                let color = if body.tag == CollisionTag::Limit {
                    colors::LIMIT
                } else {
                    colors::WALL
                };
                body_vertices(body, color, &mut vertices);
            }
        }
    }

    for brick in scene.bricks() {
        if let Some(body) = space.body(brick.handle).filter(|b| b.visible) {
            body_vertices(body, colors::brick(brick.kind), &mut vertices);
        }
    }

    for capsule in scene.capsules() {
        if let Some(body) = space.body(capsule.handle).filter(|b| b.visible) {
            body_vertices(body, colors::powerup(capsule.kind), &mut vertices);
        }
    }

    let effects = scene.effects();
    if let Some(bar) = scene.bar().filter(|b| b.visible) {
        let color = if effects.widen_secs > 0.0 {
            colors::BAR_WIDE
        } else {
            colors::BAR
        };
        body_vertices(bar, color, &mut vertices);
    }

    if let Some(ball) = scene.ball().filter(|b| b.visible) {
        let color = if effects.slow_secs > 0.0 {
            colors::BALL_SLOW
        } else {
            colors::BALL
        };
        body_vertices(ball, color, &mut vertices);
    }

    // Remaining lives: half-size bars in the top-left corner
    let bar_cfg = &scene.config().bar;
    let icon_half = Vec2::new(bar_cfg.width, bar_cfg.height) * 0.5;
    for icon in life_icon_positions(scene.lives()) {
        vertices.extend(rect(icon.pos, icon_half * icon.scale, colors::LIFE_ICON));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn test_rect_covers_bounds() {
        let verts = rect(Vec2::new(10.0, 20.0), Vec2::new(5.0, 2.0), colors::WALL);
        assert_eq!(verts.len(), 6);
        let xs: Vec<f32> = verts.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = verts.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 5.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 15.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), 18.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 22.0);
    }

    #[test]
    fn test_circle_vertex_count() {
        assert_eq!(circle(Vec2::ZERO, 8.0, colors::BALL, 12).len(), 36);
    }

    #[test]
    fn test_scene_vertices_counts_bodies() {
        let mut scene = EngineScene::new(GameConfig::embedded().unwrap(), 5);
        assert!(scene_vertices(&scene).is_empty());
        scene.init();

        let boxes = 4 + scene.bricks().len() + 1 + scene.lives() as usize;
        let expected = boxes * 6 + (BALL_SEGMENTS * 3) as usize;
        assert_eq!(scene_vertices(&scene).len(), expected);

        // Hidden bodies are skipped
        let ball = scene.ball_handle().unwrap();
        scene.teleport_object(ball, Vec2::ZERO, false);
        assert_eq!(scene_vertices(&scene).len(), boxes * 6);
    }
}
