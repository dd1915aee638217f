//! Live physics inspector
//!
//! A snapshot of the tunable space, bar and ball properties. The front end
//! captures one per frame, lets the player edit it and writes it back; values
//! are clamped to the panel ranges on the way in.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::physics::Body;
use crate::sim::EngineScene;

pub const MASS_RANGE: (f32, f32) = (0.1, 20.0);
/// Friction, elasticity, moment and damping
pub const UNIT_RANGE: (f32, f32) = (0.0, 1.0);
pub const ANGLE_RANGE: (f32, f32) = (-FRAC_PI_2, FRAC_PI_2);

/// Editable properties of one body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub mass: f32,
    pub friction: f32,
    pub elasticity: f32,
    pub moment: f32,
    pub infinity: bool,
}

impl BodySnapshot {
    fn capture(body: &Body) -> Self {
        Self {
            position: body.position,
            velocity: body.velocity,
            angle: body.angle,
            mass: body.mass(),
            friction: body.friction,
            elasticity: body.elasticity,
            moment: body.moment(),
            infinity: body.infinite_moment,
        }
    }

    fn apply(&self, body: &mut Body) {
        body.position = self.position;
        body.velocity = self.velocity;
        body.angle = self.angle.clamp(ANGLE_RANGE.0, ANGLE_RANGE.1);
        body.set_mass(self.mass.clamp(MASS_RANGE.0, MASS_RANGE.1));
        body.friction = self.friction.clamp(UNIT_RANGE.0, UNIT_RANGE.1);
        body.elasticity = self.elasticity.clamp(UNIT_RANGE.0, UNIT_RANGE.1);
        body.infinite_moment = self.infinity;
        if !self.infinity {
            body.set_moment(self.moment.clamp(UNIT_RANGE.0, UNIT_RANGE.1));
        }
    }

    fn lines(&self, label: &str, out: &mut Vec<String>) {
        out.push(format!("{label} Settings"));
        out.push(format!(
            "  {label} Position: ({:.1}, {:.1})",
            self.position.x, self.position.y
        ));
        out.push(format!(
            "  {label} Velocity: ({:.1}, {:.1})",
            self.velocity.x, self.velocity.y
        ));
        out.push(format!("  {label} Angle: {:.3}", self.angle));
        out.push(format!("  {label} Mass: {:.2}", self.mass));
        out.push(format!("  {label} Friction: {:.2}", self.friction));
        out.push(format!("  {label} Elasticity: {:.2}", self.elasticity));
        out.push(format!("  {label} Infinity: {}", self.infinity));
        if !self.infinity {
            out.push(format!("  {label} Moment: {:.2}", self.moment));
        }
    }
}

/// Inspector state for the whole scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    pub gravity: Vec2,
    pub damping: f32,
    pub bar: BodySnapshot,
    pub ball: BodySnapshot,
    /// Pointer position in stage coordinates
    pub mouse: Vec2,
}

impl DebugSnapshot {
    /// `None` until the scene has been initialised
    pub fn capture(scene: &EngineScene) -> Option<Self> {
        Some(Self {
            gravity: scene.space().gravity(),
            damping: scene.space().damping(),
            bar: BodySnapshot::capture(scene.bar()?),
            ball: BodySnapshot::capture(scene.ball()?),
            mouse: Vec2::ZERO,
        })
    }

    pub fn with_mouse(mut self, mouse: Vec2) -> Self {
        self.mouse = mouse;
        self
    }

    /// Write the (clamped) values back into the scene
    pub fn apply(&self, scene: &mut EngineScene) {
        scene.space_mut().set_gravity(self.gravity);
        scene
            .space_mut()
            .set_damping(self.damping.clamp(UNIT_RANGE.0, UNIT_RANGE.1));
        if let Some(bar) = scene.bar_mut() {
            self.bar.apply(bar);
        }
        if let Some(ball) = scene.ball_mut() {
            self.ball.apply(ball);
        }
    }

    /// Configured defaults, as restored by the "Reset Scene" button
    pub fn reset(config: &GameConfig) -> Self {
        let bar = &config.bar;
        let ball = &config.ball;
        Self {
            gravity: Vec2::ZERO,
            damping: 1.0,
            bar: BodySnapshot {
                position: bar.position(),
                velocity: Vec2::ZERO,
                angle: 0.0,
                mass: bar.mass,
                friction: bar.friction,
                elasticity: bar.elasticity,
                moment: bar.moment,
                infinity: bar.infinity,
            },
            ball: BodySnapshot {
                position: ball.position(),
                velocity: Vec2::ZERO,
                angle: 0.0,
                mass: ball.mass,
                friction: ball.friction,
                elasticity: ball.elasticity,
                moment: ball.moment,
                infinity: ball.infinity,
            },
            mouse: Vec2::ZERO,
        }
    }

    /// Text rendering of the panel
    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![
            "Debugger for Arkanoid".to_string(),
            format!("Mouse Position: ({}, {})", self.mouse.x, self.mouse.y),
            "Space Settings".to_string(),
            format!(
                "  Space Gravity: ({:.1}, {:.1})",
                self.gravity.x, self.gravity.y
            ),
            format!("  Space Damping: {:.3}", self.damping),
        ];
        self.bar.lines("Bar", &mut out);
        self.ball.lines("Ball", &mut out);
        out.push("[R] Reset Scene".to_string());
        out
    }
}
