//! Engine scene: the collision-driven game state machine
//!
//! The scene owns the physics space and every game object in it. Each fixed
//! tick it applies input, steps the space, then turns the begin-contacts the
//! space reports into gameplay by tag pair:
//!
//! | pair           | effect                                      |
//! |----------------|---------------------------------------------|
//! | Ball / Brick   | brick removed, score, maybe a capsule drop  |
//! | Ball / Limit   | life lost, level reset                      |
//! | Ball / Bar     | deflection from hit offset                  |
//! | Ball / Wall    | bounce                                      |
//! | PowerUp / Bar  | effect applied, capsule removed             |
//! | PowerUp / Limit| capsule removed                             |
//!
//! Removals happen after the step returns, so the solver never sees a body
//! disappear mid-step.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::level::{BrickKind, brick_layout};
use super::state::{GameEvent, GameStatus, Hud, PowerUpKind, TickInput};
use crate::config::{BoxConfig, GameConfig};
use crate::consts::*;
use crate::physics::{
    Body, BodyDesc, BodyHandle, BodyKind, CollisionTag, Contact, Shape, Space,
};

/// Tag pairs the scene reacts to
const HANDLERS: [(CollisionTag, CollisionTag); 6] = [
    (CollisionTag::Ball, CollisionTag::Brick),
    (CollisionTag::Ball, CollisionTag::Limit),
    (CollisionTag::Ball, CollisionTag::Bar),
    (CollisionTag::Ball, CollisionTag::Wall),
    (CollisionTag::PowerUp, CollisionTag::Bar),
    (CollisionTag::PowerUp, CollisionTag::Limit),
];

/// A brick still standing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brick {
    pub handle: BodyHandle,
    pub kind: BrickKind,
}

/// A falling power-up capsule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub handle: BodyHandle,
    pub kind: PowerUpKind,
}

/// Remaining time of timed power-ups (seconds)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActiveEffects {
    pub widen_secs: f32,
    pub slow_secs: f32,
}

/// Walls of the stage, in config order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Walls {
    pub top: BodyHandle,
    pub bottom: BodyHandle,
    pub left: BodyHandle,
    pub right: BodyHandle,
}

impl Walls {
    pub fn all(&self) -> [BodyHandle; 4] {
        [self.top, self.bottom, self.left, self.right]
    }
}

/// The game scene
pub struct EngineScene {
    config: GameConfig,
    status: GameStatus,
    space: Space,
    bar: Option<BodyHandle>,
    ball: Option<BodyHandle>,
    walls: Option<Walls>,
    bricks: Vec<Brick>,
    capsules: Vec<Capsule>,
    hud: Hud,
    /// Horizontal bar velocity driven by input
    bar_velocity: f32,
    /// Held direction for this tick (-1, 0, 1)
    bar_input: f32,
    bar_width: f32,
    ball_speed: f32,
    total_levels: u16,
    current_level: u16,
    lives: u16,
    score: u32,
    bricks_remaining: u32,
    /// Ball glued to the bar
    is_joint: bool,
    effects: ActiveEffects,
    seed: u64,
    rng: Pcg32,
    time_ticks: u64,
    events: Vec<GameEvent>,
}

impl EngineScene {
    /// A scene with an empty space; call [`EngineScene::init`] before playing
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            bar_width: config.bar.width,
            ball_speed: config.ball.speed,
            total_levels: config.total_levels,
            config,
            status: GameStatus::None,
            space: Space::new(),
            bar: None,
            ball: None,
            walls: None,
            bricks: Vec::new(),
            capsules: Vec::new(),
            hud: Hud::default(),
            bar_velocity: 0.0,
            bar_input: 0.0,
            current_level: 0,
            lives: 0,
            score: 0,
            bricks_remaining: 0,
            is_joint: false,
            effects: ActiveEffects::default(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Configure the space, build the stage and load level 1
    pub fn init(&mut self) {
        if self.status != GameStatus::None {
            log::warn!("EngineScene::init called twice; ignoring");
            return;
        }

        self.space.set_gravity(Vec2::ZERO);
        self.space.set_damping(1.0);
        for (a, b) in HANDLERS {
            self.space.add_collision_handler(a, b);
        }

        self.init_map();
        self.init_texts();
        self.level_dump(1);
        self.status = GameStatus::Start;
        log::info!(
            "Scene ready: {} levels, seed {}",
            self.total_levels,
            self.seed
        );
    }

    /// Walls, bar, ball and the starting counters
    pub fn init_map(&mut self) {
        let walls = &self.config.walls;
        let wall = |b: &BoxConfig, tag: CollisionTag| {
            BodyDesc::new(BodyKind::Static, Shape::rect(b.size.x, b.size.y))
                .with_position(b.center)
                .with_friction(walls.friction)
                .with_elasticity(walls.elasticity)
                .with_tag(tag)
        };
        let descs = [
            wall(&walls.top, CollisionTag::Wall),
            wall(&walls.bottom, CollisionTag::Limit),
            wall(&walls.left, CollisionTag::Wall),
            wall(&walls.right, CollisionTag::Wall),
        ];
        let [top, bottom, left, right] = descs.map(|d| self.space.add_body(d));
        self.walls = Some(Walls {
            top,
            bottom,
            left,
            right,
        });

        let bar = &self.config.bar;
        self.bar = Some(
            self.space.add_body(
                BodyDesc::new(BodyKind::Kinematic, Shape::rect(bar.width, bar.height))
                    .with_position(bar.position())
                    .with_mass(bar.mass)
                    .with_moment(bar.moment, bar.infinity)
                    .with_friction(bar.friction)
                    .with_elasticity(bar.elasticity)
                    .with_tag(CollisionTag::Bar),
            ),
        );

        let ball = &self.config.ball;
        self.ball = Some(
            self.space.add_body(
                BodyDesc::new(BodyKind::Dynamic, Shape::circle(ball.radius))
                    .with_position(ball.position())
                    .with_mass(ball.mass)
                    .with_moment(ball.moment, ball.infinity)
                    .with_friction(ball.friction)
                    .with_elasticity(ball.elasticity)
                    .with_tag(CollisionTag::Ball),
            ),
        );

        self.bar_width = self.config.bar.width;
        self.ball_speed = self.config.ball.speed;
        self.total_levels = self.config.total_levels;
        self.current_level = 1;
        self.lives = INITIAL_LIVES;
        self.is_joint = true;
    }

    pub fn init_texts(&mut self) {
        self.hud = Hud::default();
        self.set_level_num(1);
        self.set_score_amount(0);
    }

    /// Replace the bricks with the layout of `level` (1-based)
    pub fn level_dump(&mut self, level: u16) {
        for brick in self.bricks.drain(..) {
            self.space.remove_body(brick.handle);
        }
        self.clear_capsules();

        let slots = match self.config.level(level) {
            Some(def) => brick_layout(&def.cells, &self.config.grid),
            None => {
                log::warn!("level {level} not defined");
                Vec::new()
            }
        };

        let grid = &self.config.grid;
        for slot in &slots {
            let handle = self.space.add_body(
                BodyDesc::new(
                    BodyKind::Static,
                    Shape::rect(grid.brick_size.x, grid.brick_size.y),
                )
                .with_position(slot.pos)
                .with_friction(grid.friction)
                .with_elasticity(grid.elasticity)
                .with_tag(CollisionTag::Brick),
            );
            self.bricks.push(Brick {
                handle,
                kind: slot.kind,
            });
        }
        self.bricks_remaining = slots.len() as u32;
        log::info!("Loaded level {level}: {} bricks", slots.len());
    }

    /// Apply one tick of input
    pub fn input(&mut self, input: &TickInput) {
        if input.reset_scene {
            self.reset_scene();
            return;
        }

        match self.status {
            GameStatus::Start | GameStatus::Playing => {
                if input.launch && self.is_joint {
                    self.launch_ball();
                }
                self.bar_input = f32::from(i8::from(input.right) - i8::from(input.left));
            }
            GameStatus::Finished => {
                self.bar_input = 0.0;
                if input.restart {
                    self.reset_game();
                }
            }
            GameStatus::None => {}
        }
    }

    fn launch_ball(&mut self) {
        // Right minus up on a y-down stage
        let velocity = Vec2::new(1.0, -1.0).normalize() * self.target_ball_speed();
        let Some(ball) = self.ball_mut() else {
            return;
        };
        ball.velocity = velocity;
        self.is_joint = false;
        self.status = GameStatus::Playing;
        self.events.push(GameEvent::Launched);
        log::info!("Ball launched");
    }

    /// Advance the scene by one fixed step
    pub fn update(&mut self, dt: f32) {
        if !matches!(self.status, GameStatus::Start | GameStatus::Playing) {
            return;
        }
        self.time_ticks += 1;

        self.update_bar(dt);
        self.update_ball();
        self.update_bricks();
        self.update_capsules();

        let contacts = self.space.step(dt);
        self.dispatch(&contacts);

        self.enforce_ball_speed();
        self.update_effects(dt);
        self.check_status();
    }

    /// Route begin-contacts to gameplay handlers
    fn dispatch(&mut self, contacts: &[Contact]) {
        let mut ball_lost = false;
        for contact in contacts {
            if ball_lost && contact.tag_a == CollisionTag::Ball {
                continue;
            }
            match (contact.tag_a, contact.tag_b) {
                (CollisionTag::Ball, CollisionTag::Brick) => self.on_brick_hit(contact.b),
                (CollisionTag::Ball, CollisionTag::Limit) => {
                    ball_lost = true;
                    self.on_ball_lost();
                }
                (CollisionTag::Ball, CollisionTag::Bar) => self.on_bar_hit(),
                (CollisionTag::Ball, CollisionTag::Wall) => self.events.push(GameEvent::Bounce {
                    tag: CollisionTag::Wall,
                }),
                (CollisionTag::PowerUp, CollisionTag::Bar) => self.on_capsule_collected(contact.a),
                (CollisionTag::PowerUp, CollisionTag::Limit) => {
                    self.remove_capsule(contact.a);
                }
                _ => {}
            }
        }
    }

    fn on_brick_hit(&mut self, handle: BodyHandle) {
        let Some(idx) = self.bricks.iter().position(|b| b.handle == handle) else {
            return;
        };
        let brick = self.bricks.remove(idx);
        let pos = self.space.remove_body(handle).map(|b| b.position);

        self.bricks_remaining = self.bricks_remaining.saturating_sub(1);
        self.score += BRICK_SCORE;
        self.set_score_amount(self.score);
        self.events.push(GameEvent::BrickDestroyed {
            kind: brick.kind,
            score: self.score,
        });

        if let Some(pos) = pos {
            self.roll_drop(pos);
        }
    }

    fn roll_drop(&mut self, pos: Vec2) {
        let chance = self.config.powerups.drop_chance.clamp(0.0, 1.0);
        if !self.rng.random_bool(chance) {
            return;
        }
        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
        self.spawn_power_up(kind, pos);
    }

    /// Drop a capsule of `kind` at `pos`
    pub fn spawn_power_up(&mut self, kind: PowerUpKind, pos: Vec2) {
        let cfg = &self.config.powerups;
        let handle = self.space.add_body(
            BodyDesc::new(BodyKind::Dynamic, Shape::rect(cfg.size.x, cfg.size.y))
                .with_position(pos)
                .with_velocity(Vec2::new(0.0, cfg.fall_speed))
                .with_tag(CollisionTag::PowerUp)
                .sensor(),
        );
        self.capsules.push(Capsule { handle, kind });
        self.events.push(GameEvent::PowerUpSpawned { kind });
    }

    fn on_ball_lost(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(GameEvent::LifeLost {
            lives_left: self.lives,
        });
        log::info!("Life lost, {} left", self.lives);
        self.reset_level();
    }

    /// Send the ball upward at an angle set by where it struck the bar
    fn on_bar_hit(&mut self) {
        let (Some(bar), Some(ball)) = (self.bar(), self.ball()) else {
            return;
        };
        let half = (self.bar_width / 2.0).max(f32::EPSILON);
        let offset = ((ball.position.x - bar.position.x) / half).clamp(-1.0, 1.0);
        let angle = offset * BAR_MAX_DEFLECTION;
        let speed = self.target_ball_speed();

        if let Some(ball) = self.ball_mut() {
            ball.velocity = Vec2::new(angle.sin(), -angle.cos()) * speed;
        }
        self.events.push(GameEvent::Bounce {
            tag: CollisionTag::Bar,
        });
    }

    fn on_capsule_collected(&mut self, handle: BodyHandle) {
        let Some(capsule) = self.remove_capsule(handle) else {
            return;
        };
        // Timed effects run for at least one tick so expiry restores them
        let duration = self.config.powerups.duration_secs.max(SIM_DT);
        match capsule.kind {
            PowerUpKind::ExtraLife => self.lives = (self.lives + 1).min(MAX_LIVES),
            PowerUpKind::WidenBar => {
                self.effects.widen_secs = duration;
                self.set_bar_width(self.config.bar.width * self.config.powerups.widen_factor);
            }
            PowerUpKind::SlowBall => self.effects.slow_secs = duration,
        }
        self.events.push(GameEvent::PowerUpCollected { kind: capsule.kind });
        log::info!("Power-up collected: {:?}", capsule.kind);
    }

    fn remove_capsule(&mut self, handle: BodyHandle) -> Option<Capsule> {
        let idx = self.capsules.iter().position(|c| c.handle == handle)?;
        self.space.remove_body(handle);
        Some(self.capsules.remove(idx))
    }

    fn clear_capsules(&mut self) {
        for capsule in self.capsules.drain(..) {
            self.space.remove_body(capsule.handle);
        }
    }

    fn set_bar_width(&mut self, width: f32) {
        self.bar_width = width;
        let height = self.config.bar.height;
        if let Some(bar) = self.bar_mut() {
            bar.set_shape(Shape::rect(width, height));
        }
    }

    /// Integrate the bar from held input, pinned to its row and kept between the side walls
    pub fn update_bar(&mut self, dt: f32) {
        let cfg = &self.config.bar;
        if self.bar_input != 0.0 {
            self.bar_velocity += self.bar_input * cfg.speed * dt;
        } else {
            self.bar_velocity *= cfg.damping.clamp(0.0, 1.0).powf(dt);
        }
        self.bar_velocity = self.bar_velocity.clamp(-cfg.max_speed, cfg.max_speed);

        let half = self.bar_width / 2.0;
        let walls = &self.config.walls;
        let min_x = walls.left.max().x + half;
        let max_x = walls.right.min().x - half;
        let y = cfg.y;

        let Some(handle) = self.bar else {
            return;
        };
        let Some(bar) = self.space.body_mut(handle) else {
            return;
        };
        bar.position.x = bar.position.x.clamp(min_x, max_x.max(min_x));
        bar.position.y = y;
        if dt > 0.0 {
            // Stop exactly at the wall instead of sliding into it
            let lo = (min_x - bar.position.x) / dt;
            let hi = (max_x.max(min_x) - bar.position.x) / dt;
            self.bar_velocity = self.bar_velocity.clamp(lo, hi);
        }
        bar.velocity = Vec2::new(self.bar_velocity, 0.0);
    }

    /// Keep a joined ball riding on the bar; the ball never spins
    pub fn update_ball(&mut self) {
        let joint_pos = if self.is_joint {
            self.bar().map(|bar| {
                let top = bar.position.y - bar.shape().half_extents().y;
                Vec2::new(bar.position.x, top - self.config.ball.radius - JOINT_GAP)
            })
        } else {
            None
        };

        let Some(ball) = self.ball_mut() else {
            return;
        };
        if let Some(pos) = joint_pos {
            ball.position = pos;
            ball.velocity = Vec2::ZERO;
        }
        ball.angle = 0.0;
    }

    /// Forget bricks whose bodies left the space
    pub fn update_bricks(&mut self) {
        let space = &self.space;
        self.bricks.retain(|b| space.contains(b.handle));
    }

    /// Capsules fall at a constant speed regardless of space damping
    fn update_capsules(&mut self) {
        let fall = Vec2::new(0.0, self.config.powerups.fall_speed);
        for capsule in &self.capsules {
            if let Some(body) = self.space.body_mut(capsule.handle) {
                body.velocity = fall;
            }
        }
    }

    fn target_ball_speed(&self) -> f32 {
        if self.effects.slow_secs > 0.0 {
            self.ball_speed * self.config.powerups.slow_factor
        } else {
            self.ball_speed
        }
    }

    /// Hold a free ball at cruise speed with a minimum vertical component
    pub fn enforce_ball_speed(&mut self) {
        if self.is_joint {
            return;
        }
        let speed = self.target_ball_speed();
        let Some(ball) = self.ball_mut() else {
            return;
        };

        let mut dir = ball.velocity.normalize_or(Vec2::new(1.0, -1.0).normalize());
        if dir.y.abs() < BALL_MIN_VERTICAL {
            let sy = if dir.y > 0.0 { 1.0 } else { -1.0 };
            let sx = if dir.x < 0.0 { -1.0 } else { 1.0 };
            let x = (1.0 - BALL_MIN_VERTICAL * BALL_MIN_VERTICAL).sqrt();
            dir = Vec2::new(sx * x, sy * BALL_MIN_VERTICAL);
        }
        ball.velocity = dir * speed;
    }

    fn update_effects(&mut self, dt: f32) {
        if self.effects.slow_secs > 0.0 {
            self.effects.slow_secs = (self.effects.slow_secs - dt).max(0.0);
        }
        if self.effects.widen_secs > 0.0 {
            self.effects.widen_secs = (self.effects.widen_secs - dt).max(0.0);
            if self.effects.widen_secs == 0.0 {
                self.set_bar_width(self.config.bar.width);
            }
        }
    }

    /// Game over, level advance or victory
    pub fn check_status(&mut self) {
        if !matches!(self.status, GameStatus::Start | GameStatus::Playing) {
            return;
        }

        if self.lives < 1 {
            self.status = GameStatus::Finished;
            self.events.push(GameEvent::GameOver { score: self.score });
            log::info!("Game over, score {}", self.score);
            return;
        }

        if self.bricks_remaining < 1 {
            if self.current_level < self.total_levels {
                self.current_level += 1;
                self.level_dump(self.current_level);
                self.reset_level();
                self.set_level_num(self.current_level);
                self.events.push(GameEvent::LevelCleared {
                    next_level: self.current_level,
                });
            } else {
                self.status = GameStatus::Finished;
                self.events.push(GameEvent::Victory { score: self.score });
                log::info!("All levels cleared, score {}", self.score);
            }
        }
    }

    pub fn set_level_num(&mut self, level: u16) {
        self.hud.set_level(level);
    }

    pub fn set_score_amount(&mut self, score: u32) {
        self.hud.set_score(score);
    }

    /// Bar and ball back to their start, ball on the bar, capsules and effects cleared
    pub fn reset_level(&mut self) {
        let bar_pos = self.config.bar.position();
        let ball_pos = self.config.ball.position();
        if let Some(bar) = self.bar {
            self.teleport_object(bar, bar_pos, true);
        }
        if let Some(ball) = self.ball {
            self.teleport_object(ball, ball_pos, true);
        }
        self.bar_velocity = 0.0;
        self.is_joint = true;

        self.clear_capsules();
        self.effects = ActiveEffects::default();
        self.set_bar_width(self.config.bar.width);

        if self.status == GameStatus::Playing {
            self.status = GameStatus::Start;
        }
    }

    /// Back to level 1 with full lives and no score
    pub fn reset_game(&mut self) {
        if self.status == GameStatus::None {
            return;
        }
        self.current_level = 1;
        self.lives = INITIAL_LIVES;
        self.score = 0;
        self.set_level_num(self.current_level);
        self.set_score_amount(self.score);
        self.level_dump(self.current_level);
        self.reset_level();
        self.status = GameStatus::Start;
        self.events.push(GameEvent::GameReset);
        log::info!("Game reset");
    }

    /// Restore the configured physics tuning, then restart the game
    pub fn reset_scene(&mut self) {
        self.restore_tuning();
        self.is_joint = true;
        self.reset_game();
    }

    /// Space, bar and ball properties back to their configured values
    pub fn restore_tuning(&mut self) {
        self.space.set_gravity(Vec2::ZERO);
        self.space.set_damping(1.0);

        let bar = self.config.bar.clone();
        if let Some(body) = self.bar_mut() {
            body.set_mass(bar.mass);
            body.friction = bar.friction;
            body.elasticity = bar.elasticity;
            body.set_moment(bar.moment);
            body.infinite_moment = bar.infinity;
            body.angle = 0.0;
        }

        let ball = self.config.ball.clone();
        if let Some(body) = self.ball_mut() {
            body.set_mass(ball.mass);
            body.friction = ball.friction;
            body.elasticity = ball.elasticity;
            body.set_moment(ball.moment);
            body.infinite_moment = ball.infinity;
            body.angle = 0.0;
        }
    }

    /// Move a body, stopping it and setting its visibility
    pub fn teleport_object(&mut self, handle: BodyHandle, position: Vec2, visible: bool) {
        if let Some(body) = self.space.body_mut(handle) {
            body.position = position;
            body.velocity = Vec2::ZERO;
            body.angle = 0.0;
            body.visible = visible;
        }
    }

    /// Hand pending events to the caller
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Input then update, with optional autopilot
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let input = if input.autopilot {
            self.autopilot(input)
        } else {
            input.clone()
        };
        self.input(&input);
        self.update(dt);
    }

    /// Demo mode: launch immediately, steer under the ball, grab capsules while safe
    fn autopilot(&self, input: &TickInput) -> TickInput {
        let mut input = input.clone();
        if self.status == GameStatus::Start {
            input.launch = true;
        }
        let (Some(bar), Some(ball)) = (self.bar(), self.ball()) else {
            return input;
        };

        let ball_safe = self.is_joint
            || (ball.velocity.y < 0.0 && ball.position.y < bar.position.y - 250.0);
        let capsule_x = if ball_safe {
            self.capsules
                .iter()
                .filter_map(|c| self.space.body(c.handle))
                .max_by(|a, b| a.position.y.total_cmp(&b.position.y))
                .map(|b| b.position.x)
        } else {
            None
        };

        let target_x = capsule_x.unwrap_or_else(|| {
            // Vary the hit point so the ball does not loop forever
            let t = self.time_ticks as f32 * 0.01;
            let wobble = t.sin() * 0.6 + (t * 0.7).sin() * 0.2;
            self.predict_landing_x(bar, ball) + wobble * self.bar_width * 0.25
        });

        let dx = target_x - bar.position.x;
        let coasting = self.bar_velocity * dx > 0.0 && dx.abs() < self.bar_velocity.abs() * 0.08;
        input.left = dx < -4.0 && !coasting;
        input.right = dx > 4.0 && !coasting;
        input
    }

    /// Where a falling ball will cross the bar row, folding wall reflections
    fn predict_landing_x(&self, bar: &Body, ball: &Body) -> f32 {
        let v = ball.velocity;
        if v.y <= 0.0 {
            return ball.position.x;
        }
        let radius = self.config.ball.radius;
        let row = bar.position.y - bar.shape().half_extents().y - radius;
        let t = ((row - ball.position.y) / v.y).max(0.0);
        let x = ball.position.x + v.x * t;

        let lo = self.config.walls.left.max().x + radius;
        let hi = self.config.walls.right.min().x - radius;
        let width = hi - lo;
        if width <= 0.0 {
            return x;
        }
        let m = (x - lo).rem_euclid(2.0 * width);
        lo + if m > width { 2.0 * width - m } else { m }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn lives(&self) -> u16 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_level(&self) -> u16 {
        self.current_level
    }

    pub fn total_levels(&self) -> u16 {
        self.total_levels
    }

    pub fn bricks_remaining(&self) -> u32 {
        self.bricks_remaining
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    pub fn is_joint(&self) -> bool {
        self.is_joint
    }

    pub fn effects(&self) -> ActiveEffects {
        self.effects
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn bar_width(&self) -> f32 {
        self.bar_width
    }

    pub fn space(&self) -> &Space {
        &self.space
    }

    pub fn space_mut(&mut self) -> &mut Space {
        &mut self.space
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn capsules(&self) -> &[Capsule] {
        &self.capsules
    }

    pub fn walls(&self) -> Option<Walls> {
        self.walls
    }

    pub fn bar_handle(&self) -> Option<BodyHandle> {
        self.bar
    }

    pub fn ball_handle(&self) -> Option<BodyHandle> {
        self.ball
    }

    pub fn bar(&self) -> Option<&Body> {
        self.bar.and_then(|h| self.space.body(h))
    }

    pub fn ball(&self) -> Option<&Body> {
        self.ball.and_then(|h| self.space.body(h))
    }

    pub fn bar_mut(&mut self) -> Option<&mut Body> {
        self.bar.and_then(|h| self.space.body_mut(h))
    }

    pub fn ball_mut(&mut self) -> Option<&mut Body> {
        self.ball.and_then(|h| self.space.body_mut(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LevelConfig;

    /// One-row config: bricks at the given cells, drop chance as given
    fn test_config(levels: &[&[u8]], drop_chance: f64) -> GameConfig {
        let mut config = GameConfig::default();
        config.levels = levels
            .iter()
            .map(|cells| LevelConfig {
                cells: cells.to_vec(),
            })
            .collect();
        config.total_levels = levels.len() as u16;
        config.powerups.drop_chance = drop_chance;
        config
    }

    fn ready(config: GameConfig) -> EngineScene {
        let mut scene = EngineScene::new(config, 7);
        scene.init();
        scene
    }

    fn launch(scene: &mut EngineScene) {
        let input = TickInput {
            launch: true,
            ..Default::default()
        };
        scene.tick(&input, SIM_DT);
    }

    /// Place the free ball and give it a velocity
    fn fire_ball(scene: &mut EngineScene, pos: Vec2, vel: Vec2) {
        let handle = scene.ball_handle().unwrap();
        scene.teleport_object(handle, pos, true);
        scene.ball_mut().unwrap().velocity = vel;
    }

    fn run(scene: &mut EngineScene, ticks: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            scene.tick(&TickInput::default(), SIM_DT);
            events.extend(scene.drain_events());
        }
        events
    }

    #[test]
    fn test_new_then_init() {
        let mut scene = EngineScene::new(GameConfig::embedded().unwrap(), 1);
        assert_eq!(scene.status(), GameStatus::None);
        assert!(scene.space().is_empty());

        // Nothing happens before init
        scene.tick(
            &TickInput {
                launch: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(scene.status(), GameStatus::None);

        scene.init();
        assert_eq!(scene.status(), GameStatus::Start);
        assert_eq!(scene.lives(), 3);
        assert_eq!(scene.current_level(), 1);
        assert_eq!(scene.score(), 0);
        assert!(scene.is_joint());
        assert_eq!(scene.hud().level.text, "LEVEL 1");
        assert_eq!(scene.hud().score.text, "SCORE          0");

        let bricks = scene.config().level(1).unwrap().brick_count();
        assert_eq!(scene.bricks_remaining() as usize, bricks);
        // 4 walls + bar + ball + bricks
        assert_eq!(scene.space().len(), 6 + bricks);
        for (a, b) in HANDLERS {
            assert!(scene.space().has_collision_handler(b, a));
        }

        let walls = scene.walls().unwrap();
        let tag = |h| scene.space().body(h).unwrap().tag;
        assert_eq!(tag(walls.top), CollisionTag::Wall);
        assert_eq!(tag(walls.bottom), CollisionTag::Limit);
        assert_eq!(tag(walls.left), CollisionTag::Wall);
        assert_eq!(tag(walls.right), CollisionTag::Wall);
        assert_eq!(scene.bar().unwrap().kind(), BodyKind::Kinematic);
        assert_eq!(scene.ball().unwrap().kind(), BodyKind::Dynamic);

        // Second init is ignored
        scene.init();
        assert_eq!(scene.space().len(), 6 + bricks);
    }

    #[test]
    fn test_launch_sets_playing_and_velocity() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        launch(&mut scene);
        assert_eq!(scene.status(), GameStatus::Playing);
        assert!(!scene.is_joint());
        assert_eq!(scene.drain_events(), vec![GameEvent::Launched]);

        let v = scene.ball().unwrap().velocity;
        assert!((v.length() - scene.config().ball.speed).abs() < 1e-2);
        assert!(v.x > 0.0 && v.y < 0.0);
        assert!((v.x + v.y).abs() < 1e-2);

        // Launching again while free does nothing
        launch(&mut scene);
        assert!(scene.drain_events().is_empty());
    }

    #[test]
    fn test_joined_ball_rides_the_bar() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        let start_x = scene.bar().unwrap().position.x;
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..30 {
            scene.tick(&input, SIM_DT);
        }
        let bar = scene.bar().unwrap().clone();
        let ball = scene.ball().unwrap().clone();
        assert!(bar.position.x > start_x);
        assert_eq!(bar.position.y, scene.config().bar.y);
        assert!((ball.position.x - bar.position.x).abs() < 6.0);
        assert_eq!(ball.velocity, Vec2::ZERO);
        assert_eq!(scene.status(), GameStatus::Start);
    }

    #[test]
    fn test_bar_stops_at_side_wall() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        let input = TickInput {
            left: true,
            ..Default::default()
        };
        for _ in 0..600 {
            scene.tick(&input, SIM_DT);
        }
        let bar = scene.bar().unwrap();
        let min_x = scene.config().walls.left.max().x + scene.bar_width() / 2.0;
        assert!(bar.position.x >= min_x - 1e-3);
        assert!(bar.position.x < min_x + 1.0);

        // Damping stops the bar once released
        for _ in 0..240 {
            scene.tick(&TickInput::default(), SIM_DT);
        }
        assert!(scene.bar().unwrap().velocity.x.abs() < 1.0);
    }

    #[test]
    fn test_brick_hit_scores_and_last_brick_wins() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        launch(&mut scene);
        fire_ball(&mut scene, Vec2::new(170.0, 240.0), Vec2::new(0.0, -420.0));

        let events = run(&mut scene, 30);
        assert!(events.contains(&GameEvent::BrickDestroyed {
            kind: BrickKind::new(1).unwrap(),
            score: 100,
        }));
        assert_eq!(scene.score(), 100);
        assert_eq!(scene.bricks_remaining(), 0);
        assert!(scene.bricks().is_empty());
        assert_eq!(scene.hud().score.text, "SCORE          100");
        assert!(events.contains(&GameEvent::Victory { score: 100 }));
        assert_eq!(scene.status(), GameStatus::Finished);
    }

    #[test]
    fn test_level_clear_advances() {
        let mut scene = ready(test_config(&[&[1], &[0, 2, 3]], 0.0));
        launch(&mut scene);
        fire_ball(&mut scene, Vec2::new(170.0, 240.0), Vec2::new(0.0, -420.0));

        let events = run(&mut scene, 30);
        assert!(events.contains(&GameEvent::LevelCleared { next_level: 2 }));
        assert_eq!(scene.current_level(), 2);
        assert_eq!(scene.hud().level.text, "LEVEL 2");
        assert_eq!(scene.bricks_remaining(), 2);
        assert_eq!(scene.status(), GameStatus::Start);
        assert!(scene.is_joint());
        // Score carries over
        assert_eq!(scene.score(), 100);
    }

    #[test]
    fn test_losing_every_life_finishes() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        for expected in (0..3).rev() {
            launch(&mut scene);
            fire_ball(&mut scene, Vec2::new(400.0, 740.0), Vec2::new(0.0, 420.0));
            let events = run(&mut scene, 30);
            assert!(events.contains(&GameEvent::LifeLost {
                lives_left: expected
            }));
            assert_eq!(scene.lives(), expected);
            assert!(scene.is_joint());
        }
        assert_eq!(scene.status(), GameStatus::Finished);

        // Frozen while finished
        let bar_x = scene.bar().unwrap().position.x;
        let input = TickInput {
            right: true,
            launch: true,
            ..Default::default()
        };
        for _ in 0..30 {
            scene.tick(&input, SIM_DT);
        }
        assert_eq!(scene.bar().unwrap().position.x, bar_x);
        assert_eq!(scene.status(), GameStatus::Finished);

        // Restart
        scene.drain_events();
        scene.tick(
            &TickInput {
                restart: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(scene.status(), GameStatus::Start);
        assert_eq!(scene.lives(), INITIAL_LIVES);
        assert_eq!(scene.score(), 0);
        assert_eq!(scene.bricks_remaining(), 1);
        assert!(scene.drain_events().contains(&GameEvent::GameReset));
    }

    #[test]
    fn test_bar_deflects_by_hit_offset() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        launch(&mut scene);
        let bar_x = scene.bar().unwrap().position.x;
        fire_ball(&mut scene, Vec2::new(bar_x - 40.0, 670.0), Vec2::new(0.0, 420.0));

        let events = run(&mut scene, 20);
        assert!(events.contains(&GameEvent::Bounce {
            tag: CollisionTag::Bar
        }));
        let v = scene.ball().unwrap().velocity;
        assert!(v.y < 0.0, "ball must leave upward: {v:?}");
        assert!(v.x < 0.0, "left-side hit deflects left: {v:?}");
        assert!((v.length() - scene.config().ball.speed).abs() < 1e-2);
    }

    #[test]
    fn test_ball_keeps_minimum_vertical_speed() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        launch(&mut scene);
        fire_ball(&mut scene, Vec2::new(400.0, 500.0), Vec2::new(420.0, 0.0));
        run(&mut scene, 1);
        let v = scene.ball().unwrap().velocity;
        let speed = scene.config().ball.speed;
        assert!((v.length() - speed).abs() < 1e-2);
        assert!(v.y.abs() >= BALL_MIN_VERTICAL * speed - 1e-2);
    }

    #[test]
    fn test_brick_drop_spawns_capsule() {
        let mut scene = ready(test_config(&[&[1, 0, 0, 0, 0, 0, 0, 0, 0, 1]], 1.0));
        launch(&mut scene);
        fire_ball(&mut scene, Vec2::new(170.0, 240.0), Vec2::new(0.0, -420.0));

        let events = run(&mut scene, 30);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::PowerUpSpawned { .. }))
        );
        assert_eq!(scene.capsules().len(), 1);
        let capsule = scene.space().body(scene.capsules()[0].handle).unwrap();
        assert!(capsule.sensor);
        assert_eq!(capsule.tag, CollisionTag::PowerUp);
    }

    #[test]
    fn test_widen_bar_capsule_and_expiry() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        let bar_x = scene.bar().unwrap().position.x;
        scene.spawn_power_up(PowerUpKind::WidenBar, Vec2::new(bar_x, 650.0));
        scene.drain_events();

        let events = run(&mut scene, 60);
        assert!(events.contains(&GameEvent::PowerUpCollected {
            kind: PowerUpKind::WidenBar
        }));
        assert!(scene.capsules().is_empty());
        let widened = scene.config().bar.width * scene.config().powerups.widen_factor;
        assert!((scene.bar_width() - widened).abs() < 1e-3);
        assert!((scene.bar().unwrap().shape().width() - widened).abs() < 1e-3);

        let ticks = (scene.config().powerups.duration_secs / SIM_DT) as usize + 10;
        run(&mut scene, ticks);
        assert_eq!(scene.bar_width(), scene.config().bar.width);
    }

    #[test]
    fn test_extra_life_and_missed_capsule() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        let bar_x = scene.bar().unwrap().position.x;
        scene.spawn_power_up(PowerUpKind::ExtraLife, Vec2::new(bar_x, 650.0));
        run(&mut scene, 60);
        assert_eq!(scene.lives(), INITIAL_LIVES + 1);

        // Far from the bar: falls into the limit and disappears
        scene.spawn_power_up(PowerUpKind::SlowBall, Vec2::new(100.0, 700.0));
        let events = run(&mut scene, 120);
        assert!(scene.capsules().is_empty());
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::PowerUpCollected { .. }))
        );
        assert_eq!(scene.effects().slow_secs, 0.0);
    }

    #[test]
    fn test_extra_life_capped() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        let bar_x = scene.bar().unwrap().position.x;
        let mut collected = 0;
        for _ in 0..4 {
            scene.spawn_power_up(PowerUpKind::ExtraLife, Vec2::new(bar_x, 650.0));
            collected += run(&mut scene, 60)
                .iter()
                .filter(|e| matches!(e, GameEvent::PowerUpCollected { .. }))
                .count();
        }
        assert_eq!(collected, 4);
        assert_eq!(scene.lives(), MAX_LIVES);
    }

    #[test]
    fn test_slow_ball_scales_cruise_speed() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        let bar_x = scene.bar().unwrap().position.x;
        scene.spawn_power_up(PowerUpKind::SlowBall, Vec2::new(bar_x, 650.0));
        run(&mut scene, 60);
        assert!(scene.effects().slow_secs > 0.0);

        launch(&mut scene);
        fire_ball(&mut scene, Vec2::new(400.0, 500.0), Vec2::new(0.0, -420.0));
        run(&mut scene, 1);
        let cfg = scene.config();
        let expected = cfg.ball.speed * cfg.powerups.slow_factor;
        let speed = scene.ball().unwrap().velocity.length();
        assert!((speed - expected).abs() < 1e-2, "{speed} vs {expected}");
    }

    #[test]
    fn test_zero_duration_widen_restores_bar() {
        let mut config = test_config(&[&[1]], 0.0);
        config.powerups.duration_secs = 0.0;
        let mut scene = ready(config);
        let bar_x = scene.bar().unwrap().position.x;
        scene.spawn_power_up(PowerUpKind::WidenBar, Vec2::new(bar_x, 650.0));

        let events = run(&mut scene, 60);
        assert!(events.contains(&GameEvent::PowerUpCollected {
            kind: PowerUpKind::WidenBar
        }));
        let width = scene.config().bar.width;
        assert_eq!(scene.bar_width(), width);
        assert!((scene.bar().unwrap().shape().width() - width).abs() < 1e-3);
        assert_eq!(scene.effects(), ActiveEffects::default());
    }

    #[test]
    fn test_life_lost_clears_capsules_and_effects() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        let bar_x = scene.bar().unwrap().position.x;
        scene.spawn_power_up(PowerUpKind::WidenBar, Vec2::new(bar_x, 650.0));
        run(&mut scene, 60);
        assert!(scene.effects().widen_secs > 0.0);

        scene.spawn_power_up(PowerUpKind::ExtraLife, Vec2::new(100.0, 300.0));
        launch(&mut scene);
        fire_ball(&mut scene, Vec2::new(400.0, 740.0), Vec2::new(0.0, 420.0));
        let events = run(&mut scene, 10);

        assert!(events.contains(&GameEvent::LifeLost { lives_left: 2 }));
        assert!(scene.capsules().is_empty());
        assert_eq!(scene.effects(), ActiveEffects::default());
        assert_eq!(scene.bar_width(), scene.config().bar.width);
        // Four walls, bar, ball and the brick
        assert_eq!(scene.space().len(), 7);
    }

    #[test]
    fn test_lost_ball_skips_other_contacts_that_step() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        launch(&mut scene);
        scene.drain_events();

        // Heading into the bottom-left corner: limit and left wall in one step
        fire_ball(&mut scene, Vec2::new(49.0, 751.0), Vec2::new(-300.0, 300.0));
        let events = run(&mut scene, 1);
        assert_eq!(events, vec![GameEvent::LifeLost { lives_left: 2 }]);
        assert_eq!(scene.status(), GameStatus::Start);
        assert!(scene.is_joint());
    }

    #[test]
    fn test_reset_scene_restores_tuning() {
        let mut scene = ready(test_config(&[&[1, 1]], 0.0));
        launch(&mut scene);
        scene.space_mut().set_damping(0.2);
        scene.ball_mut().unwrap().elasticity = 0.1;
        scene.bar_mut().unwrap().set_mass(3.0);

        scene.tick(
            &TickInput {
                reset_scene: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(scene.space().damping(), 1.0);
        assert_eq!(scene.ball().unwrap().elasticity, scene.config().ball.elasticity);
        assert_eq!(scene.bar().unwrap().mass(), scene.config().bar.mass);
        assert_eq!(scene.status(), GameStatus::Start);
        assert!(scene.is_joint());
    }

    #[test]
    fn test_teleport_object() {
        let mut scene = ready(test_config(&[&[1]], 0.0));
        let ball = scene.ball_handle().unwrap();
        scene.ball_mut().unwrap().velocity = Vec2::new(5.0, 5.0);
        scene.ball_mut().unwrap().angle = 0.7;
        scene.teleport_object(ball, Vec2::new(10.0, 20.0), false);
        let body = scene.ball().unwrap();
        assert_eq!(body.position, Vec2::new(10.0, 20.0));
        assert_eq!(body.velocity, Vec2::ZERO);
        assert_eq!(body.angle, 0.0);
        assert!(!body.visible);
    }

    #[test]
    fn test_autopilot_determinism() {
        let config = GameConfig::embedded().unwrap();
        let mut a = EngineScene::new(config.clone(), 99);
        let mut b = EngineScene::new(config, 99);
        a.init();
        b.init();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            a.tick(&input, SIM_DT);
            b.tick(&input, SIM_DT);
        }
        assert_eq!(a.score(), b.score());
        assert_eq!(a.lives(), b.lives());
        assert_eq!(a.ball().unwrap().position, b.ball().unwrap().position);
    }

    #[test]
    fn test_autopilot_breaks_bricks() {
        let mut scene = ready(GameConfig::embedded().unwrap());
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..(60.0 / SIM_DT) as usize {
            scene.tick(&input, SIM_DT);
            if scene.status() == GameStatus::Finished {
                break;
            }
        }
        assert!(scene.score() > 0);
    }
}
