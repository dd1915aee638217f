//! Arkanoid - a physics-driven breakout game
//!
//! Core modules:
//! - `physics`: Small rigid-body space with tagged collision reporting
//! - `sim`: Deterministic game logic (engine scene, levels, events)
//! - `config`: Data-driven tuning and level layouts
//! - `renderer`: WebGPU rendering pipeline
//! - `debug`: Inspector for live physics tuning

pub mod audio;
pub mod config;
pub mod debug;
pub mod game;
pub mod highscores;
pub mod physics;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use game::GameManager;
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Levels shipped with the embedded config
    pub const NUM_LEVELS: u16 = 3;
    /// Brick grid dimensions
    pub const GRID_COLS: usize = 10;
    pub const GRID_ROWS: usize = 7;

    pub const INITIAL_LIVES: u16 = 3;
    /// Extra-life capsules never push lives past this
    pub const MAX_LIVES: u16 = 5;
    /// Points per destroyed brick
    pub const BRICK_SCORE: u32 = 100;

    /// Smallest vertical speed fraction a free ball may keep
    pub const BALL_MIN_VERTICAL: f32 = 0.25;
    /// Widest bar deflection from vertical (radians, ~60 degrees)
    pub const BAR_MAX_DEFLECTION: f32 = 1.05;
    /// Gap between a joined ball and the bar top
    pub const JOINT_GAP: f32 = 1.0;
}
