//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by body handle)
//! - No rendering or platform dependencies

pub mod level;
pub mod scene;
pub mod state;

pub use level::{BrickKind, BrickSlot, brick_layout, cell_center};
pub use scene::{ActiveEffects, Brick, Capsule, EngineScene, Walls};
pub use state::{
    GameEvent, GameStatus, Hud, HudText, LifeIcon, PowerUpKind, TickInput, life_icon_positions,
};
