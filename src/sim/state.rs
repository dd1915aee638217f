//! Game status, events, HUD text and per-tick input

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::BrickKind;
use crate::physics::CollisionTag;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameStatus {
    /// Scene constructed but not initialised
    #[default]
    None,
    /// Ball resting on the bar, waiting for launch
    Start,
    /// Ball in play
    Playing,
    /// Out of lives or every level cleared; waiting for restart
    Finished,
}

/// Power-up types carried by falling capsules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    ExtraLife,
    WidenBar,
    SlowBall,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::ExtraLife,
        PowerUpKind::WidenBar,
        PowerUpKind::SlowBall,
    ];
}

/// Gameplay events emitted by the scene for the front end (audio, HUD, logs)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ball left the bar
    Launched,
    /// Ball bounced off the bar or a wall
    Bounce { tag: CollisionTag },
    BrickDestroyed { kind: BrickKind, score: u32 },
    LifeLost { lives_left: u16 },
    PowerUpSpawned { kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind },
    LevelCleared { next_level: u16 },
    GameOver { score: u32 },
    Victory { score: u32 },
    GameReset,
}

/// Text position for HUD entries (stage coordinates)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HudText {
    pub text: String,
    pub pos: Vec2,
}

/// HUD text shown above the stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub level: HudText,
    pub score: HudText,
}

impl Default for Hud {
    fn default() -> Self {
        let mut hud = Self {
            level: HudText {
                text: String::new(),
                pos: Vec2::new(450.0, 60.0),
            },
            score: HudText {
                text: String::new(),
                pos: Vec2::new(588.0, 60.0),
            },
        };
        hud.set_level(1);
        hud.set_score(0);
        hud
    }
}

impl Hud {
    pub fn set_level(&mut self, level: u16) {
        self.level.text = format!("LEVEL {level}");
    }

    pub fn set_score(&mut self, score: u32) {
        self.score.text = format!("SCORE          {score}");
    }
}

/// A remaining-life icon: a half-size bar sprite
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifeIcon {
    pub pos: Vec2,
    pub scale: f32,
}

/// Icon positions for the remaining lives, left to right
pub fn life_icon_positions(lives: u16) -> Vec<LifeIcon> {
    (0..lives)
        .map(|i| LifeIcon {
            pos: Vec2::new(46.0 + 70.0 * f32::from(i), 50.0),
            scale: 0.5,
        })
        .collect()
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move bar left (held)
    pub left: bool,
    /// Move bar right (held)
    pub right: bool,
    /// Launch the ball (space)
    pub launch: bool,
    /// Start a new game once finished (enter)
    pub restart: bool,
    /// Restore tuning and restart (debug panel button)
    pub reset_scene: bool,
    /// Autopilot - AI plays the game
    pub autopilot: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_text_format() {
        let mut hud = Hud::default();
        assert_eq!(hud.level.text, "LEVEL 1");
        assert_eq!(hud.score.text, "SCORE          0");

        hud.set_level(3);
        hud.set_score(1200);
        assert_eq!(hud.level.text, "LEVEL 3");
        assert_eq!(hud.score.text, "SCORE          1200");
    }

    #[test]
    fn test_life_icons() {
        assert!(life_icon_positions(0).is_empty());
        let icons = life_icon_positions(3);
        assert_eq!(icons.len(), 3);
        assert_eq!(icons[0].pos, Vec2::new(46.0, 50.0));
        assert_eq!(icons[2].pos, Vec2::new(186.0, 50.0));
        assert!(icons.iter().all(|i| i.scale == 0.5));
    }
}
