//! Top-level game owner: stage size, frame pacing and the scene

use crate::config::GameConfig;
use crate::sim::EngineScene;

/// Owns the scene plus the window parameters picked at startup
pub struct GameManager {
    stage_width: u32,
    stage_height: u32,
    sleep_ms: f64,
    debug_mode: bool,
    scene: EngineScene,
}

impl GameManager {
    /// Pick the normal or debug window size and build an uninitialised scene
    pub fn from_config(config: GameConfig, debug_mode: bool, seed: u64) -> Self {
        let window = &config.window;
        let (stage_width, stage_height) = if debug_mode {
            (window.debug_width, window.debug_height)
        } else {
            (window.normal_width, window.normal_height)
        };
        let sleep_ms = window.sleep_ms;
        if debug_mode {
            log::info!("DEBUG MODE ON");
        }

        Self {
            stage_width,
            stage_height,
            sleep_ms,
            debug_mode,
            scene: EngineScene::new(config, seed),
        }
    }

    /// `true` if the first argument (after the program name) is `-debug`
    pub fn debug_flag<I, S>(args: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter()
            .nth(1)
            .is_some_and(|a| a.as_ref() == "-debug")
    }

    /// `true` if a URL query string (`?level=2&debug`) carries a `debug` key
    pub fn debug_query(query: &str) -> bool {
        query
            .trim_start_matches('?')
            .split('&')
            .any(|pair| pair.split('=').next() == Some("debug"))
    }

    pub fn stage_width(&self) -> u32 {
        self.stage_width
    }

    pub fn stage_height(&self) -> u32 {
        self.stage_height
    }

    pub fn sleep_ms(&self) -> f64 {
        self.sleep_ms
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn scene(&self) -> &EngineScene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut EngineScene {
        &mut self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameStatus;

    #[test]
    fn test_window_size_follows_debug_mode() {
        let config = GameConfig::embedded().unwrap();
        let normal = GameManager::from_config(config.clone(), false, 1);
        assert_eq!(normal.stage_width(), config.window.normal_width);
        assert_eq!(normal.stage_height(), config.window.normal_height);
        assert!(!normal.debug_mode());

        let debug = GameManager::from_config(config.clone(), true, 1);
        assert_eq!(debug.stage_width(), config.window.debug_width);
        assert_eq!(debug.sleep_ms(), config.window.sleep_ms);
        assert!(debug.debug_mode());
        assert_eq!(debug.scene().status(), GameStatus::None);
    }

    #[test]
    fn test_debug_flag() {
        assert!(GameManager::debug_flag(["arkanoid", "-debug"]));
        assert!(!GameManager::debug_flag(["arkanoid"]));
        assert!(!GameManager::debug_flag(["arkanoid", "--ticks", "-debug"]));
        assert!(!GameManager::debug_flag(["arkanoid", "-debugger"]));
    }

    #[test]
    fn test_debug_query_matches_key_only() {
        assert!(GameManager::debug_query("?debug"));
        assert!(GameManager::debug_query("?seed=4&debug=1"));
        assert!(!GameManager::debug_query(""));
        assert!(!GameManager::debug_query("?nodebug"));
        assert!(!GameManager::debug_query("?x=debugger"));
    }
}
