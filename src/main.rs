//! Arkanoid entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use arkanoid::audio::{AudioManager, SoundEffect};
    use arkanoid::consts::*;
    use arkanoid::debug::DebugSnapshot;
    use arkanoid::renderer::{RenderState, shapes};
    use arkanoid::sim::{GameEvent, GameStatus, HudText, TickInput};
    use arkanoid::{GameConfig, GameManager, HighScores, Settings};

    /// Game instance holding all state
    struct Game {
        manager: GameManager,
        render_state: Option<RenderState>,
        audio: AudioManager,
        settings: Settings,
        high_scores: HighScores,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        /// Pointer position in stage units
        mouse: Vec2,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(manager: GameManager, settings: Settings) -> Self {
            let mut game = Self {
                manager,
                render_state: None,
                audio: AudioManager::new(),
                settings,
                high_scores: HighScores::load(),
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                mouse: Vec2::ZERO,
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            };
            game.apply_audio_settings();
            game
        }

        fn apply_audio_settings(&mut self) {
            self.audio.set_master_volume(self.settings.master_volume);
            self.audio.set_sfx_volume(self.settings.sfx_volume);
            self.audio.set_muted(self.settings.muted);
        }

        fn stage(&self) -> (f32, f32) {
            (
                self.manager.stage_width() as f32,
                self.manager.stage_height() as f32,
            )
        }

        fn debug_panel_visible(&self) -> bool {
            self.manager.debug_mode() || self.settings.debug_overlay
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, time: f64) {
            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                self.manager.scene_mut().tick(&input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.launch = false;
                self.input.restart = false;
                self.input.reset_scene = false;

                self.handle_events();
            }
            self.accumulator = self.accumulator.min(SIM_DT * MAX_SUBSTEPS as f32);

            // Track frame times for FPS
            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;

            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn handle_events(&mut self) {
            for event in self.manager.scene_mut().drain_events() {
                if let Some((effect, volume)) = SoundEffect::for_event(&event) {
                    self.audio.play(effect, volume);
                }
                match event {
                    GameEvent::GameOver { score } | GameEvent::Victory { score } => {
                        self.record_score(score);
                    }
                    _ => {}
                }
            }
        }

        fn record_score(&mut self, score: u32) {
            let level = self.manager.scene().current_level();
            if let Some(rank) = self
                .high_scores
                .add_score(score, level, js_sys::Date::now())
            {
                log::info!("New high score #{rank}: {score} (level {level})");
                self.high_scores.save();
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let vertices = shapes::scene_vertices(self.manager.scene());
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let scene = self.manager.scene();
            let hud = scene.hud();

            set_text(&document, "hud-level", &hud.level.text);
            set_text(&document, "hud-score", &hud.score.text);
            set_text(&document, "hud-lives", &format!("LIVES {}", scene.lives()));

            let fps = if self.settings.show_fps {
                format!("{} FPS", self.fps)
            } else {
                String::new()
            };
            set_text(&document, "hud-fps", &fps);

            let prompt = match scene.status() {
                GameStatus::Start => "PRESS SPACE TO LAUNCH",
                GameStatus::Finished if scene.bricks_remaining() == 0 => {
                    "YOU WIN! PRESS ENTER"
                }
                GameStatus::Finished => "GAME OVER - PRESS ENTER",
                GameStatus::Playing | GameStatus::None => "",
            };
            set_text(&document, "status-prompt", prompt);

            if self.debug_panel_visible()
                && let Some(snapshot) = DebugSnapshot::capture(scene)
            {
                let mut lines = snapshot.with_mouse(self.mouse).lines();
                if let Some(top) = self.high_scores.top_score() {
                    lines.push(format!("High Score: {top}"));
                }
                set_text(&document, "debug-panel", &lines.join("\n"));
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id)
            && el.text_content().as_deref() != Some(text)
        {
            el.set_text_content(Some(text));
        }
    }

    /// Pin a HUD label to its stage position
    fn place_text(document: &Document, id: &str, text: &HudText) {
        if let Some(el) = document.get_element_by_id(id) {
            let style = format!("left:{}px;top:{}px", text.pos.x, text.pos.y);
            let _ = el.set_attribute("style", &style);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Arkanoid starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let debug_mode = window
            .location()
            .search()
            .is_ok_and(|query| GameManager::debug_query(&query));

        let config = match GameConfig::embedded() {
            Ok(config) => config,
            Err(e) => {
                log::error!("Embedded config is invalid: {e}");
                return;
            }
        };
        for warning in config.validate() {
            log::warn!("config: {warning}");
        }

        let seed = js_sys::Date::now() as u64;
        let mut manager = GameManager::from_config(config, debug_mode, seed);
        manager.scene_mut().init();
        log::info!("Game initialized with seed: {}", seed);

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let game = Rc::new(RefCell::new(Game::new(manager, Settings::load())));
        let stage = game.borrow().stage();

        // The canvas is laid out at stage size, backed at device resolution
        let _ = canvas.set_attribute(
            "style",
            &format!("width:{}px;height:{}px", stage.0, stage.1),
        );
        let dpr = window.device_pixel_ratio();
        let width = (stage.0 as f64 * dpr) as u32;
        let height = (stage.1 as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        {
            let g = game.borrow();
            let hud = g.manager.scene().hud();
            place_text(&document, "hud-level", &hud.level);
            place_text(&document, "hud-score", &hud.score);
            if !g.debug_panel_visible()
                && let Some(panel) = document.get_element_by_id("debug-panel")
            {
                let _ = panel.set_attribute("class", "hidden");
            }
        }

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height, stage).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Failed to create device: {e}"),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_auto_mute(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Arkanoid running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move - tracked for the debug panel
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let (stage_w, stage_h) = g.stage();
                let w = canvas_clone.client_width().max(1) as f32;
                let h = canvas_clone.client_height().max(1) as f32;
                g.mouse = Vec2::new(
                    event.offset_x() as f32 * stage_w / w,
                    event.offset_y() as f32 * stage_h / h,
                );
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click - unlock audio and launch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut g = game.borrow_mut();
                g.audio.resume();
                g.input.launch = true;
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let window = web_sys::window().expect("no window");

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.left = true,
                    "ArrowRight" | "d" | "D" => g.input.right = true,
                    " " => {
                        event.prevent_default();
                        g.audio.resume();
                        g.input.launch = true;
                    }
                    "Enter" => g.input.restart = true,
                    "r" | "R" if g.debug_panel_visible() => g.input.reset_scene = true,
                    "m" | "M" => {
                        g.settings.toggle_mute();
                        g.apply_audio_settings();
                        g.settings.save();
                        log::info!("Muted: {}", g.settings.muted);
                    }
                    "f" | "F" => {
                        g.settings.show_fps = !g.settings.show_fps;
                        g.settings.save();
                    }
                    "i" | "I" => {
                        g.input.autopilot = !g.input.autopilot;
                        log::info!("Autopilot: {}", g.input.autopilot);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up - release held movement
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.input.left = false,
                    "ArrowRight" | "d" | "D" => g.input.right = false,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_mute(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Window blur (click outside): silence and drop held keys
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                g.input.left = false;
                g.input.right = false;
                if g.settings.mute_on_blur {
                    g.audio.set_muted(true);
                    log::info!("Auto-muted (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus restores the saved mute preference
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let muted = g.settings.muted;
                g.audio.set_muted(muted);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use clap::Parser;

    use arkanoid::audio::{AudioManager, SoundEffect};
    use arkanoid::consts::*;
    use arkanoid::debug::DebugSnapshot;
    use arkanoid::sim::{GameEvent, GameStatus, TickInput};
    use arkanoid::{ConfigError, GameConfig, GameManager, HighScores, Settings};

    /// Plays Arkanoid with the autopilot and logs what happens
    #[derive(Parser, Debug)]
    #[command(author, version, about = "Headless Arkanoid autopilot runner", long_about = None)]
    struct Cli {
        /// Simulation ticks to run at most
        #[arg(long, default_value_t = 120 * 600)]
        ticks: u64,
        /// RNG seed for power-up drops (defaults to the clock)
        #[arg(long)]
        seed: Option<u64>,
        /// JSON tuning file; falls back to the embedded one if missing
        #[arg(long)]
        config: Option<PathBuf>,
        /// Games to finish before stopping
        #[arg(long, default_value_t = 1)]
        games: u32,
        /// Pace frames with the configured sleep time
        #[arg(long)]
        realtime: bool,
    }

    fn now_ms() -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or_default()
    }

    pub fn run() -> Result<(), ConfigError> {
        // `-debug` is a bare first argument, kept out of clap's short flags
        let args: Vec<String> = std::env::args().collect();
        let debug_mode = GameManager::debug_flag(&args);
        let cli = Cli::parse_from(
            args.iter()
                .enumerate()
                .filter(|&(i, _)| !(debug_mode && i == 1))
                .map(|(_, a)| a),
        );

        let config = match &cli.config {
            Some(path) => GameConfig::load_or_default(path)?,
            None => GameConfig::embedded()?,
        };
        for warning in config.validate() {
            log::warn!("config: {warning}");
        }

        let seed = cli.seed.unwrap_or_else(|| now_ms() as u64);
        let mut manager = GameManager::from_config(config, debug_mode, seed);
        log::info!(
            "Stage {}x{}, seed {seed}",
            manager.stage_width(),
            manager.stage_height()
        );

        let settings = Settings::load();
        let mut audio = AudioManager::new();
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        let mut high_scores = HighScores::load();

        let frame_secs = manager.sleep_ms() / 1000.0;
        let ticks_per_frame = ((frame_secs / f64::from(SIM_DT)).round() as u32).clamp(1, MAX_SUBSTEPS);
        let frame = Duration::from_secs_f64(frame_secs.max(0.0));

        manager.scene_mut().init();

        let autopilot = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let restart = TickInput {
            restart: true,
            ..autopilot.clone()
        };

        let mut ticks = 0u64;
        let mut games_finished = 0u32;
        'frames: while ticks < cli.ticks {
            for _ in 0..ticks_per_frame {
                let scene = manager.scene_mut();
                let input = if scene.status() == GameStatus::Finished {
                    &restart
                } else {
                    &autopilot
                };
                scene.tick(input, SIM_DT);
                ticks += 1;

                for event in scene.drain_events() {
                    log::info!("[{ticks:>6}] {event:?}");
                    if let Some((effect, volume)) = SoundEffect::for_event(&event) {
                        audio.play(effect, volume);
                    }
                    if let GameEvent::GameOver { score } | GameEvent::Victory { score } = event {
                        let level = scene.current_level();
                        if let Some(rank) = high_scores.add_score(score, level, now_ms()) {
                            log::info!("High score #{rank}: {score} (level {level})");
                        }
                        games_finished += 1;
                    }
                }

                if debug_mode
                    && ticks % 600 == 0
                    && let Some(snapshot) = DebugSnapshot::capture(scene)
                {
                    for line in snapshot.lines() {
                        log::debug!("{line}");
                    }
                }

                if games_finished >= cli.games || ticks >= cli.ticks {
                    break 'frames;
                }
            }
            if cli.realtime {
                std::thread::sleep(frame);
            }
        }

        let scene = manager.scene();
        log::info!(
            "Stopped after {ticks} ticks: {:?}, level {}/{}, score {}, lives {}, bricks left {}",
            scene.status(),
            scene.current_level(),
            scene.total_levels(),
            scene.score(),
            scene.lives(),
            scene.bricks_remaining()
        );
        if let Some(top) = high_scores.top_score() {
            log::info!("Top score: {top}");
        }
        high_scores.save();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Arkanoid (native) starting...");

    if let Err(e) = headless::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
