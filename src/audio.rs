//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! Native builds get a silent manager with the same interface.

use crate::physics::CollisionTag;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball launched, new level, new game
    Start,
    /// Ball hits bar or wall
    Bounce,
    /// Capsule collected
    PowerUp,
    /// Ball lost
    Die,
    /// Brick breaks, one voice per brick kind
    Break1,
    Break2,
    Break3,
}

impl SoundEffect {
    /// Sound and relative volume for a gameplay event, if it makes any
    pub fn for_event(event: &GameEvent) -> Option<(SoundEffect, f32)> {
        let sound = match *event {
            GameEvent::Launched => (SoundEffect::Start, 0.6),
            GameEvent::Bounce {
                tag: CollisionTag::Bar,
            } => (SoundEffect::Bounce, 0.8),
            GameEvent::Bounce { .. } => (SoundEffect::Bounce, 0.4),
            GameEvent::BrickDestroyed { kind, .. } => {
                let effect = match kind.value() {
                    1 => SoundEffect::Break1,
                    2 => SoundEffect::Break2,
                    _ => SoundEffect::Break3,
                };
                (effect, 0.7)
            }
            GameEvent::PowerUpCollected { .. } => (SoundEffect::PowerUp, 0.8),
            GameEvent::LifeLost { .. } => (SoundEffect::Die, 1.0),
            GameEvent::GameOver { .. } => (SoundEffect::Die, 1.0),
            GameEvent::LevelCleared { .. } | GameEvent::GameReset => (SoundEffect::Start, 1.0),
            GameEvent::Victory { .. } => (SoundEffect::PowerUp, 1.0),
            GameEvent::PowerUpSpawned { .. } => return None,
        };
        Some(sound)
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(not(target_arch = "wasm32"))]
pub use silent::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::SoundEffect;

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        fn effective_volume(&self) -> f32 {
            if self.muted {
                0.0
            } else {
                self.master_volume * self.sfx_volume
            }
        }

        /// Play a sound effect at `volume` (0.0 - 1.0, scaled by the mix)
        pub fn play(&self, effect: SoundEffect, volume: f32) {
            let vol = self.effective_volume() * volume.clamp(0.0, 1.0);
            if vol <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::Start => self.play_start(ctx, vol),
                SoundEffect::Bounce => self.play_bounce(ctx, vol),
                SoundEffect::PowerUp => self.play_powerup(ctx, vol),
                SoundEffect::Die => self.play_die(ctx, vol),
                SoundEffect::Break1 => self.play_break(ctx, vol, 520.0),
                SoundEffect::Break2 => self.play_break(ctx, vol, 660.0),
                SoundEffect::Break3 => self.play_break(ctx, vol, 820.0),
            }
        }

        // === Sound generators ===

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        /// Start - rising arpeggio
        fn play_start(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [330.0, 440.0, 660.0].iter().enumerate() {
                let delay = i as f64 * 0.07;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Square) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.15, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.15).ok();
                }
            }
        }

        /// Bounce - short blip
        fn play_bounce(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 440.0, OscillatorType::Square) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.06)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.08).ok();
        }

        /// Brick break - pitched chirp down
        fn play_break(&self, ctx: &AudioContext, vol: f32, freq: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, freq, OscillatorType::Triangle) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.35, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.frequency().set_value_at_time(freq, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(freq * 0.5, t + 0.12)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }

        /// Power-up - happy ding
        fn play_powerup(&self, ctx: &AudioContext, vol: f32) {
            for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
                let delay = i as f64 * 0.08;
                if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.25, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.2).ok();
                }
            }
        }

        /// Die - sad descending
        fn play_die(&self, ctx: &AudioContext, vol: f32) {
            let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sawtooth) else {
                return;
            };
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.6)
                .ok();
            osc.frequency().set_value_at_time(300.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.6)
                .ok();

            osc.start().ok();
            osc.stop_with_when(t + 0.7).ok();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod silent {
    use super::SoundEffect;

    /// Audio manager stub for native builds
    #[derive(Debug, Default)]
    pub struct AudioManager {
        master_volume: f32,
        sfx_volume: f32,
        muted: bool,
    }

    impl AudioManager {
        pub fn new() -> Self {
            Self {
                master_volume: 0.8,
                sfx_volume: 1.0,
                muted: false,
            }
        }

        pub fn resume(&self) {}

        pub fn set_master_volume(&mut self, vol: f32) {
            self.master_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_sfx_volume(&mut self, vol: f32) {
            self.sfx_volume = vol.clamp(0.0, 1.0);
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn play(&self, effect: SoundEffect, volume: f32) {
            if !self.muted {
                log::trace!(
                    "sfx {effect:?} at {:.2}",
                    volume * self.master_volume * self.sfx_volume
                );
            }
        }
    }
}
