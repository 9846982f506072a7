//! Sound cues
//!
//! The game only says *which* cue to play. On the web the cues are
//! procedurally generated with the Web Audio API, no sound files needed.

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Avatar flapped
    Jump,
    /// Pillar passed
    Point,
    /// Coin picked up
    Coin,
    /// Run over
    Crash,
}

impl SoundCue {
    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Jumped => Some(SoundCue::Jump),
            GameEvent::ObstaclePassed { .. } => Some(SoundCue::Point),
            GameEvent::CoinCollected { .. } => Some(SoundCue::Coin),
            GameEvent::RunEnded { .. } => Some(SoundCue::Crash),
            GameEvent::RunStarted { .. } => None,
        }
    }
}

/// Where cues go. Every call is fire-and-forget.
pub trait AudioSink {
    /// Play a cue from the start, cutting off a previous play of the same cue
    fn play(&mut self, cue: SoundCue);
    /// Start background music; `rewind` starts it from the beginning
    fn start_music(&mut self, rewind: bool);
    /// Stop background music and rewind it
    fn stop_music(&mut self);
    /// Effective volumes (0.0 - 1.0)
    fn set_volumes(&mut self, sfx: f32, music: f32);
}

/// Sink that drops everything (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: SoundCue) {}
    fn start_music(&mut self, _rewind: bool) {}
    fn stop_music(&mut self) {}
    fn set_volumes(&mut self, _sfx: f32, _music: f32) {}
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioSink, SoundCue};

    /// Web Audio backed sink
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        sfx_volume: f32,
        music_volume: f32,
        /// Last voice per cue, stopped when the cue restarts
        voices: Vec<(SoundCue, OscillatorNode)>,
        music: Option<(OscillatorNode, GainNode)>,
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
                sfx_volume: 0.1,
                music_volume: 0.02,
                voices: Vec::new(),
                music: None,
            }
        }

        /// Resume audio context (required after user gesture)
        fn resume(ctx: &AudioContext) {
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
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

        /// Short sweep from `from` to `to` Hz
        fn sweep(
            ctx: &AudioContext,
            vol: f32,
            osc_type: OscillatorType,
            from: f32,
            to: f32,
            secs: f64,
        ) -> Option<OscillatorNode> {
            let (osc, gain) = Self::create_osc(ctx, from, osc_type)?;
            let t = ctx.current_time();

            gain.gain().set_value_at_time(vol, t).ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.001, t + secs)
                .ok()?;
            osc.frequency().set_value_at_time(from, t).ok()?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + secs)
                .ok()?;

            osc.start().ok()?;
            osc.stop_with_when(t + secs + 0.02).ok()?;
            Some(osc)
        }

        fn voice(&self, ctx: &AudioContext, cue: SoundCue) -> Option<OscillatorNode> {
            let vol = self.sfx_volume;
            match cue {
                // Quick upward chirp
                SoundCue::Jump => Self::sweep(ctx, vol * 0.5, OscillatorType::Square, 300.0, 600.0, 0.08),
                // Bright blip
                SoundCue::Point => Self::sweep(ctx, vol * 0.6, OscillatorType::Sine, 880.0, 1320.0, 0.12),
                // Two-tone sparkle
                SoundCue::Coin => Self::sweep(ctx, vol * 0.6, OscillatorType::Triangle, 988.0, 1976.0, 0.15),
                // Falling thud
                SoundCue::Crash => Self::sweep(ctx, vol, OscillatorType::Sawtooth, 220.0, 40.0, 0.5),
            }
        }
    }

    impl AudioSink for AudioManager {
        fn play(&mut self, cue: SoundCue) {
            if self.sfx_volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            Self::resume(ctx);

            if let Some(pos) = self.voices.iter().position(|(c, _)| *c == cue) {
                let (_, old) = self.voices.swap_remove(pos);
                let _ = old.stop();
            }
            if let Some(osc) = self.voice(ctx, cue) {
                self.voices.push((cue, osc));
            }
        }

        fn start_music(&mut self, rewind: bool) {
            if rewind {
                self.stop_music();
            }
            if self.music.is_some() {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            Self::resume(ctx);

            // Low hum, looped until stopped
            let Some((osc, gain)) = Self::create_osc(ctx, 110.0, OscillatorType::Triangle) else {
                return;
            };
            gain.gain().set_value(self.music_volume);
            if osc.start().is_ok() {
                self.music = Some((osc, gain));
            }
        }

        fn stop_music(&mut self) {
            if let Some((osc, _)) = self.music.take() {
                let _ = osc.stop();
            }
        }

        fn set_volumes(&mut self, sfx: f32, music: f32) {
            self.sfx_volume = sfx.clamp(0.0, 1.0);
            self.music_volume = music.clamp(0.0, 1.0);
            if let Some((_, gain)) = &self.music {
                gain.gain().set_value(self.music_volume);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Difficulty, EndCause};

    #[test]
    fn test_cue_mapping() {
        assert_eq!(SoundCue::for_event(&GameEvent::Jumped), Some(SoundCue::Jump));
        assert_eq!(
            SoundCue::for_event(&GameEvent::ObstaclePassed { score: 1 }),
            Some(SoundCue::Point)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::RunEnded {
                score: 0,
                difficulty: Difficulty::Easy,
                cause: EndCause::HitObstacle,
            }),
            Some(SoundCue::Crash)
        );
        assert_eq!(
            SoundCue::for_event(&GameEvent::RunStarted {
                difficulty: Difficulty::Easy,
                restart: false,
            }),
            None
        );
    }
}
