//! Audio boundary
//!
//! Procedurally described sound effects - no external files needed. The
//! host supplies an `AudioSink` that turns a `Tone` into sound; playback is
//! best-effort and a failing sink never reaches the simulation.

use thiserror::Error;

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    Jump,
    /// Coin collected
    Coin,
    /// Block struck without breaking
    Bump,
    BrickBreak,
    /// Power-up rises out of a block
    PowerUpAppears,
    PowerUp,
    Stomp,
    Kick,
    /// Super form lost
    PowerDown,
    Death,
    Flagpole,
    StageClear,
}

impl SoundEffect {
    /// Sound cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        let effect = match event {
            GameEvent::PlayerJumped => SoundEffect::Jump,
            GameEvent::CoinCollected => SoundEffect::Coin,
            GameEvent::BlockBumped => SoundEffect::Bump,
            GameEvent::BrickBroken => SoundEffect::BrickBreak,
            GameEvent::PowerUpSpawned => SoundEffect::PowerUpAppears,
            GameEvent::PowerUpCollected => SoundEffect::PowerUp,
            GameEvent::EnemyStomped => SoundEffect::Stomp,
            GameEvent::ShellKicked | GameEvent::EnemyKnockedOut => SoundEffect::Kick,
            GameEvent::PlayerDamaged => SoundEffect::PowerDown,
            GameEvent::PlayerDied => SoundEffect::Death,
            GameEvent::FlagpoleReached => SoundEffect::Flagpole,
            GameEvent::LevelComplete => SoundEffect::StageClear,
            GameEvent::Score(_) | GameEvent::PlayerLost => return None,
        };
        Some(effect)
    }

    /// Synthesis recipe
    pub fn tone(self) -> Tone {
        use Waveform::*;
        match self {
            SoundEffect::Jump => Tone::sweep(300.0, 700.0, 0.15, Square),
            SoundEffect::Coin => Tone::sweep(988.0, 1319.0, 0.2, Square),
            SoundEffect::Bump => Tone::sweep(180.0, 90.0, 0.08, Triangle),
            SoundEffect::BrickBreak => Tone::sweep(400.0, 60.0, 0.25, Sawtooth),
            SoundEffect::PowerUpAppears => Tone::sweep(200.0, 800.0, 0.4, Triangle),
            SoundEffect::PowerUp => Tone::sweep(400.0, 1600.0, 0.5, Square),
            SoundEffect::Stomp => Tone::sweep(600.0, 200.0, 0.1, Square),
            SoundEffect::Kick => Tone::sweep(900.0, 500.0, 0.08, Square),
            SoundEffect::PowerDown => Tone::sweep(800.0, 200.0, 0.5, Square),
            SoundEffect::Death => Tone::sweep(500.0, 80.0, 1.2, Triangle),
            SoundEffect::Flagpole => Tone::sweep(1200.0, 300.0, 1.0, Sine),
            SoundEffect::StageClear => Tone::sweep(523.0, 1047.0, 1.5, Square),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// A single oscillator sweep with a decaying envelope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq_start: f32,
    pub freq_end: f32,
    /// Seconds
    pub duration: f32,
    pub waveform: Waveform,
}

impl Tone {
    pub const fn sweep(freq_start: f32, freq_end: f32, duration: f32, waveform: Waveform) -> Self {
        Self {
            freq_start,
            freq_end,
            duration,
            waveform,
        }
    }
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio output not ready")]
    NotReady,
    #[error("audio backend failed: {0}")]
    Backend(String),
}

/// Host audio output
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, tone: Tone, volume: f32) -> Result<(), AudioError>;
}

/// Sink that only logs what would be played (headless runs)
#[derive(Debug, Default)]
pub struct LogSink {
    pub played: usize,
}

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect, tone: Tone, volume: f32) -> Result<(), AudioError> {
        self.played += 1;
        log::trace!(
            "sfx {effect:?}: {:.0}->{:.0} Hz {:.2}s vol {volume:.2}",
            tone.freq_start,
            tone.freq_end,
            tone.duration
        );
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(sink: S, settings: &Settings) -> Self {
        let mut audio = Self::new(sink);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        audio
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
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

    /// Play a sound effect; failures are logged and dropped
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        match self.sink.play(effect, effect.tone(), vol) {
            Ok(()) => {}
            // Retried naturally the next time the effect fires
            Err(AudioError::NotReady) => log::debug!("audio not ready; dropped {effect:?}"),
            Err(err) => log::warn!("failed to play {effect:?}: {err}"),
        }
    }

    /// Play the cue for every event that has one
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        played: Vec<(SoundEffect, f32)>,
        fail: bool,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, _tone: Tone, volume: f32) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::Backend("device lost".to_string()));
            }
            self.played.push((effect, volume));
            Ok(())
        }
    }

    #[test]
    fn test_events_map_to_effects() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.handle_events(&[
            GameEvent::Score(200),
            GameEvent::CoinCollected,
            GameEvent::EnemyStomped,
            GameEvent::PlayerLost,
        ]);
        let effects: Vec<SoundEffect> = audio.sink().played.iter().map(|(e, _)| *e).collect();
        assert_eq!(effects, vec![SoundEffect::Coin, SoundEffect::Stomp]);
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut settings = Settings::default();
        settings.muted = true;
        let mut audio = AudioManager::from_settings(Recorder::default(), &settings);
        audio.play(SoundEffect::Jump);
        assert!(audio.sink().played.is_empty());
    }

    #[test]
    fn test_settings_volumes_multiply() {
        let mut settings = Settings::default();
        settings.master_volume = 0.5;
        settings.sfx_volume = 0.5;
        let mut audio = AudioManager::from_settings(Recorder::default(), &settings);
        audio.play(SoundEffect::Coin);
        assert_eq!(audio.sink().played, vec![(SoundEffect::Coin, 0.25)]);
    }

    #[test]
    fn test_volume_applied() {
        let mut audio = AudioManager::new(Recorder::default());
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(2.0);
        audio.play(SoundEffect::Kick);
        assert_eq!(audio.sink().played, vec![(SoundEffect::Kick, 0.5)]);
    }

    #[test]
    fn test_sink_failure_is_swallowed() {
        let mut audio = AudioManager::new(Recorder {
            fail: true,
            ..Default::default()
        });
        audio.handle_events(&[GameEvent::BrickBroken, GameEvent::PlayerDied]);
        assert!(audio.sink().played.is_empty());
    }
}
