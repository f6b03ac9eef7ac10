//! Audio mixing without a backend
//!
//! Tracks volumes, a pool of one-shot effect voices and the two looping
//! channels (music and ambient wind). The host plays whatever this says is
//! playing at the volumes it reports.

use serde::{Deserialize, Serialize};

use crate::consts::FADE_STOP_THRESHOLD;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player jump
    Jump,
    /// Wing flap, throttled
    Flap,
    /// Player bumps an obstacle
    Collision,
    /// Something dangerous was hit
    DangerousHit,
    /// Lightning strike
    Thunder,
    /// Run ended
    GameOver,
}

impl SoundEffect {
    /// Per-effect volume scale
    pub fn volume_scale(self) -> f32 {
        match self {
            SoundEffect::Flap => 0.7,
            SoundEffect::Collision => 0.8,
            _ => 1.0,
        }
    }

    /// Clip length in seconds, a voice is busy this long
    pub fn length(self) -> f32 {
        match self {
            SoundEffect::Jump => 0.25,
            SoundEffect::Flap => 0.15,
            SoundEffect::Collision => 0.3,
            SoundEffect::DangerousHit => 0.4,
            SoundEffect::Thunder => 2.5,
            SoundEffect::GameOver => 1.5,
        }
    }
}

/// Looping channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    Music,
    Ambient,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    stop_at_end: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct ChannelState {
    playing: bool,
    volume: f32,
    fade: Option<Fade>,
}

impl ChannelState {
    fn tick(&mut self, dt: f32) {
        let Some(fade) = &mut self.fade else {
            return;
        };
        fade.elapsed += dt;
        if fade.duration <= 0.0 || fade.elapsed >= fade.duration {
            self.volume = fade.to;
            if fade.stop_at_end && fade.to <= FADE_STOP_THRESHOLD {
                self.playing = false;
            }
            self.fade = None;
        } else {
            let t = fade.elapsed / fade.duration;
            self.volume = fade.from + (fade.to - fade.from) * t;
        }
    }
}

/// A pooled effect voice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voice {
    pub effect: Option<SoundEffect>,
    pub volume: f32,
    remaining: f32,
}

impl Voice {
    fn idle() -> Self {
        Self {
            effect: None,
            volume: 0.0,
            remaining: 0.0,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.effect.is_some()
    }
}

/// Audio manager for the game
#[derive(Debug, Clone)]
pub struct AudioManager {
    master_volume: f32,
    music_volume: f32,
    ambient_volume: f32,
    sfx_volume: f32,
    muted: bool,
    voices: Vec<Voice>,
    music: ChannelState,
    ambient: ChannelState,
    min_flap_delay: f32,
    flap_cooldown: f32,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(10)
    }
}

impl AudioManager {
    pub fn new(pool_size: usize) -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.12,
            ambient_volume: 0.15,
            sfx_volume: 1.0,
            muted: false,
            voices: vec![Voice::idle(); pool_size],
            music: ChannelState::default(),
            ambient: ChannelState::default(),
            min_flap_delay: 0.15,
            flap_cooldown: 0.0,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Set ambient volume (0.0 - 1.0)
    pub fn set_ambient_volume(&mut self, vol: f32) {
        self.ambient_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 2.0, effects may be boosted)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 2.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn sfx_volume(&self) -> f32 {
        self.sfx_volume
    }

    fn category_volume(&self, channel: Channel) -> f32 {
        match channel {
            Channel::Music => self.music_volume,
            Channel::Ambient => self.ambient_volume,
        }
    }

    fn channel_mut(&mut self, channel: Channel) -> &mut ChannelState {
        match channel {
            Channel::Music => &mut self.music,
            Channel::Ambient => &mut self.ambient,
        }
    }

    fn channel(&self, channel: Channel) -> &ChannelState {
        match channel {
            Channel::Music => &self.music,
            Channel::Ambient => &self.ambient,
        }
    }

    /// Volume an effect would play at with the given scale
    pub fn effective_sfx_volume(&self, scale: f32) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume * scale
        }
    }

    /// Volume for a dangerous object's own hit sound
    pub fn dangerous_hit_volume(&self, local_scale: f32) -> f32 {
        self.sfx_volume * local_scale.clamp(0.0, 1.0)
    }

    pub fn pool_size(&self) -> usize {
        self.voices.len()
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().filter(|v| v.is_busy()).count()
    }

    fn acquire_voice(&mut self) -> &mut Voice {
        let index = match self.voices.iter().position(|v| !v.is_busy()) {
            Some(index) => index,
            None => {
                log::warn!("SFX voice pool exhausted, growing to {}", self.voices.len() + 1);
                self.voices.push(Voice::idle());
                self.voices.len() - 1
            }
        };
        &mut self.voices[index]
    }

    /// Play an effect at its default scale, returns the volume used
    pub fn play(&mut self, effect: SoundEffect) -> f32 {
        self.play_scaled(effect, effect.volume_scale())
    }

    /// Play an effect with an explicit volume scale
    ///
    /// A dangerous hit sounds from the object itself, so it follows the SFX
    /// level but not the master volume.
    pub fn play_scaled(&mut self, effect: SoundEffect, scale: f32) -> f32 {
        let volume = match effect {
            SoundEffect::DangerousHit if !self.muted => self.dangerous_hit_volume(scale),
            _ => self.effective_sfx_volume(scale),
        };
        let voice = self.acquire_voice();
        voice.effect = Some(effect);
        voice.volume = volume;
        voice.remaining = effect.length();
        volume
    }

    /// Flap sound, skipped while the previous flap is still cooling down
    pub fn play_flap(&mut self) -> Option<f32> {
        if self.flap_cooldown > 0.0 {
            return None;
        }
        self.flap_cooldown = self.min_flap_delay;
        Some(self.play(SoundEffect::Flap))
    }

    /// Start a looping channel at a fraction of its category volume
    pub fn play_channel(&mut self, channel: Channel, initial_scale: f32) {
        let volume = self.master_volume * self.category_volume(channel) * initial_scale;
        let state = self.channel_mut(channel);
        state.playing = true;
        state.volume = volume;
        state.fade = None;
    }

    /// Fade a channel in, starting it silent if it is not playing
    pub fn fade_in(&mut self, channel: Channel, duration: f32, target_scale: f32) {
        if !self.channel(channel).playing {
            self.play_channel(channel, 0.0);
        }
        let to = self.master_volume * self.category_volume(channel) * target_scale;
        let state = self.channel_mut(channel);
        state.fade = Some(Fade {
            from: state.volume,
            to,
            duration,
            elapsed: 0.0,
            stop_at_end: false,
        });
    }

    /// Fade a channel to silence and stop it
    pub fn fade_out(&mut self, channel: Channel, duration: f32) {
        let state = self.channel_mut(channel);
        if !state.playing {
            return;
        }
        state.fade = Some(Fade {
            from: state.volume,
            to: 0.0,
            duration,
            elapsed: 0.0,
            stop_at_end: true,
        });
    }

    pub fn is_playing(&self, channel: Channel) -> bool {
        self.channel(channel).playing
    }

    pub fn channel_volume(&self, channel: Channel) -> f32 {
        let state = self.channel(channel);
        if self.muted || !state.playing {
            0.0
        } else {
            state.volume
        }
    }

    /// Stop every channel and voice
    pub fn stop_all(&mut self) {
        self.music = ChannelState::default();
        self.ambient = ChannelState::default();
        for voice in &mut self.voices {
            *voice = Voice::idle();
        }
    }

    /// Advance fades and return finished voices to the pool
    pub fn update(&mut self, dt: f32) {
        self.flap_cooldown = (self.flap_cooldown - dt).max(0.0);
        self.music.tick(dt);
        self.ambient.tick(dt);
        for voice in &mut self.voices {
            if voice.is_busy() {
                voice.remaining -= dt;
                if voice.remaining <= 0.0 {
                    *voice = Voice::idle();
                }
            }
        }
    }
}
