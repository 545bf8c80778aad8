//! Audio and haptic capabilities.
//!
//! The core never talks to a sound card or vibration motor directly; it is
//! handed trait objects at construction. Either capability may be missing
//! entirely, and every call that can fail returns a [`PlaybackError`] value.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::PlaybackError;

/// The three channels a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelRole {
    /// Looping ticking cue while the countdown runs.
    Tension,
    /// One-shot explosion cue.
    Impact,
    /// Looping background bed, faded between levels.
    Ambient,
}

impl ChannelRole {
    pub const ALL: [ChannelRole; 3] = [
        ChannelRole::Tension,
        ChannelRole::Impact,
        ChannelRole::Ambient,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelRole::Tension => "tension",
            ChannelRole::Impact => "impact",
            ChannelRole::Ambient => "ambient",
        }
    }
}

/// A playable audio source.
pub trait AudioChannel {
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self) -> Result<(), PlaybackError>;
    /// Current volume in `[0, 1]`.
    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
    fn set_playback_rate(&mut self, rate: f32);
    /// Seek, in seconds from the start of the source.
    fn set_current_time(&mut self, secs: f64);
    fn set_loop(&mut self, looping: bool);
}

/// A vibration motor.
pub trait HapticDevice {
    /// Alternating on/off durations in milliseconds, starting with "on".
    fn vibrate(&mut self, pattern: &[u32]) -> Result<(), PlaybackError>;
}

/// Observable state of a [`MemoryChannel`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelState {
    pub playing: bool,
    pub volume: f32,
    pub playback_rate: f32,
    pub position_secs: f64,
    pub looping: bool,
    pub play_calls: u32,
    /// Every volume written, oldest first.
    pub volume_history: Vec<f32>,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            playing: false,
            volume: 1.0,
            playback_rate: 1.0,
            position_secs: 0.0,
            looping: false,
            play_calls: 0,
            volume_history: Vec::new(),
        }
    }
}

/// In-memory channel. Clones share state, so a test can keep a probe while
/// the session owns the original.
#[derive(Debug, Clone, Default)]
pub struct MemoryChannel {
    state: Rc<RefCell<ChannelState>>,
    failure: Option<PlaybackError>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel whose `play` and `pause` always fail with `error`.
    pub fn failing(error: PlaybackError) -> Self {
        Self {
            state: Rc::default(),
            failure: Some(error),
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state.borrow().clone()
    }

    pub fn is_playing(&self) -> bool {
        self.state.borrow().playing
    }

    pub fn current_volume(&self) -> f32 {
        self.state.borrow().volume
    }
}

impl AudioChannel for MemoryChannel {
    fn play(&mut self) -> Result<(), PlaybackError> {
        let mut state = self.state.borrow_mut();
        state.play_calls += 1;
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.state.borrow_mut().playing = false;
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, volume: f32) {
        let mut state = self.state.borrow_mut();
        state.volume = volume;
        state.volume_history.push(volume);
    }

    fn set_playback_rate(&mut self, rate: f32) {
        self.state.borrow_mut().playback_rate = rate;
    }

    fn set_current_time(&mut self, secs: f64) {
        self.state.borrow_mut().position_secs = secs;
    }

    fn set_loop(&mut self, looping: bool) {
        self.state.borrow_mut().looping = looping;
    }
}

/// In-memory haptics recording every pattern it receives.
#[derive(Debug, Clone, Default)]
pub struct MemoryHaptics {
    patterns: Rc<RefCell<Vec<Vec<u32>>>>,
    failure: Option<PlaybackError>,
}

impl MemoryHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: PlaybackError) -> Self {
        Self {
            patterns: Rc::default(),
            failure: Some(error),
        }
    }

    pub fn patterns(&self) -> Vec<Vec<u32>> {
        self.patterns.borrow().clone()
    }
}

impl HapticDevice for MemoryHaptics {
    fn vibrate(&mut self, pattern: &[u32]) -> Result<(), PlaybackError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.patterns.borrow_mut().push(pattern.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_sees_owner_writes() {
        let probe = MemoryChannel::new();
        let mut owned: Box<dyn AudioChannel> = Box::new(probe.clone());
        owned.set_volume(0.4);
        owned.play().unwrap();
        assert!(probe.is_playing());
        assert_eq!(probe.current_volume(), 0.4);
        assert_eq!(probe.state().volume_history, vec![0.4]);
    }

    #[test]
    fn failing_channel_counts_attempts() {
        let probe = MemoryChannel::failing(PlaybackError::Blocked("autoplay".into()));
        let mut owned = probe.clone();
        assert!(owned.play().is_err());
        assert!(!probe.is_playing());
        assert_eq!(probe.state().play_calls, 1);
    }

    #[test]
    fn haptics_record_patterns() {
        let probe = MemoryHaptics::new();
        let mut owned = probe.clone();
        owned.vibrate(&[100, 50, 500]).unwrap();
        assert_eq!(probe.patterns(), vec![vec![100, 50, 500]]);
    }
}
