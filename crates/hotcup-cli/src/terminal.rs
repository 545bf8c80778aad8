//! Terminal stand-ins for audio and haptic devices.
//!
//! A terminal has no mixer, so channels only track their state and log what a
//! real device would do. The bell is the closest thing to a vibration motor.

use std::io::Write;

use hotcup_core::{AudioChannel, HapticDevice, PlaybackError};

pub struct TerminalChannel {
    name: &'static str,
    volume: f32,
    playing: bool,
}

impl TerminalChannel {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            volume: 1.0,
            playing: false,
        }
    }
}

impl AudioChannel for TerminalChannel {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.playing = true;
        tracing::debug!(channel = self.name, volume = self.volume, "play");
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.playing {
            tracing::debug!(channel = self.name, "pause");
        }
        self.playing = false;
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        tracing::trace!(channel = self.name, volume, "volume");
    }

    fn set_playback_rate(&mut self, rate: f32) {
        tracing::trace!(channel = self.name, rate, "playback rate");
    }

    fn set_current_time(&mut self, secs: f64) {
        tracing::trace!(channel = self.name, secs, "seek");
    }

    fn set_loop(&mut self, looping: bool) {
        tracing::trace!(channel = self.name, looping, "loop");
    }
}

/// Rings the terminal bell once per "on" segment of a pattern.
pub struct TerminalBell;

impl HapticDevice for TerminalBell {
    fn vibrate(&mut self, pattern: &[u32]) -> Result<(), PlaybackError> {
        let pulses = pattern.iter().step_by(2).count();
        let mut err = std::io::stderr();
        err.write_all("\x07".repeat(pulses).as_bytes())
            .and_then(|_| err.flush())
            .map_err(|e| PlaybackError::Device(e.to_string()))
    }
}
