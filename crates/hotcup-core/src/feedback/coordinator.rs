//! Sound, fade and vibration reactions to phase transitions.
//!
//! Every device call is fire-and-forget. Failures come back as
//! [`PlaybackError`] values, get a debug log line, and are dropped; a missing
//! device is simply skipped.

use serde::{Deserialize, Serialize};

use super::devices::{AudioChannel, ChannelRole, HapticDevice};
use super::fade::{FadeController, FadeProgress, FadeTask, DEFAULT_FADE_MS};
use crate::error::{PlaybackError, ValidationError};
use crate::missions::ExplosionResult;
use crate::scheduler::{CooperativeScheduler, FrameTask};

/// Levels and patterns for each transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_playback_rate")]
    pub tension_playback_rate: f32,
    #[serde(default = "default_start_fade")]
    pub start_fade: FadeTask,
    #[serde(default = "default_explode_fade")]
    pub explode_fade: FadeTask,
    #[serde(default = "default_restart_fade")]
    pub restart_fade: FadeTask,
    /// Duration used by fades that do not name one.
    #[serde(default = "default_fade_ms")]
    pub default_fade_ms: u64,
    #[serde(default = "default_haptic_pattern")]
    pub haptic_pattern: Vec<u32>,
    #[serde(default = "default_true")]
    pub haptics_enabled: bool,
}

fn default_playback_rate() -> f32 {
    1.0
}
fn default_start_fade() -> FadeTask {
    FadeTask::new(0.35, 900)
}
fn default_explode_fade() -> FadeTask {
    FadeTask::new(0.08, 600)
}
fn default_restart_fade() -> FadeTask {
    FadeTask::new(0.25, 600)
}
fn default_fade_ms() -> u64 {
    DEFAULT_FADE_MS
}
fn default_haptic_pattern() -> Vec<u32> {
    vec![100, 50, 500]
}
fn default_true() -> bool {
    true
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            tension_playback_rate: default_playback_rate(),
            start_fade: default_start_fade(),
            explode_fade: default_explode_fade(),
            restart_fade: default_restart_fade(),
            default_fade_ms: default_fade_ms(),
            haptic_pattern: default_haptic_pattern(),
            haptics_enabled: true,
        }
    }
}

impl FeedbackConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fades = [
            ("feedback.start_fade", self.start_fade),
            ("feedback.explode_fade", self.explode_fade),
            ("feedback.restart_fade", self.restart_fade),
        ];
        for (field, fade) in fades {
            if !(0.0..=1.0).contains(&fade.target_volume) {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: format!("target_volume {} outside [0, 1]", fade.target_volume),
                });
            }
        }
        if !(self.tension_playback_rate > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: "feedback.tension_playback_rate".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }
}

/// The audio channels a session owns. Any of them may be absent.
#[derive(Default)]
pub struct AudioDeck {
    pub tension: Option<Box<dyn AudioChannel>>,
    pub impact: Option<Box<dyn AudioChannel>>,
    pub ambient: Option<Box<dyn AudioChannel>>,
}

impl AudioDeck {
    /// A deck with no audio at all.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn new(
        tension: impl AudioChannel + 'static,
        impact: impl AudioChannel + 'static,
        ambient: impl AudioChannel + 'static,
    ) -> Self {
        Self {
            tension: Some(Box::new(tension)),
            impact: Some(Box::new(impact)),
            ambient: Some(Box::new(ambient)),
        }
    }

    fn get_mut(&mut self, role: ChannelRole) -> Option<&mut (dyn AudioChannel + 'static)> {
        match role {
            ChannelRole::Tension => self.tension.as_deref_mut(),
            ChannelRole::Impact => self.impact.as_deref_mut(),
            ChannelRole::Ambient => self.ambient.as_deref_mut(),
        }
    }
}

/// Reacts to start, explode and restart.
pub struct FeedbackCoordinator {
    deck: AudioDeck,
    haptics: Option<Box<dyn HapticDevice>>,
    fades: FadeController,
    config: FeedbackConfig,
}

impl FeedbackCoordinator {
    /// Takes ownership of the devices and prepares them: both looping cues
    /// loop, and the ambient bed starts silent.
    pub fn new(
        mut deck: AudioDeck,
        haptics: Option<Box<dyn HapticDevice>>,
        config: FeedbackConfig,
    ) -> Self {
        if let Some(tension) = deck.tension.as_deref_mut() {
            tension.set_loop(true);
        }
        if let Some(ambient) = deck.ambient.as_deref_mut() {
            ambient.set_loop(true);
            ambient.set_volume(0.0);
        }
        Self {
            deck,
            haptics,
            fades: FadeController::new(),
            config,
        }
    }

    /// No audio, no haptics.
    pub fn detached(config: FeedbackConfig) -> Self {
        Self::new(AudioDeck::silent(), None, config)
    }

    pub fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    pub fn fades(&self) -> &FadeController {
        &self.fades
    }

    pub fn on_start(&mut self, now_ms: u64, scheduler: &mut dyn CooperativeScheduler<FrameTask>) {
        if let Some(tension) = self.deck.tension.as_deref_mut() {
            tension.set_playback_rate(self.config.tension_playback_rate);
            discard(ChannelRole::Tension, "play", tension.play());
        }
        if let Some(ambient) = self.deck.ambient.as_deref_mut() {
            discard(ChannelRole::Ambient, "play", ambient.play());
        }
        self.request_fade(ChannelRole::Ambient, self.config.start_fade, now_ms, scheduler);
    }

    pub fn on_explode(
        &mut self,
        result: &ExplosionResult,
        now_ms: u64,
        scheduler: &mut dyn CooperativeScheduler<FrameTask>,
    ) {
        tracing::debug!(title = %result.title, mission = %result.mission, "explosion feedback");
        if let Some(tension) = self.deck.tension.as_deref_mut() {
            discard(ChannelRole::Tension, "pause", tension.pause());
            tension.set_current_time(0.0);
        }
        if let Some(impact) = self.deck.impact.as_deref_mut() {
            discard(ChannelRole::Impact, "play", impact.play());
        }
        self.request_fade(ChannelRole::Ambient, self.config.explode_fade, now_ms, scheduler);
        self.pulse();
    }

    pub fn on_restart(&mut self, now_ms: u64, scheduler: &mut dyn CooperativeScheduler<FrameTask>) {
        self.request_fade(ChannelRole::Ambient, self.config.restart_fade, now_ms, scheduler);
    }

    /// Fades `role` toward `task`, over `default_fade_ms` when the task names
    /// no duration. Without the channel this is a no-op.
    pub fn request_fade(
        &mut self,
        role: ChannelRole,
        task: FadeTask,
        now_ms: u64,
        scheduler: &mut dyn CooperativeScheduler<FrameTask>,
    ) {
        let Some(channel) = self.deck.get_mut(role) else {
            return;
        };
        let task = task.or_duration(self.config.default_fade_ms);
        self.fades.fade_to(role, channel, task, now_ms, scheduler);
    }

    /// Frame callback for [`FrameTask::FadeStep`].
    pub fn on_fade_step(
        &mut self,
        role: ChannelRole,
        generation: u64,
        now_ms: u64,
        scheduler: &mut dyn CooperativeScheduler<FrameTask>,
    ) -> FadeProgress {
        let Some(channel) = self.deck.get_mut(role) else {
            return FadeProgress::Superseded;
        };
        self.fades.step(role, generation, channel, now_ms, scheduler)
    }

    fn pulse(&mut self) {
        if !self.config.haptics_enabled {
            return;
        }
        let Some(haptics) = self.haptics.as_deref_mut() else {
            tracing::trace!("no haptic device, skipping pulse");
            return;
        };
        if let Err(err) = haptics.vibrate(&self.config.haptic_pattern) {
            tracing::debug!(%err, "haptic pulse failed");
        }
    }
}

impl Drop for FeedbackCoordinator {
    fn drop(&mut self) {
        for role in ChannelRole::ALL {
            if let Some(channel) = self.deck.get_mut(role) {
                discard(role, "pause", channel.pause());
            }
        }
    }
}

fn discard(role: ChannelRole, action: &str, result: Result<(), PlaybackError>) {
    if let Err(err) = result {
        tracing::debug!(channel = role.as_str(), action, %err, "playback failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::devices::{MemoryChannel, MemoryHaptics};
    use crate::scheduler::FrameScheduler;

    struct Rig {
        tension: MemoryChannel,
        impact: MemoryChannel,
        ambient: MemoryChannel,
        haptics: MemoryHaptics,
        coordinator: FeedbackCoordinator,
        scheduler: FrameScheduler<FrameTask>,
    }

    fn rig() -> Rig {
        rig_with(FeedbackConfig::default())
    }

    fn rig_with(config: FeedbackConfig) -> Rig {
        let tension = MemoryChannel::new();
        let impact = MemoryChannel::new();
        let ambient = MemoryChannel::new();
        let haptics = MemoryHaptics::new();
        let coordinator = FeedbackCoordinator::new(
            AudioDeck::new(tension.clone(), impact.clone(), ambient.clone()),
            Some(Box::new(haptics.clone())),
            config,
        );
        Rig {
            tension,
            impact,
            ambient,
            haptics,
            coordinator,
            scheduler: FrameScheduler::new(),
        }
    }

    fn run_frame(rig: &mut Rig, now_ms: u64) {
        rig.scheduler.begin_frame();
        while let Some((_, task)) = rig.scheduler.next_due() {
            if let FrameTask::FadeStep { channel, generation } = task {
                rig.coordinator
                    .on_fade_step(channel, generation, now_ms, &mut rig.scheduler);
            }
        }
    }

    fn result() -> ExplosionResult {
        ExplosionResult {
            mission: "Drink!".into(),
            title: "BOOM".into(),
        }
    }

    #[test]
    fn construction_prepares_channels() {
        let rig = rig();
        assert!(rig.tension.state().looping);
        assert!(rig.ambient.state().looping);
        assert_eq!(rig.ambient.current_volume(), 0.0);
    }

    #[test]
    fn start_plays_cues_and_fades_ambient_up() {
        let mut rig = rig();
        rig.coordinator.on_start(0, &mut rig.scheduler);
        assert!(rig.tension.is_playing());
        assert!(rig.ambient.is_playing());
        assert_eq!(rig.tension.state().playback_rate, 1.0);

        run_frame(&mut rig, 450);
        assert!((rig.ambient.current_volume() - 0.175).abs() < 1e-4);
        run_frame(&mut rig, 900);
        assert_eq!(rig.ambient.current_volume(), 0.35);
    }

    #[test]
    fn explode_stops_tension_hits_impact_and_vibrates() {
        let mut rig = rig();
        rig.coordinator.on_start(0, &mut rig.scheduler);
        run_frame(&mut rig, 900);

        rig.coordinator.on_explode(&result(), 5_000, &mut rig.scheduler);
        assert!(!rig.tension.is_playing());
        assert_eq!(rig.tension.state().position_secs, 0.0);
        assert!(rig.impact.is_playing());
        assert_eq!(rig.haptics.patterns(), vec![vec![100, 50, 500]]);

        run_frame(&mut rig, 5_600);
        assert_eq!(rig.ambient.current_volume(), 0.08);
    }

    #[test]
    fn restart_fades_to_resting_level() {
        let mut rig = rig();
        rig.coordinator.on_restart(0, &mut rig.scheduler);
        run_frame(&mut rig, 600);
        assert_eq!(rig.ambient.current_volume(), 0.25);
    }

    #[test]
    fn unnamed_fade_uses_configured_length() {
        let mut rig = rig_with(FeedbackConfig {
            restart_fade: FadeTask::to(0.25),
            default_fade_ms: 50,
            ..FeedbackConfig::default()
        });
        rig.coordinator.on_restart(0, &mut rig.scheduler);
        run_frame(&mut rig, 25);
        assert!((rig.ambient.current_volume() - 0.125).abs() < 1e-4);
        run_frame(&mut rig, 50);
        assert_eq!(rig.ambient.current_volume(), 0.25);
        assert!(rig.scheduler.is_idle());

        let mut slow = rig_with(FeedbackConfig {
            default_fade_ms: 2_000,
            ..FeedbackConfig::default()
        });
        slow.coordinator
            .request_fade(ChannelRole::Ambient, FadeTask::to(1.0), 0, &mut slow.scheduler);
        run_frame(&mut slow, 1_000);
        assert!((slow.ambient.current_volume() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn failures_and_missing_devices_are_swallowed() {
        let blocked = PlaybackError::Blocked("autoplay".into());
        let mut coordinator = FeedbackCoordinator::new(
            AudioDeck {
                tension: Some(Box::new(MemoryChannel::failing(blocked.clone()))),
                impact: None,
                ambient: None,
            },
            Some(Box::new(MemoryHaptics::failing(blocked))),
            FeedbackConfig::default(),
        );
        let mut scheduler: FrameScheduler<FrameTask> = FrameScheduler::new();
        coordinator.on_start(0, &mut scheduler);
        coordinator.on_explode(&result(), 10, &mut scheduler);
        coordinator.on_restart(20, &mut scheduler);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn haptics_can_be_disabled() {
        let haptics = MemoryHaptics::new();
        let config = FeedbackConfig {
            haptics_enabled: false,
            ..FeedbackConfig::default()
        };
        let mut coordinator =
            FeedbackCoordinator::new(AudioDeck::silent(), Some(Box::new(haptics.clone())), config);
        let mut scheduler: FrameScheduler<FrameTask> = FrameScheduler::new();
        coordinator.on_explode(&result(), 0, &mut scheduler);
        assert!(haptics.patterns().is_empty());
    }

    #[test]
    fn drop_pauses_owned_channels() {
        let rig = rig();
        let ambient = rig.ambient.clone();
        let mut rig = rig;
        rig.coordinator.on_start(0, &mut rig.scheduler);
        assert!(ambient.is_playing());
        drop(rig);
        assert!(!ambient.is_playing());
    }

    #[test]
    fn invalid_fade_target_rejected() {
        let config = FeedbackConfig {
            explode_fade: FadeTask::new(1.5, 600),
            ..FeedbackConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
