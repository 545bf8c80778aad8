//! Volume fades driven one step per frame.
//!
//! Each channel has at most one live fade. A new request captures the
//! channel's current (possibly mid-fade) volume and supersedes the old one:
//! the old step is cancelled, and any step that still reaches [`FadeController::step`]
//! with a stale generation is dropped without touching the channel.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::devices::{AudioChannel, ChannelRole};
use crate::scheduler::{CooperativeScheduler, FrameTask, StepHandle};

pub const DEFAULT_FADE_MS: u64 = 700;

/// Target volume and how long to take getting there.
///
/// A task without a duration takes the fade length configured for the
/// coordinator, or [`DEFAULT_FADE_MS`] when driven directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeTask {
    pub target_volume: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl FadeTask {
    pub fn new(target_volume: f32, duration_ms: u64) -> Self {
        Self {
            target_volume,
            duration_ms: Some(duration_ms),
        }
    }

    /// Fade over whatever the default length is where it runs.
    pub fn to(target_volume: f32) -> Self {
        Self {
            target_volume,
            duration_ms: None,
        }
    }

    /// Fills in a missing duration.
    pub fn or_duration(self, fallback_ms: u64) -> Self {
        Self {
            duration_ms: Some(self.duration_ms.unwrap_or(fallback_ms)),
            ..self
        }
    }
}

/// Outcome of a single fade step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeProgress {
    /// Volume written; another step is queued.
    Continuing { fraction: f64 },
    /// Target reached; no further steps.
    Finished,
    /// A newer fade owns the channel; nothing was written.
    Superseded,
}

#[derive(Debug, Clone, Copy)]
struct ActiveFade {
    from: f32,
    target: f32,
    started_at_ms: u64,
    duration_ms: u64,
    generation: u64,
    step: Option<StepHandle>,
}

/// Tracks the live fade of every channel.
#[derive(Debug, Default)]
pub struct FadeController {
    active: HashMap<ChannelRole, ActiveFade>,
    next_generation: u64,
}

impl FadeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fading(&self, role: ChannelRole) -> bool {
        self.active.contains_key(&role)
    }

    /// Target of the live fade on `role`, if any.
    pub fn target(&self, role: ChannelRole) -> Option<f32> {
        self.active.get(&role).map(|f| f.target)
    }

    /// Starts a fade from the channel's current volume toward `task`'s target,
    /// clamped to `[0, 1]`. Returns the fade's generation.
    pub fn fade_to(
        &mut self,
        role: ChannelRole,
        channel: &dyn AudioChannel,
        task: FadeTask,
        now_ms: u64,
        scheduler: &mut dyn CooperativeScheduler<FrameTask>,
    ) -> u64 {
        if let Some(old) = self.active.remove(&role) {
            if let Some(step) = old.step {
                scheduler.cancel(step);
            }
            tracing::trace!(
                channel = role.as_str(),
                generation = old.generation,
                "fade superseded"
            );
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let target = clamp_volume(task.target_volume);
        let from = channel.volume();
        let duration_ms = task.duration_ms.unwrap_or(DEFAULT_FADE_MS);
        let step = scheduler.schedule_step(FrameTask::FadeStep {
            channel: role,
            generation,
        });
        self.active.insert(
            role,
            ActiveFade {
                from,
                target,
                started_at_ms: now_ms,
                duration_ms,
                generation,
                step: Some(step),
            },
        );
        tracing::debug!(
            channel = role.as_str(),
            from,
            target,
            duration_ms,
            "fade requested"
        );
        generation
    }

    /// Frame callback for a queued [`FrameTask::FadeStep`].
    pub fn step(
        &mut self,
        role: ChannelRole,
        generation: u64,
        channel: &mut dyn AudioChannel,
        now_ms: u64,
        scheduler: &mut dyn CooperativeScheduler<FrameTask>,
    ) -> FadeProgress {
        let Some(fade) = self.active.get_mut(&role) else {
            return FadeProgress::Superseded;
        };
        if fade.generation != generation {
            return FadeProgress::Superseded;
        }

        let fraction = if fade.duration_ms == 0 {
            1.0
        } else {
            let elapsed = now_ms.saturating_sub(fade.started_at_ms) as f64;
            (elapsed / fade.duration_ms as f64).min(1.0)
        };

        if fraction >= 1.0 {
            channel.set_volume(fade.target);
            self.active.remove(&role);
            return FadeProgress::Finished;
        }

        let volume = fade.from + (fade.target - fade.from) * fraction as f32;
        channel.set_volume(clamp_volume(volume));
        fade.step = Some(scheduler.schedule_step(FrameTask::FadeStep {
            channel: role,
            generation,
        }));
        FadeProgress::Continuing { fraction }
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
