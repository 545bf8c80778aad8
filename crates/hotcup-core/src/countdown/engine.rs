//! Countdown engine implementation.
//!
//! The engine is a monotonic-clock state machine. It does not own a loop:
//! the session dispatches [`FrameTask::CountdownTick`] once per frame and the
//! engine schedules the next tick only while the run is still counting.
//!
//! ## Lifecycle
//!
//! ```text
//! (no run) --start--> counting --tick(now >= end)--> ExplosionSignal --> (no run)
//!                         \------------------stop-----------------------/
//! ```
//!
//! A [`CountdownRun`] exists exactly while the countdown is counting. The
//! explosion signal consumes it, so every later tick is inert until the next
//! `start`.

use serde::{Deserialize, Serialize};

use super::intensity::danger_intensity;
use crate::error::ValidationError;
use crate::random::RandomSource;
use crate::scheduler::{CooperativeScheduler, FrameTask, StepHandle};

/// Tunables for the countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// Shortest possible round, in whole seconds (inclusive).
    #[serde(default = "default_min_secs")]
    pub min_secs: u32,
    /// Longest possible round, in whole seconds (inclusive).
    #[serde(default = "default_max_secs")]
    pub max_secs: u32,
    /// Remaining time at which intensity is zero.
    #[serde(default = "default_reference_secs")]
    pub intensity_reference_secs: f64,
    /// Seconds per unit of intensity.
    #[serde(default = "default_divisor")]
    pub intensity_divisor: f64,
    /// Board scale growth per second below the reference.
    #[serde(default = "default_scale_per_sec")]
    pub scale_per_sec: f64,
}

fn default_min_secs() -> u32 {
    5
}
fn default_max_secs() -> u32 {
    15
}
fn default_reference_secs() -> f64 {
    15.0
}
fn default_divisor() -> f64 {
    3.0
}
fn default_scale_per_sec() -> f64 {
    0.02
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            min_secs: default_min_secs(),
            max_secs: default_max_secs(),
            intensity_reference_secs: default_reference_secs(),
            intensity_divisor: default_divisor(),
            scale_per_sec: default_scale_per_sec(),
        }
    }
}

impl CountdownConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "countdown.min_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.min_secs > self.max_secs {
            return Err(ValidationError::InvalidRange {
                field: "countdown".into(),
                low: self.min_secs as u64,
                high: self.max_secs as u64,
            });
        }
        if !(self.intensity_divisor > 0.0) {
            return Err(ValidationError::InvalidValue {
                field: "countdown.intensity_divisor".into(),
                message: "must be positive".into(),
            });
        }
        Ok(())
    }
}

/// One timed round. Immutable once drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownRun {
    pub started_at_ms: u64,
    pub duration_secs: u32,
    pub ends_at_ms: u64,
}

impl CountdownRun {
    pub fn new(started_at_ms: u64, duration_secs: u32) -> Self {
        Self {
            started_at_ms,
            duration_secs,
            ends_at_ms: started_at_ms.saturating_add(duration_secs as u64 * 1000),
        }
    }

    /// Milliseconds left, or `None` once `now` has reached the end.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        if now_ms >= self.ends_at_ms {
            None
        } else {
            Some(self.ends_at_ms - now_ms)
        }
    }
}

/// Remaining time and the intensity derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountdownReading {
    pub remaining_secs: f64,
    pub intensity: f64,
}

/// The terminal event of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplosionSignal {
    pub run: CountdownRun,
    pub at_ms: u64,
}

/// Result of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    Counting(CountdownReading),
    Explosion(ExplosionSignal),
    /// No run is active.
    Inert,
}

/// Core countdown engine.
#[derive(Debug, Clone)]
pub struct CountdownEngine {
    config: CountdownConfig,
    run: Option<CountdownRun>,
    pending_tick: Option<StepHandle>,
}

impl CountdownEngine {
    pub fn new(config: CountdownConfig) -> Self {
        Self {
            config,
            run: None,
            pending_tick: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &CountdownConfig {
        &self.config
    }

    pub fn current_run(&self) -> Option<&CountdownRun> {
        self.run.as_ref()
    }

    pub fn is_counting(&self) -> bool {
        self.run.is_some()
    }

    pub fn pending_tick(&self) -> Option<StepHandle> {
        self.pending_tick
    }

    /// Reading at `now` without advancing anything. `None` when no run is
    /// active; a run past its end that has not been ticked yet reads as zero.
    pub fn reading_at(&self, now_ms: u64) -> Option<CountdownReading> {
        let remaining_ms = self.run.as_ref()?.remaining_ms(now_ms).unwrap_or(0);
        Some(self.reading_for(remaining_ms))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Draws a fresh duration and begins a run.
    ///
    /// The caller guarantees no run is active; a second live run is a defect.
    pub fn start(&mut self, now_ms: u64, rng: &mut dyn RandomSource) -> CountdownRun {
        debug_assert!(self.run.is_none(), "countdown started while a run is active");
        let duration_secs = rng.int_inclusive(self.config.min_secs, self.config.max_secs);
        let run = CountdownRun::new(now_ms, duration_secs);
        self.run = Some(run);
        tracing::debug!(
            duration_secs,
            ends_at_ms = run.ends_at_ms,
            "countdown run drawn"
        );
        run
    }

    /// [`start`](Self::start) and queue the first tick.
    pub fn start_scheduled(
        &mut self,
        now_ms: u64,
        rng: &mut dyn RandomSource,
        scheduler: &mut dyn CooperativeScheduler<FrameTask>,
    ) -> CountdownRun {
        let run = self.start(now_ms, rng);
        self.pending_tick = Some(scheduler.schedule_step(FrameTask::CountdownTick));
        run
    }

    /// Advances the run to `now`.
    ///
    /// Raises [`Tick::Explosion`] exactly once per run, when `now` reaches the
    /// end timestamp. The run is consumed by the signal.
    pub fn tick(&mut self, now_ms: u64) -> Tick {
        let Some(run) = self.run else {
            return Tick::Inert;
        };
        match run.remaining_ms(now_ms) {
            Some(remaining_ms) => Tick::Counting(self.reading_for(remaining_ms)),
            None => {
                self.run = None;
                Tick::Explosion(ExplosionSignal { run, at_ms: now_ms })
            }
        }
    }

    /// Frame callback: ticks and re-arms only while still counting.
    pub fn on_frame(
        &mut self,
        now_ms: u64,
        scheduler: &mut dyn CooperativeScheduler<FrameTask>,
    ) -> Tick {
        self.pending_tick = None;
        let tick = self.tick(now_ms);
        if let Tick::Counting(_) = tick {
            self.pending_tick = Some(scheduler.schedule_step(FrameTask::CountdownTick));
        }
        tick
    }

    /// Drops the run and cancels any queued tick. Idempotent.
    pub fn stop(&mut self, scheduler: &mut dyn CooperativeScheduler<FrameTask>) {
        if let Some(handle) = self.pending_tick.take() {
            scheduler.cancel(handle);
        }
        self.run = None;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reading_for(&self, remaining_ms: u64) -> CountdownReading {
        let remaining_secs = remaining_ms as f64 / 1000.0;
        CountdownReading {
            remaining_secs,
            intensity: danger_intensity(
                remaining_secs,
                self.config.intensity_reference_secs,
                self.config.intensity_divisor,
            ),
        }
    }
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new(CountdownConfig::default())
    }
}
