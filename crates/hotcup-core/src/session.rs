//! Game session: the top-level state machine.
//!
//! ```text
//! Idle --start()--> Playing --countdown explodes--> Exploded --restart()--> Idle
//! ```
//!
//! The session owns the clock, the random source, the frame scheduler and the
//! feedback devices. The host calls [`GameSession::frame`] once per animation
//! frame; commands that are not legal in the current phase return `None`.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::countdown::{
    CountdownEngine, CountdownReading, CountdownRun, ExplosionSignal, Shake, Tick,
};
use crate::events::Event;
use crate::feedback::{AudioDeck, FeedbackCoordinator, HapticDevice};
use crate::missions::{ExplosionResult, MissionSelector};
use crate::random::{self, RandomSource};
use crate::scheduler::{FrameScheduler, FrameTask};
use crate::storage::Config;
use crate::Result;

/// Mixed into the configured seed for the cosmetic jitter stream.
const JITTER_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Idle,
    Playing,
    Exploded,
}

/// Passing direction. Cosmetic only; survives restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Clockwise
    #[default]
    Cw,
    /// Counter-clockwise
    Ccw,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Cw => Direction::Ccw,
            Direction::Ccw => Direction::Cw,
        }
    }
}

pub struct GameSession<C: Clock> {
    clock: C,
    rng: Box<dyn RandomSource>,
    /// Shake only. Kept apart from `rng` so rendering never moves game draws.
    jitter: Box<dyn RandomSource>,
    scheduler: FrameScheduler<FrameTask>,
    engine: CountdownEngine,
    selector: MissionSelector,
    feedback: FeedbackCoordinator,
    phase: GamePhase,
    direction: Direction,
    result: Option<ExplosionResult>,
}

impl<C: Clock> GameSession<C> {
    pub fn new(
        clock: C,
        rng: Box<dyn RandomSource>,
        engine: CountdownEngine,
        selector: MissionSelector,
        feedback: FeedbackCoordinator,
    ) -> Self {
        Self {
            clock,
            rng,
            jitter: Box::new(random::from_entropy()),
            scheduler: FrameScheduler::new(),
            engine,
            selector,
            feedback,
            phase: GamePhase::Idle,
            direction: Direction::default(),
            result: None,
        }
    }

    /// Replaces the generator behind [`GameSession::shake`].
    pub fn with_jitter(mut self, jitter: Box<dyn RandomSource>) -> Self {
        self.jitter = jitter;
        self
    }

    /// Builds a session from validated configuration. Uses `config.seed` when
    /// set, OS entropy otherwise.
    pub fn from_config(
        config: &Config,
        clock: C,
        deck: AudioDeck,
        haptics: Option<Box<dyn HapticDevice>>,
    ) -> Result<Self> {
        config.validate()?;
        let (rng, jitter) = match config.seed {
            Some(seed) => (random::seeded(seed), random::seeded(seed ^ JITTER_SEED_SALT)),
            None => (random::from_entropy(), random::from_entropy()),
        };
        Ok(Self::new(
            clock,
            Box::new(rng),
            CountdownEngine::new(config.countdown.clone()),
            MissionSelector::from_config(&config.missions)?,
            FeedbackCoordinator::new(deck, haptics, config.feedback.clone()),
        )
        .with_jitter(Box::new(jitter)))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The explosion outcome, held until the next restart.
    pub fn result(&self) -> Option<&ExplosionResult> {
        self.result.as_ref()
    }

    pub fn current_run(&self) -> Option<&CountdownRun> {
        self.engine.current_run()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Remaining time and intensity at the current instant, while playing.
    pub fn reading(&self) -> Option<CountdownReading> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        self.engine.reading_at(self.clock.now_ms())
    }

    pub fn remaining_secs(&self) -> Option<f64> {
        self.reading().map(|r| r.remaining_secs)
    }

    /// Zero whenever the phase is not `Playing`.
    pub fn intensity(&self) -> f64 {
        self.reading().map(|r| r.intensity).unwrap_or(0.0)
    }

    /// Jitter for the board this frame. At rest unless playing.
    pub fn shake(&mut self) -> Shake {
        let Some(reading) = self.reading() else {
            return Shake::REST;
        };
        let config = self.engine.config();
        Shake::sample(
            reading.intensity,
            reading.remaining_secs,
            config.intensity_reference_secs,
            config.scale_per_sec,
            self.jitter.as_mut(),
        )
    }

    /// True when no frame work is queued.
    pub fn is_settled(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub fn feedback(&self) -> &FeedbackCoordinator {
        &self.feedback
    }

    pub fn snapshot(&self) -> Event {
        let reading = self.reading();
        Event::StateSnapshot {
            phase: self.phase,
            direction: self.direction,
            remaining_secs: reading.map(|r| r.remaining_secs),
            intensity: reading.map(|r| r.intensity).unwrap_or(0.0),
            result: self.result.clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Idle -> Playing. Ignored in any other phase.
    pub fn start(&mut self) -> Option<Event> {
        if self.phase != GamePhase::Idle {
            tracing::trace!(phase = ?self.phase, "start ignored");
            return None;
        }
        let now = self.clock.now_ms();
        self.result = None;
        let run = self
            .engine
            .start_scheduled(now, self.rng.as_mut(), &mut self.scheduler);
        self.feedback.on_start(now, &mut self.scheduler);
        self.phase = GamePhase::Playing;
        tracing::info!(duration_secs = run.duration_secs, "round started");
        Some(Event::GameStarted {
            duration_secs: run.duration_secs,
            started_at_ms: run.started_at_ms,
            at: Utc::now(),
        })
    }

    /// Exploded -> Idle. Ignored in any other phase.
    pub fn restart(&mut self) -> Option<Event> {
        if self.phase != GamePhase::Exploded {
            tracing::trace!(phase = ?self.phase, "restart ignored");
            return None;
        }
        let now = self.clock.now_ms();
        self.result = None;
        self.feedback.on_restart(now, &mut self.scheduler);
        self.phase = GamePhase::Idle;
        tracing::info!("round reset");
        Some(Event::Restarted { at: Utc::now() })
    }

    /// Valid in every phase; never touches the countdown.
    pub fn toggle_direction(&mut self) -> Event {
        self.direction = self.direction.toggled();
        tracing::debug!(direction = ?self.direction, "direction toggled");
        Event::DirectionToggled {
            direction: self.direction,
            at: Utc::now(),
        }
    }

    /// Runs every step queued for this frame. Returns the explosion event if
    /// the countdown ended during it.
    pub fn frame(&mut self) -> Option<Event> {
        let now = self.clock.now_ms();
        let mut event = None;
        self.scheduler.begin_frame();
        while let Some((_, task)) = self.scheduler.next_due() {
            match task {
                FrameTask::CountdownTick => match self.engine.on_frame(now, &mut self.scheduler) {
                    Tick::Counting(reading) => {
                        tracing::trace!(remaining_secs = reading.remaining_secs, "tick");
                    }
                    Tick::Explosion(signal) => event = Some(self.explode(signal, now)),
                    Tick::Inert => {}
                },
                FrameTask::FadeStep {
                    channel,
                    generation,
                } => {
                    self.feedback
                        .on_fade_step(channel, generation, now, &mut self.scheduler);
                }
            }
        }
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn explode(&mut self, signal: ExplosionSignal, now: u64) -> Event {
        debug_assert_eq!(self.phase, GamePhase::Playing, "explosion outside of play");
        debug_assert!(self.result.is_none(), "second explosion result in one round");
        self.engine.stop(&mut self.scheduler);

        let result = self.selector.pick(self.rng.as_mut());
        self.feedback.on_explode(&result, now, &mut self.scheduler);
        self.phase = GamePhase::Exploded;
        tracing::info!(title = %result.title, mission = %result.mission, "exploded");

        let event = Event::Exploded {
            mission: result.mission.clone(),
            title: result.title.clone(),
            duration_secs: signal.run.duration_secs,
            exploded_at_ms: signal.at_ms,
            at: Utc::now(),
        };
        self.result = Some(result);
        event
    }
}
