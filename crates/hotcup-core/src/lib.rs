//! # Hotcup Core Library
//!
//! Core logic for Hotcup, a pass-the-cup party timer: a countdown of random
//! length that ends in an explosion carrying a punishment mission and a title.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: A monotonic-clock state machine ticked once per frame
//! - **Frame Scheduler**: Cooperative, single-threaded queue of per-frame steps
//! - **Feedback**: Sound cues, volume fades and haptic pulses on transitions
//! - **Session**: The Idle -> Playing -> Exploded state machine tying it together
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`GameSession`]: Top-level state machine
//! - [`CountdownEngine`]: Countdown runs and danger intensity
//! - [`FadeController`]: Last-writer-wins volume interpolation
//! - [`FeedbackCoordinator`]: Device side effects, all fire-and-forget
//! - [`MissionSelector`]: Random mission and title
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod countdown;
pub mod error;
pub mod events;
pub mod feedback;
pub mod missions;
pub mod random;
pub mod scheduler;
pub mod session;
pub mod storage;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use countdown::{CountdownConfig, CountdownEngine, CountdownReading, CountdownRun, Shake, Tick};
pub use error::{ConfigError, CoreError, PlaybackError, Result, ValidationError};
pub use events::Event;
pub use feedback::{
    AudioChannel, AudioDeck, ChannelRole, FadeController, FadeTask, FeedbackConfig,
    FeedbackCoordinator, HapticDevice, MemoryChannel, MemoryHaptics,
};
pub use missions::{ExplosionResult, MissionSelector};
pub use random::{RandomSource, ScriptedRandom};
pub use scheduler::{CooperativeScheduler, FrameScheduler, FrameTask, StepHandle};
pub use session::{Direction, GamePhase, GameSession};
pub use storage::Config;
