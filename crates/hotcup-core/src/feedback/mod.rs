mod coordinator;
mod devices;
mod fade;

pub use coordinator::{AudioDeck, FeedbackConfig, FeedbackCoordinator};
pub use devices::{
    AudioChannel, ChannelRole, ChannelState, HapticDevice, MemoryChannel, MemoryHaptics,
};
pub use fade::{FadeController, FadeProgress, FadeTask, DEFAULT_FADE_MS};
