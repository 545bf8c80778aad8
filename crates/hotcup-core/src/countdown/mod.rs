mod engine;
mod intensity;

pub use engine::{
    CountdownConfig, CountdownEngine, CountdownReading, CountdownRun, ExplosionSignal, Tick,
};
pub use intensity::{danger_intensity, Shake};
