pub mod config;
pub mod missions;
pub mod play;
pub mod simulate;
