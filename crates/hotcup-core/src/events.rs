use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::missions::ExplosionResult;
use crate::session::{Direction, GamePhase};

/// Every accepted command produces an Event.
/// The presentation layer polls `snapshot()` for everything in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    GameStarted {
        duration_secs: u32,
        started_at_ms: u64,
        at: DateTime<Utc>,
    },
    Exploded {
        mission: String,
        title: String,
        duration_secs: u32,
        exploded_at_ms: u64,
        at: DateTime<Utc>,
    },
    Restarted {
        at: DateTime<Utc>,
    },
    DirectionToggled {
        direction: Direction,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: GamePhase,
        direction: Direction,
        remaining_secs: Option<f64>,
        intensity: f64,
        result: Option<ExplosionResult>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short snake_case name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::GameStarted { .. } => "game_started",
            Event::Exploded { .. } => "exploded",
            Event::Restarted { .. } => "restarted",
            Event::DirectionToggled { .. } => "direction_toggled",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::DirectionToggled {
            direction: Direction::Ccw,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "direction_toggled");
        assert_eq!(json["direction"], "ccw");
        assert_eq!(event.kind(), "direction_toggled");
    }
}
