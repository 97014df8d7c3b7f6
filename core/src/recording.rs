//! Recorded sessions: a seed plus the exact input the engine consumed.
//!
//! Replaying a recording means: reset with its seed, feed its events
//! through a RecordedEventSource, and drive update() with the same tick
//! progression. The result is bit-identical simulation state.

use crate::{
    error::{EngineError, EngineResult},
    event::GameEvent,
    event_source::RecordedEventSource,
    types::{RecordingId, Tick},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub id: RecordingId,
    pub seed: String,
    pub recorded_at: DateTime<Utc>,
    pub events: Vec<GameEvent>,
}

impl Recording {
    pub fn new(seed: impl Into<String>, events: Vec<GameEvent>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            seed: seed.into(),
            recorded_at: Utc::now(),
            events,
        }
    }

    /// Check that ticks never decrease.
    pub fn validate(&self) -> EngineResult<()> {
        let mut previous: Tick = 0;
        for (index, event) in self.events.iter().enumerate() {
            if event.tick < previous {
                return Err(EngineError::UnorderedRecording {
                    index,
                    tick: event.tick,
                    previous,
                });
            }
            previous = event.tick;
        }
        Ok(())
    }

    /// Tick of the last event, or 0 if there are none.
    pub fn last_tick(&self) -> Tick {
        self.events.last().map(|e| e.tick).unwrap_or(0)
    }

    pub fn to_source(&self) -> RecordedEventSource {
        RecordedEventSource::new(&self.events)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let recording: Self = serde_json::from_str(json)?;
        recording.validate()?;
        Ok(recording)
    }

    pub fn save(&self, path: &str) -> EngineResult<()> {
        std::fs::write(path, self.to_json()?)?;
        log::debug!("recording {} saved to {path} ({} events)", self.id, self.events.len());
        Ok(())
    }

    pub fn load(path: &str) -> EngineResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, PointerPhase};
    use crate::event_source::EventSource;

    fn sample() -> Recording {
        Recording::new(
            "abc",
            vec![
                GameEvent::new(0, EventKind::key_down("Space")),
                GameEvent::new(5, EventKind::pointer(PointerPhase::Down, 10.25, 3.5)),
                GameEvent::new(5, EventKind::action("fire", serde_json::json!({ "power": 2 }))),
                GameEvent::new(10, EventKind::key_up("Space")),
            ],
        )
    }

    #[test]
    fn json_preserves_everything() {
        let recording = sample();
        let restored = Recording::from_json(&recording.to_json().unwrap()).unwrap();
        assert_eq!(restored, recording);
    }

    #[test]
    fn validate_rejects_decreasing_ticks() {
        let mut recording = sample();
        recording.events.swap(1, 3);
        match recording.validate() {
            Err(EngineError::UnorderedRecording { index, tick, previous }) => {
                assert_eq!((index, tick, previous), (2, 5, 10));
            }
            other => panic!("expected UnorderedRecording, got {other:?}"),
        }
        assert!(Recording::from_json(&recording.to_json().unwrap()).is_err());
    }

    #[test]
    fn source_replays_all_events() {
        let recording = sample();
        let mut source = recording.to_source();
        let replayed = source.next_events(recording.last_tick());
        assert_eq!(replayed, recording.events);
    }
}
