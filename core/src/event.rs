//! Input events fed into the simulation.
//!
//! RULE: The simulation sees input ONLY as GameEvents delivered by an
//! EventSource. Each event carries the tick at which it becomes due.
//! Variants are added over time, never removed or reordered, since
//! recorded sessions depend on the tags.

use crate::types::Tick;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub tick: Tick,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl GameEvent {
    pub fn new(tick: Tick, kind: EventKind) -> Self {
        Self { tick, kind }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Every recognized kind of input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // ── Pointer (mouse / touch) ────────────────────
    Pointer {
        phase: PointerPhase,
        pointer_id: u32,
        x: f64,
        y: f64,
    },

    // ── Keyboard ───────────────────────────────────
    Key {
        phase: KeyPhase,
        code: String,
    },

    // ── Game-defined actions ───────────────────────
    Action {
        name: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
}

impl EventKind {
    /// Stable tag, identical to the serialized `type` field.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Pointer { .. } => "pointer",
            Self::Key { .. } => "key",
            Self::Action { .. } => "action",
        }
    }

    pub fn action(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::Action {
            name: name.into(),
            payload,
        }
    }

    pub fn key_down(code: impl Into<String>) -> Self {
        Self::Key {
            phase: KeyPhase::Down,
            code: code.into(),
        }
    }

    pub fn key_up(code: impl Into<String>) -> Self {
        Self::Key {
            phase: KeyPhase::Up,
            code: code.into(),
        }
    }

    pub fn pointer(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self::Pointer {
            phase,
            pointer_id: 0,
            x,
            y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPhase {
    Down,
    Up,
}
