//! SQLite persistence for recordings.
//!
//! RULE: Only store.rs talks to the database.
//! Events are stored one row each; `seq` keeps their original order.

use crate::{
    error::{EngineError, EngineResult},
    event::{EventKind, GameEvent},
    recording::Recording,
    types::RecordingId,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

/// One row of `list_recordings`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub id: RecordingId,
    pub seed: String,
    pub recorded_at: DateTime<Utc>,
    pub event_count: u64,
}

pub struct RecordingStore {
    conn: Connection,
}

fn parse_id(raw: &str) -> EngineResult<RecordingId> {
    uuid::Uuid::parse_str(raw)
        .map_err(|e| EngineError::Other(anyhow::anyhow!("bad recording id '{raw}': {e}")))
}

fn parse_time(raw: &str) -> EngineResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| EngineError::Other(anyhow::anyhow!("bad timestamp '{raw}': {e}")))
}

impl RecordingStore {
    /// Open (or create) the recording database at `path`.
    pub fn open(path: &str) -> EngineResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        log::debug!("store: opened {path} (journal_mode={mode})");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> EngineResult<()> {
        self.conn.execute_batch(include_str!("../migrations/001_recordings.sql"))?;
        Ok(())
    }

    // ── Write ──────────────────────────────────────────────────

    /// Insert a recording and all its events in one transaction.
    /// Saving the same id twice replaces the earlier copy.
    pub fn save_recording(&mut self, recording: &Recording) -> EngineResult<()> {
        let id = recording.id.to_string();
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM recording WHERE recording_id = ?1", params![id])?;
        tx.execute(
            "INSERT INTO recording (recording_id, seed, recorded_at, version)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                id,
                recording.seed,
                recording.recorded_at.to_rfc3339(),
                env!("CARGO_PKG_VERSION"),
            ],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO recorded_event (recording_id, seq, tick, event_type, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (seq, event) in recording.events.iter().enumerate() {
                stmt.execute(params![
                    id,
                    seq as i64,
                    event.tick as i64,
                    event.type_name(),
                    serde_json::to_string(&event.kind)?,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!("store: saved recording {id} ({} events)", recording.events.len());
        Ok(())
    }

    // ── Read ───────────────────────────────────────────────────

    /// Load a recording and check its tick order, like `Recording::load`.
    pub fn load_recording(&self, id: &RecordingId) -> EngineResult<Recording> {
        let key = id.to_string();
        let header = self
            .conn
            .query_row(
                "SELECT seed, recorded_at FROM recording WHERE recording_id = ?1",
                params![key],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let (seed, recorded_at) =
            header.ok_or_else(|| EngineError::RecordingNotFound { id: key.clone() })?;

        let mut stmt = self.conn.prepare(
            "SELECT tick, payload FROM recorded_event
             WHERE recording_id = ?1
             ORDER BY seq ASC",
        )?;
        let rows = stmt
            .query_map(params![key], |row| {
                Ok((row.get::<_, i64>(0)? as u64, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let events = rows
            .into_iter()
            .map(|(tick, payload)| -> EngineResult<GameEvent> {
                let kind: EventKind = serde_json::from_str(&payload)?;
                Ok(GameEvent::new(tick, kind))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let recording = Recording {
            id: *id,
            seed,
            recorded_at: parse_time(&recorded_at)?,
            events,
        };
        recording.validate()?;
        Ok(recording)
    }

    /// All stored recordings, oldest first.
    pub fn list_recordings(&self) -> EngineResult<Vec<RecordingSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.recording_id, r.seed, r.recorded_at, COUNT(e.seq)
             FROM recording r
             LEFT JOIN recorded_event e ON e.recording_id = r.recording_id
             GROUP BY r.recording_id
             ORDER BY r.recorded_at ASC, r.recording_id ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)? as u64,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, seed, recorded_at, event_count)| -> EngineResult<RecordingSummary> {
                Ok(RecordingSummary {
                    id: parse_id(&id)?,
                    seed,
                    recorded_at: parse_time(&recorded_at)?,
                    event_count,
                })
            })
            .collect()
    }
}
