//! Event sources: where the engine gets its input each update.
//!
//! RULE: An EventSource delivers events in non-decreasing tick order and
//! never drops one. Whatever is due by `total_ticks` comes out of the
//! next call, even if several ticks were skipped since the last call.
//!
//! Variants:
//!   - RecordedEventSource: replays a fixed list, used for tests and replay.
//!   - LiveEventSource:     drains input pushed by a platform adapter.
//!   - CapturingEventSource: wraps either and keeps what it delivered,
//!     so a live session can be replayed later.

use crate::{event::{EventKind, GameEvent}, types::Tick};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

/// The contract every input source must fulfill.
pub trait EventSource: Send {
    /// All events due at or before `total_ticks` that were not yet
    /// delivered, in delivery order. Possibly empty.
    fn next_events(&mut self, total_ticks: Tick) -> Vec<GameEvent>;

    /// Whether any event may still be delivered.
    fn has_more_events(&self) -> bool;

    /// Return to the initial position.
    fn reset(&mut self);
}

// ── Recorded ───────────────────────────────────────────────────

/// Replays a pre-captured list.
///
/// The list is copied at construction and never changes, so `reset`
/// followed by the same tick progression yields the same batches.
/// Ticks are assumed non-decreasing; the list is not sorted.
#[derive(Debug, Clone, Default)]
pub struct RecordedEventSource {
    events: Vec<GameEvent>,
    cursor: usize,
}

impl RecordedEventSource {
    pub fn new(events: &[GameEvent]) -> Self {
        Self {
            events: events.to_vec(),
            cursor: 0,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events already delivered.
    pub fn delivered(&self) -> usize {
        self.cursor
    }
}

impl EventSource for RecordedEventSource {
    fn next_events(&mut self, total_ticks: Tick) -> Vec<GameEvent> {
        let due = self.events[self.cursor..]
            .iter()
            .take_while(|e| e.tick <= total_ticks)
            .count();
        let batch = self.events[self.cursor..self.cursor + due].to_vec();
        self.cursor += due;
        batch
    }

    fn has_more_events(&self) -> bool {
        self.cursor < self.events.len()
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }
}

// ── Live ───────────────────────────────────────────────────────

/// Handle a platform input adapter uses to push input into a
/// LiveEventSource. Cheap to clone; the source stays open while any
/// sender is alive.
#[derive(Debug, Clone)]
pub struct InputSender {
    tx: Sender<EventKind>,
}

impl InputSender {
    /// Queue one input. Returns false if the source has been dropped.
    pub fn send(&self, kind: EventKind) -> bool {
        self.tx.send(kind).is_ok()
    }
}

/// Real-time input. Each pending input is stamped with the tick of the
/// `next_events` call that drains it.
#[derive(Debug)]
pub struct LiveEventSource {
    rx: Receiver<EventKind>,
    pending: Vec<EventKind>,
    disconnected: bool,
}

impl LiveEventSource {
    pub fn channel() -> (InputSender, Self) {
        let (tx, rx) = mpsc::channel();
        let source = Self {
            rx,
            pending: Vec::new(),
            disconnected: false,
        };
        (InputSender { tx }, source)
    }

    fn pump(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(kind) => self.pending.push(kind),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
    }
}

impl EventSource for LiveEventSource {
    fn next_events(&mut self, total_ticks: Tick) -> Vec<GameEvent> {
        self.pump();
        self.pending
            .drain(..)
            .map(|kind| GameEvent::new(total_ticks, kind))
            .collect()
    }

    fn has_more_events(&self) -> bool {
        !self.disconnected || !self.pending.is_empty()
    }

    /// Discards input queued so far.
    fn reset(&mut self) {
        self.pump();
        self.pending.clear();
    }
}

// ── Capture ────────────────────────────────────────────────────

/// Read side of a CapturingEventSource. Stays valid after the source has
/// been handed to an engine.
#[derive(Debug, Clone, Default)]
pub struct CaptureHandle {
    captured: Arc<Mutex<Vec<GameEvent>>>,
}

impl CaptureHandle {
    /// Every event delivered so far, in delivery order.
    pub fn events(&self) -> Vec<GameEvent> {
        self.captured.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.captured.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Forwards another source unchanged and keeps a copy of every
/// delivered event. `reset` resets the inner source and starts a
/// fresh capture.
#[derive(Debug)]
pub struct CapturingEventSource<S> {
    inner: S,
    handle: CaptureHandle,
}

impl<S: EventSource> CapturingEventSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            handle: CaptureHandle::default(),
        }
    }

    pub fn handle(&self) -> CaptureHandle {
        self.handle.clone()
    }
}

impl<S: EventSource> EventSource for CapturingEventSource<S> {
    fn next_events(&mut self, total_ticks: Tick) -> Vec<GameEvent> {
        let batch = self.inner.next_events(total_ticks);
        if let Ok(mut captured) = self.handle.captured.lock() {
            captured.extend(batch.iter().cloned());
        }
        batch
    }

    fn has_more_events(&self) -> bool {
        self.inner.has_more_events()
    }

    fn reset(&mut self) {
        self.inner.reset();
        if let Ok(mut captured) = self.handle.captured.lock() {
            captured.clear();
        }
    }
}
