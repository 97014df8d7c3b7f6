//! Recording persistence: SQLite and JSON round trips keep every event,
//! in order, with its tick, tag and payload.

use serde_json::json;
use tickplay_core::{
    event::{EventKind, GameEvent, PointerPhase},
    recording::Recording,
    store::RecordingStore,
    EngineError, EventSource, SeededRandom,
};

fn store() -> RecordingStore {
    let store = RecordingStore::in_memory().expect("in-memory store");
    store.migrate().expect("migration");
    store
}

fn session(seed: &str) -> Recording {
    Recording::new(
        seed,
        vec![
            GameEvent::new(0, EventKind::pointer(PointerPhase::Down, 12.5, 40.0)),
            GameEvent::new(0, EventKind::pointer(PointerPhase::Up, 12.5, 40.0)),
            GameEvent::new(9, EventKind::key_down("ArrowLeft")),
            GameEvent::new(9, EventKind::action("shoot", json!({ "angle": 0.75, "burst": [1, 2, 3] }))),
            GameEvent::new(30, EventKind::key_up("ArrowLeft")),
        ],
    )
}

#[test]
fn sqlite_round_trip_is_lossless() {
    let mut store = store();
    let recording = session("abc");
    store.save_recording(&recording).unwrap();

    let loaded = store.load_recording(&recording.id).unwrap();
    assert_eq!(loaded, recording);
}

#[test]
fn loaded_recording_replays_in_order() {
    let mut store = store();
    let recording = session("order");
    store.save_recording(&recording).unwrap();

    let mut source = store.load_recording(&recording.id).unwrap().to_source();
    assert_eq!(source.next_events(0).len(), 2);
    assert_eq!(source.next_events(9), recording.events[2..4].to_vec());
    assert_eq!(source.next_events(100), recording.events[4..].to_vec());
    assert!(!source.has_more_events());
}

#[test]
fn saving_twice_replaces() {
    let mut store = store();
    let mut recording = session("again");
    store.save_recording(&recording).unwrap();
    recording.events.truncate(2);
    store.save_recording(&recording).unwrap();

    let list = store.list_recordings().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].event_count, 2);
    assert_eq!(store.load_recording(&recording.id).unwrap().events.len(), 2);
}

#[test]
fn list_counts_events_per_recording() {
    let mut store = store();
    let a = session("a");
    let b = Recording::new("b", Vec::new());
    store.save_recording(&a).unwrap();
    store.save_recording(&b).unwrap();

    let mut list = store.list_recordings().unwrap();
    list.sort_by(|x, y| x.seed.cmp(&y.seed));
    assert_eq!(list.len(), 2);
    assert_eq!((list[0].seed.as_str(), list[0].event_count), ("a", 5));
    assert_eq!((list[1].seed.as_str(), list[1].event_count), ("b", 0));
}

#[test]
fn unknown_recording_is_not_found() {
    let store = store();
    let err = store.load_recording(&uuid::Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, EngineError::RecordingNotFound { .. }));
}

#[test]
fn json_file_round_trip() {
    let recording = session("file");
    let path = std::env::temp_dir().join(format!("tickplay-{}.json", recording.id));
    let path = path.to_str().unwrap();
    recording.save(path).unwrap();
    let loaded = Recording::load(path).unwrap();
    std::fs::remove_file(path).ok();
    assert_eq!(loaded, recording);
}

fn scattered_pointers(seed: &str, count: usize) -> Recording {
    let mut rng = SeededRandom::new(seed);
    let events = (0..count as u64)
        .map(|tick| {
            let x = rng.next_float(-100.0, 100.0);
            let y = rng.next_float(-100.0, 100.0);
            GameEvent::new(tick, EventKind::pointer(PointerPhase::Move, x, y))
        })
        .collect();
    Recording::new(seed, events)
}

#[test]
fn arbitrary_pointer_coordinates_survive_json() {
    let recording = scattered_pointers("coords-json", 2_000);
    let restored = Recording::from_json(&recording.to_json().unwrap()).unwrap();
    for (a, b) in recording.events.iter().zip(&restored.events) {
        assert_eq!(a, b, "coordinates changed at tick {}", a.tick);
    }
    assert_eq!(restored, recording);
}

#[test]
fn arbitrary_pointer_coordinates_survive_sqlite() {
    let mut store = store();
    let recording = scattered_pointers("coords-sqlite", 2_000);
    store.save_recording(&recording).unwrap();

    let loaded = store.load_recording(&recording.id).unwrap();
    for (a, b) in recording.events.iter().zip(&loaded.events) {
        assert_eq!(a, b, "coordinates changed at tick {}", a.tick);
    }
    assert_eq!(loaded, recording);
}

#[test]
fn unordered_recording_is_rejected_on_load() {
    let mut store = store();
    let mut recording = session("shuffled");
    recording.events.swap(0, 4);
    store.save_recording(&recording).unwrap();

    let err = store.load_recording(&recording.id).unwrap_err();
    assert!(matches!(err, EngineError::UnorderedRecording { index: 1, tick: 0, previous: 30 }));
}
