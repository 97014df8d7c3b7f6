//! Shared primitive types used across the entire engine.

/// A simulation tick. The engine's only unit of time.
pub type Tick = u64;

/// A stable identifier for a registered asset, usually its file name.
pub type AssetId = String;

/// The canonical recording identifier.
pub type RecordingId = uuid::Uuid;
