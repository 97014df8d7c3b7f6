//! tickplay core: deterministic tick/event/randomness engine.
//!
//! Given a seed and a recorded sequence of input events, the engine
//! reproduces identical simulation state on every run, independent of
//! wall-clock timing and frame rate.
//!
//! Rendering, audio, input capture and asset transport are platform
//! concerns; the engine only sees them through the traits in `platform`
//! and `fetch`.

pub mod assets;
pub mod callback;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod event_source;
pub mod fetch;
pub mod game;
pub mod platform;
pub mod recording;
pub mod rng;
pub mod store;
pub mod types;

pub use assets::{AssetKind, AssetLoader, Spritesheet, StaticImage};
pub use callback::{callback, Callback, CallbackRegistry};
pub use config::EngineConfig;
pub use engine::{Engine, EnginePhase, UpdateReport};
pub use error::{EngineError, EngineResult, FetchError};
pub use event::{EventKind, GameEvent};
pub use event_source::{EventSource, LiveEventSource, RecordedEventSource};
pub use game::{EngineContext, Game, TickInfo};
pub use rng::SeededRandom;
pub use types::Tick;
