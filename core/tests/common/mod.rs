//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tickplay_core::{
    assets::AssetKind,
    fetch::MemoryFetcher,
    platform::HeadlessPlatform,
    Engine, EngineConfig, EngineContext, EventKind, Game, GameEvent, TickInfo,
};

pub type Trace = Arc<Mutex<Vec<String>>>;

pub fn trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(trace: &Trace) -> Vec<String> {
    trace.lock().unwrap().clone()
}

/// A game that records what it saw, in order, and draws from the
/// engine's random source at every hook.
#[derive(Default)]
pub struct ProbeGame {
    pub trace: Trace,
    /// (asset id, retrievable) for every registered asset, as seen in setup.
    pub seen_in_setup: Vec<(String, bool)>,
    pub setup_calls: usize,
    pub draws: Vec<i64>,
    pub fail_setup: bool,
    /// Make the tick hook fail when it reaches this total.
    pub fail_tick_at: Option<u64>,
}

impl ProbeGame {
    pub fn with_trace(trace: Trace) -> Self {
        Self { trace, ..Self::default() }
    }

    fn push(&self, entry: String) {
        self.trace.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl Game for ProbeGame {
    async fn setup(&mut self, ctx: &mut EngineContext<'_>, _config: &EngineConfig) -> anyhow::Result<()> {
        self.setup_calls += 1;
        self.seen_in_setup = ctx
            .assets
            .registered()
            .iter()
            .map(|entry| {
                let present = match entry.kind {
                    AssetKind::Spritesheet => ctx.assets.get_spritesheet(&entry.id).is_some(),
                    AssetKind::StaticImage => ctx.assets.get_static_image(&entry.id).is_some(),
                    AssetKind::Sound => true,
                };
                (entry.id.clone(), present)
            })
            .collect();
        self.draws.clear();
        self.draws.push(ctx.rng.next_int(0, 1_000_000));
        self.push("setup".into());
        if self.fail_setup {
            anyhow::bail!("setup refused");
        }
        Ok(())
    }

    fn apply_event(&mut self, event: &GameEvent, ctx: &mut EngineContext<'_>) {
        self.draws.push(ctx.rng.next_int(0, 1_000_000));
        let label = match &event.kind {
            EventKind::Action { name, .. } => name.clone(),
            other => other.type_name().to_string(),
        };
        self.push(format!("event:{label}@{}", event.tick));
    }

    async fn tick(&mut self, info: TickInfo, ctx: &mut EngineContext<'_>) -> anyhow::Result<()> {
        self.draws.push(ctx.rng.next_int(0, 1_000_000));
        self.push(format!("tick@{}", info.total_ticks));
        if self.fail_tick_at == Some(info.total_ticks) {
            anyhow::bail!("tick refused at {}", info.total_ticks);
        }
        Ok(())
    }
}

pub fn action(tick: u64, name: &str) -> GameEvent {
    GameEvent::new(tick, EventKind::action(name, serde_json::Value::Null))
}

pub fn engine_with(fetcher: Arc<MemoryFetcher>, game: ProbeGame) -> Engine<ProbeGame> {
    Engine::new(Box::new(fetcher), Box::new(HeadlessPlatform::new()), game)
}

pub fn headless_engine(game: ProbeGame) -> Engine<ProbeGame> {
    engine_with(Arc::new(MemoryFetcher::new()), game)
}
