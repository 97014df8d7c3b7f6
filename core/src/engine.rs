//! The engine: lifecycle controller tying assets, input and randomness
//! together.
//!
//! LIFECYCLE (fixed, never reordered):
//!   Uninitialized → Preloading → SettingUp → Running
//!   Every reset() re-enters Preloading, whatever the current phase.
//!
//! RULES:
//!   - Preloading completes before setup runs; setup sees every asset.
//!   - A failed preload never reaches setup. The engine is then not ready
//!     and update() refuses to run until a reset succeeds.
//!   - Within one update: due events are applied, then the game tick
//!     runs, then tick listeners are notified.
//!   - All randomness flows through the engine's SeededRandom.
//!   - The engine does not serialize overlapping updates; `&mut self`
//!     already rules them out.

use crate::{
    assets::{AssetKind, AssetLoader, PreloadReport},
    callback::{Callback, CallbackRegistry},
    clock::TickClock,
    config::EngineConfig,
    error::{EngineError, EngineResult},
    event_source::{EventSource, RecordedEventSource},
    fetch::DataFetcher,
    game::{EngineContext, Game, TickInfo},
    platform::Platform,
    rng::SeededRandom,
    types::{AssetId, Tick},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Uninitialized,
    Preloading,
    SettingUp,
    Running,
}

/// Summary of one `update` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub events_applied: usize,
    pub listener_failures: usize,
}

pub struct Engine<G: Game> {
    game:           G,
    fetcher:        Box<dyn DataFetcher>,
    platform:       Box<dyn Platform>,
    assets:         AssetLoader,
    events:         Box<dyn EventSource>,
    rng:            SeededRandom,
    tick_listeners: CallbackRegistry<TickInfo>,
    clock:          TickClock,
    phase:          EnginePhase,
    total_ticks:    Tick,
}

impl<G: Game> Engine<G> {
    pub fn new(fetcher: Box<dyn DataFetcher>, platform: Box<dyn Platform>, game: G) -> Self {
        Self {
            game,
            fetcher,
            platform,
            assets:         AssetLoader::new(),
            events:         Box::new(RecordedEventSource::empty()),
            rng:            SeededRandom::from_entropy(),
            tick_listeners: CallbackRegistry::new("tick"),
            clock:          TickClock::default(),
            phase:          EnginePhase::Uninitialized,
            total_ticks:    0,
        }
    }

    /// Use a pre-built loader instead of the default one. Its
    /// registrations carry over.
    pub fn with_asset_loader(mut self, assets: AssetLoader) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_event_source(mut self, events: Box<dyn EventSource>) -> Self {
        self.events = events;
        self
    }

    /// Swap the input source. Takes effect on the next update; call
    /// `reset` to replay from the start.
    pub fn set_event_source(&mut self, events: Box<dyn EventSource>) -> Box<dyn EventSource> {
        std::mem::replace(&mut self.events, events)
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn phase(&self) -> EnginePhase { self.phase }

    /// `total_ticks` of the last successful update.
    pub fn total_ticks(&self) -> Tick { self.total_ticks }

    pub fn game(&self) -> &G { &self.game }

    pub fn game_mut(&mut self) -> &mut G { &mut self.game }

    pub fn assets(&self) -> &AssetLoader { &self.assets }

    pub fn rng(&self) -> &SeededRandom { &self.rng }

    pub fn clock(&self) -> &TickClock { &self.clock }

    pub fn clock_mut(&mut self) -> &mut TickClock { &mut self.clock }

    pub fn tick_listeners(&self) -> &CallbackRegistry<TickInfo> { &self.tick_listeners }

    pub fn platform(&self) -> &dyn Platform { self.platform.as_ref() }

    pub fn has_pending_events(&self) -> bool {
        self.events.has_more_events()
    }

    // ── Registration ───────────────────────────────────────────

    /// Register an asset for the next reset.
    pub fn register_asset(&mut self, id: impl Into<AssetId>, kind: AssetKind) -> bool {
        self.assets.register(id, kind)
    }

    /// Subscribe to every update. Registering the same callback again
    /// has no effect.
    pub fn on_tick(&self, callback: &Callback<TickInfo>) -> bool {
        self.tick_listeners.register(callback)
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Preload, then set up. Progress is logged at debug level.
    pub async fn reset(&mut self, config: &EngineConfig) -> EngineResult<PreloadReport> {
        self.reset_with_progress(config, |loaded, total| {
            log::debug!("engine: preload {loaded}/{total}");
        })
        .await
    }

    /// Preload, then set up, reporting `(loaded, total)` after each asset.
    ///
    /// # Errors
    /// - `EngineError::Fetch` if preloading hit a fatal fetch failure;
    ///   setup has not run.
    /// - `EngineError::Other` if the game's setup hook failed.
    pub async fn reset_with_progress<F>(
        &mut self,
        config: &EngineConfig,
        on_progress: F,
    ) -> EngineResult<PreloadReport>
    where
        F: FnMut(usize, usize),
    {
        self.enter(EnginePhase::Preloading);
        for entry in &config.assets {
            self.assets.register(entry.id.clone(), entry.kind);
        }
        let report = self
            .assets
            .preload_assets(self.fetcher.as_ref(), self.platform.as_mut(), on_progress)
            .await?;

        self.enter(EnginePhase::SettingUp);
        self.rng.initialize(config.seed.as_deref());
        self.events.reset();
        self.clock = TickClock::new(config.ticks_per_update.max(1));
        self.total_ticks = 0;

        let mut ctx = EngineContext {
            assets:             &self.assets,
            rng:                &mut self.rng,
            tick_listeners:     &self.tick_listeners,
            device_pixel_ratio: self.platform.device_pixel_ratio(),
        };
        self.game.setup(&mut ctx, config).await?;

        self.enter(EnginePhase::Running);
        log::info!("engine: running with seed '{}'", self.rng.seed());
        Ok(report)
    }

    /// Advance the simulation to `total_ticks`. Driven once per frame.
    ///
    /// # Errors
    /// - `EngineError::UninitializedResource` before a successful reset.
    /// - `EngineError::Other` if the game's tick hook failed; listeners
    ///   are not notified for that update and `total_ticks` is left
    ///   unchanged. The due events were already applied and are not
    ///   delivered again, so a retry with the same total sees none.
    pub async fn update(&mut self, delta_ticks: Tick, total_ticks: Tick) -> EngineResult<UpdateReport> {
        if self.phase != EnginePhase::Running {
            return Err(EngineError::UninitializedResource { resource: "engine" });
        }
        if total_ticks < self.total_ticks {
            log::warn!(
                "tick={total_ticks} engine: total went backwards (last was {})",
                self.total_ticks
            );
        }

        let info = TickInfo { delta_ticks, total_ticks };
        let due = self.events.next_events(total_ticks);

        let mut ctx = EngineContext {
            assets:             &self.assets,
            rng:                &mut self.rng,
            tick_listeners:     &self.tick_listeners,
            device_pixel_ratio: self.platform.device_pixel_ratio(),
        };
        for event in &due {
            self.game.apply_event(event, &mut ctx);
        }
        self.game.tick(info, &mut ctx).await?;

        let listener_failures = self.tick_listeners.notify(&info);
        self.total_ticks = total_ticks;

        if !due.is_empty() {
            log::debug!("tick={total_ticks} engine: applied {} events", due.len());
        }
        Ok(UpdateReport {
            events_applied: due.len(),
            listener_failures,
        })
    }

    /// Step the engine's clock `count` times, updating after each step.
    pub async fn run_ticks(&mut self, count: u64) -> EngineResult<()> {
        for _ in 0..count {
            let (delta, total) = self.clock.advance();
            self.update(delta, total).await?;
        }
        Ok(())
    }

    fn enter(&mut self, phase: EnginePhase) {
        log::debug!("engine: {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}
