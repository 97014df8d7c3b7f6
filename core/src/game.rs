//! The game hook trait.
//!
//! RULE: Game code reaches engine state ONLY through the EngineContext it
//! is handed. Randomness comes from `ctx.rng`, never from elsewhere.
//!
//! Call order, fixed:
//!   reset:  preload assets → setup
//!   update: apply_event (each due event, in order) → tick → tick listeners

use crate::{
    assets::AssetLoader,
    callback::CallbackRegistry,
    config::EngineConfig,
    event::GameEvent,
    rng::SeededRandom,
    types::Tick,
};
use async_trait::async_trait;

/// Arguments of one update, as seen by tick listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    pub delta_ticks: Tick,
    pub total_ticks: Tick,
}

/// What a game hook may touch.
pub struct EngineContext<'a> {
    pub assets: &'a AssetLoader,
    pub rng: &'a mut SeededRandom,
    pub tick_listeners: &'a CallbackRegistry<TickInfo>,
    pub device_pixel_ratio: f64,
}

#[async_trait]
pub trait Game: Send {
    /// Build the initial game state. Every asset registered before
    /// `reset` is already loaded when this runs.
    async fn setup(&mut self, ctx: &mut EngineContext<'_>, config: &EngineConfig) -> anyhow::Result<()>;

    /// Apply one due input event.
    fn apply_event(&mut self, _event: &GameEvent, _ctx: &mut EngineContext<'_>) {}

    /// Per-update game step, after events and before tick listeners.
    async fn tick(&mut self, _info: TickInfo, _ctx: &mut EngineContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}
