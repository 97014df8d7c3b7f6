//! Demo game for the runner: dots drifting in a square arena.
//!
//! Every random choice goes through the engine's SeededRandom, so the
//! digest after N ticks depends only on the seed and the input.

use async_trait::async_trait;
use serde::Serialize;
use tickplay_core::{
    event::PointerPhase, EngineConfig, EngineContext, EventKind, Game, GameEvent, TickInfo,
};

/// Half-width of the arena.
pub const ARENA: f64 = 100.0;
const MAX_DOTS: usize = 256;

#[derive(Debug, Clone, Serialize)]
pub struct Dot {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug, Default, Serialize)]
pub struct DotsGame {
    pub dots: Vec<Dot>,
    pub bounces: u64,
    pub events_applied: u64,
}

impl DotsGame {
    fn spawn(&mut self, ctx: &mut EngineContext<'_>, x: f64, y: f64) {
        if self.dots.len() >= MAX_DOTS {
            return;
        }
        let angle = ctx.rng.next_float(0.0, std::f64::consts::TAU);
        let speed = ctx.rng.next_float(0.2, 1.5);
        self.dots.push(Dot {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
        });
    }

    /// FNV-1a over the exact bit patterns of every dot.
    pub fn digest(&self) -> u64 {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        let words = self
            .dots
            .iter()
            .flat_map(|d| [d.x.to_bits(), d.y.to_bits(), d.vx.to_bits(), d.vy.to_bits()])
            .chain([self.bounces]);
        for word in words {
            for byte in word.to_le_bytes() {
                hash = (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3);
            }
        }
        hash
    }
}

#[async_trait]
impl Game for DotsGame {
    async fn setup(&mut self, ctx: &mut EngineContext<'_>, config: &EngineConfig) -> anyhow::Result<()> {
        let count = config.setting::<usize>("dots").unwrap_or(16);
        self.dots.clear();
        self.bounces = 0;
        self.events_applied = 0;
        for _ in 0..count {
            let x = ctx.rng.next_float(-ARENA, ARENA);
            let y = ctx.rng.next_float(-ARENA, ARENA);
            self.spawn(ctx, x, y);
        }
        log::info!("dots: spawned {} dots", self.dots.len());
        Ok(())
    }

    fn apply_event(&mut self, event: &GameEvent, ctx: &mut EngineContext<'_>) {
        self.events_applied += 1;
        match &event.kind {
            EventKind::Pointer { phase: PointerPhase::Down, x, y, .. } => {
                self.spawn(ctx, x.clamp(-ARENA, ARENA), y.clamp(-ARENA, ARENA));
            }
            EventKind::Key { code, .. } if code == "Space" => {
                let x = ctx.rng.next_float(-ARENA, ARENA);
                let y = ctx.rng.next_float(-ARENA, ARENA);
                self.spawn(ctx, x, y);
            }
            EventKind::Action { name, payload } if name == "nudge" => {
                let strength = payload["strength"].as_f64().unwrap_or(1.0);
                for dot in &mut self.dots {
                    dot.vx += ctx.rng.next_float(-0.1, 0.1) * strength;
                    dot.vy += ctx.rng.next_float(-0.1, 0.1) * strength;
                }
            }
            other => log::debug!("tick={} dots: ignored {}", event.tick, other.type_name()),
        }
    }

    async fn tick(&mut self, info: TickInfo, _ctx: &mut EngineContext<'_>) -> anyhow::Result<()> {
        let dt = info.delta_ticks as f64;
        for dot in &mut self.dots {
            dot.x += dot.vx * dt;
            dot.y += dot.vy * dt;
            if dot.x.abs() > ARENA {
                dot.vx = -dot.vx;
                dot.x = dot.x.clamp(-ARENA, ARENA);
                self.bounces += 1;
            }
            if dot.y.abs() > ARENA {
                dot.vy = -dot.vy;
                dot.y = dot.y.clamp(-ARENA, ARENA);
                self.bounces += 1;
            }
        }
        Ok(())
    }
}
