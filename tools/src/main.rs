//! replay-runner: headless runner for tickplay.
//!
//! Usage:
//!   replay-runner --seed abc --ticks 600
//!   replay-runner --seed abc --ticks 150 --step 4
//!   replay-runner --ticks 600 --record session.json --db sessions.db
//!   replay-runner --replay session.json
//!   replay-runner --db sessions.db --replay-id <uuid>
//!   replay-runner --db sessions.db --list
//!   replay-runner --seed abc --dump       (print final game state as JSON)
//!
//! Without --replay the runner generates scripted input through a live
//! event source and captures it, so the run can be recorded and replayed.
//! A replay of that recording prints the same digest.

mod dots;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dots::DotsGame;
use futures::executor::block_on;
use std::env;
use std::path::PathBuf;
use tickplay_core::{
    event::PointerPhase,
    event_source::{CaptureHandle, CapturingEventSource, InputSender},
    fetch::DataFetcher,
    platform::HeadlessPlatform,
    recording::Recording,
    store::RecordingStore,
    Engine, EngineConfig, EventKind, FetchError, LiveEventSource, SeededRandom,
};

/// Serves assets from a directory on disk.
struct DirFetcher {
    root: PathBuf,
}

#[async_trait]
impl DataFetcher for DirFetcher {
    async fn fetch_data(&self, id: &str) -> Result<Vec<u8>, FetchError> {
        let path = self.root.join(id);
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                FetchError::non_fatal(format!("{} not found", path.display()))
            }
            _ => FetchError::new(format!("{}: {e}", path.display())),
        })
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ticks = parse_arg(&args, "--ticks", 600u64);
    let seed = string_arg(&args, "--seed");
    let config_path = string_arg(&args, "--config");
    let replay_path = string_arg(&args, "--replay");
    let replay_id = string_arg(&args, "--replay-id");
    let record_path = string_arg(&args, "--record");
    let db = string_arg(&args, "--db");
    let assets_dir = string_arg(&args, "--assets").unwrap_or_else(|| "./assets".into());

    let mut store = match &db {
        Some(path) => {
            let store = RecordingStore::open(path)?;
            store.migrate()?;
            Some(store)
        }
        None => None,
    };

    if args.iter().any(|a| a == "--list") {
        let store = store.as_ref().context("--list needs --db")?;
        for r in store.list_recordings()? {
            println!("{}  seed={}  events={}  at={}", r.id, r.seed, r.event_count, r.recorded_at);
        }
        return Ok(());
    }

    let mut config = match &config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    apply_step(&args, &mut config);

    let replay = match (&replay_path, &replay_id) {
        (Some(path), _) => Some(Recording::load(path)?),
        (None, Some(id)) => {
            let store = store.as_ref().context("--replay-id needs --db")?;
            let id = id.parse().with_context(|| format!("bad recording id '{id}'"))?;
            Some(store.load_recording(&id)?)
        }
        (None, None) => None,
    };

    // A replay always runs with its own seed.
    if let Some(recording) = &replay {
        config.seed = Some(recording.seed.clone());
    } else if seed.is_some() {
        config.seed = seed;
    }

    println!("tickplay replay-runner");
    println!("  mode:   {}", if replay.is_some() { "replay" } else { "scripted" });
    println!("  ticks:  {ticks}");
    println!("  step:   {}", config.ticks_per_update);
    println!();

    let fetcher = DirFetcher { root: PathBuf::from(&assets_dir) };
    let mut engine = Engine::new(Box::new(fetcher), Box::new(HeadlessPlatform::new()), DotsGame::default());

    let outcome = match &replay {
        Some(recording) => {
            engine = engine.with_event_source(Box::new(recording.to_source()));
            block_on(run_replay(&mut engine, &config, ticks))?;
            None
        }
        None => {
            let (input, live) = LiveEventSource::channel();
            let capture = CapturingEventSource::new(live);
            let handle = capture.handle();
            engine = engine.with_event_source(Box::new(capture));
            block_on(run_scripted(&mut engine, &config, ticks, &input))?;
            Some(handle)
        }
    };

    print_summary(&engine, ticks);
    if args.iter().any(|a| a == "--dump") {
        println!("{}", serde_json::to_string_pretty(engine.game())?);
    }

    if let Some(handle) = outcome {
        save_capture(&engine, &handle, record_path.as_deref(), store.as_mut())?;
    }
    Ok(())
}

async fn run_replay(engine: &mut Engine<DotsGame>, config: &EngineConfig, ticks: u64) -> Result<()> {
    engine.reset(config).await?;
    engine.run_ticks(ticks).await?;
    if engine.has_pending_events() {
        log::warn!("replay stopped with events still pending; raise --ticks");
    }
    Ok(())
}

/// Feed pseudo-player input from a stream forked off the run's seed,
/// so the script itself is reproducible.
async fn run_scripted(
    engine: &mut Engine<DotsGame>,
    config: &EngineConfig,
    ticks: u64,
    input: &InputSender,
) -> Result<()> {
    engine.reset(config).await?;
    let mut script = engine.rng().fork("script");

    for _ in 0..ticks {
        if let Some(kind) = scripted_input(&mut script) {
            input.send(kind);
        }
        let (delta, total) = engine.clock_mut().advance();
        engine.update(delta, total).await?;
    }
    Ok(())
}

fn scripted_input(script: &mut SeededRandom) -> Option<EventKind> {
    let roll = script.next();
    if roll < 0.02 {
        Some(EventKind::pointer(
            PointerPhase::Down,
            script.next_float(-dots::ARENA, dots::ARENA),
            script.next_float(-dots::ARENA, dots::ARENA),
        ))
    } else if roll < 0.05 {
        Some(EventKind::action("nudge", serde_json::json!({ "strength": script.next_int(1, 5) })))
    } else if roll < 0.06 {
        Some(EventKind::key_down("Space"))
    } else {
        None
    }
}

fn save_capture(
    engine: &Engine<DotsGame>,
    handle: &CaptureHandle,
    path: Option<&str>,
    store: Option<&mut RecordingStore>,
) -> Result<()> {
    if path.is_none() && store.is_none() {
        return Ok(());
    }
    let recording = Recording::new(engine.rng().seed(), handle.events());
    if let Some(path) = path {
        recording.save(path)?;
        println!("  recorded:     {path}");
    }
    if let Some(store) = store {
        store.save_recording(&recording)?;
        println!("  recording id: {}", recording.id);
    }
    Ok(())
}

fn print_summary(engine: &Engine<DotsGame>, ticks: u64) {
    let game = engine.game();
    println!("=== RUN SUMMARY ===");
    println!("  seed:         {}", engine.rng().seed());
    println!("  updates:      {ticks}");
    println!("  final tick:   {}", engine.total_ticks());
    println!("  events:       {}", game.events_applied);
    println!("  dots:         {}", game.dots.len());
    println!("  bounces:      {}", game.bounces);
    println!("  digest:       {:016x}", game.digest());
}

/// `--step` overrides the config's ticks per update; zero is raised to one.
fn apply_step(args: &[String], config: &mut EngineConfig) {
    config.ticks_per_update = parse_arg(args, "--step", config.ticks_per_update).max(1);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == flag).map(|w| w[1].clone())
}
