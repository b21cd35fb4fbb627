//! Lynx Engine Driver
//!
//! Plays a move string on a level, then checks that savestates restore the
//! simulation exactly.
//!
//! ```text
//! lynx-engine [LEVEL.json | -] [MOVES] [ENGINE.json]
//! ```
//!
//! Without arguments a small built-in level is played.

use anyhow::{anyhow, Context};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use lynx_engine::{
    config::{EngineConfig, LevelDescription},
    core::{hash::short_hex, position::GRID_CELLS},
    parse_moves, Direction, Level, Position, SavestateCompressor, Tile, VERSION,
};

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Lynx Engine v{}", VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let desc = match args.first().map(String::as_str) {
        None | Some("-") => demo_level(),
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("reading level {path}"))?;
            LevelDescription::from_json(&text).with_context(|| format!("parsing level {path}"))?
        }
    };
    let moves = match args.get(1) {
        Some(text) => parse_moves(text).map_err(|c| anyhow!("invalid move character {c:?}"))?,
        None => parse_moves(&"r".repeat(40)).map_err(|c| anyhow!("invalid move character {c:?}"))?,
    };
    let config = match args.get(2) {
        Some(path) => EngineConfig::from_file(path).with_context(|| format!("loading engine config {path}"))?,
        None => EngineConfig::default(),
    };

    run(&desc, &moves, &config)
}

/// Play, then verify determinism through savestates.
fn run(desc: &LevelDescription, moves: &[Direction], config: &EngineConfig) -> anyhow::Result<()> {
    let mut level = Level::new(desc).context("building level")?;
    info!(
        number = level.number(),
        title = level.title(),
        creatures = level.creatures().len(),
        chips_left = level.chips_left(),
        "level ready"
    );

    let compressor = SavestateCompressor::new(&config.compressor).context("starting compressor")?;
    let start = if config.compress_saves {
        compressor.submit(level.save())
    } else {
        SavestateCompressor::keep_uncompressed(level.save())
    };

    // === Play ===
    info!("=== Playing {} moves ===", moves.len());
    let mut hashes = Vec::with_capacity(moves.len());
    let mut completed = false;
    for &input in moves {
        let outcome = level.tick(input);
        hashes.push(level.state_hash());
        if outcome.must_repeat {
            debug!(tick = level.tick_number(), "forced move");
        }
        if !level.chip().is_alive() && !outcome.completed {
            info!(tick = level.tick_number(), position = %level.chip_position(), "Chip died");
            break;
        }
        if outcome.completed {
            completed = true;
            break;
        }
    }

    let final_hash = level.state_hash();
    info!(
        tick = level.tick_number(),
        completed,
        timer = level.timer(),
        chips_left = level.chips_left(),
        hash = %short_hex(&final_hash),
        "play finished"
    );

    // === Verify ===
    info!("=== Verifying Determinism ===");
    let mut replay_level = Level::new(desc).context("rebuilding level")?;
    start
        .with_bytes(|bytes| replay_level.load(bytes))
        .context("restoring starting savestate")?;
    let replay = replay_level.replay(&moves[..hashes.len()]);

    info!(
        start_bytes = start.len(),
        start_compressed = start.is_compressed(),
        moves_hash = %short_hex(&replay.moves_hash),
        "replayed from savestate"
    );

    if replay.hashes == hashes && replay.completed == completed {
        info!("DETERMINISM VERIFIED: {} tick hashes match", hashes.len());
    } else {
        warn!("DETERMINISM FAILURE: replay diverged");
    }

    let mut restored = Level::new(desc).context("rebuilding level")?;
    restored.load(&level.save()).context("restoring final savestate")?;
    if restored.state_hash() == final_hash {
        info!("Savestate round trip verified");
    } else {
        warn!("Savestate round trip changed the state hash");
    }

    compressor.shutdown();
    Ok(())
}

/// A corridor with two chips, a socket and the exit, plus a bug pacing a
/// walled box below it.
fn demo_level() -> LevelDescription {
    let mut layer = vec![Tile::Floor.byte(); GRID_CELLS];
    let mut put = |x: i32, y: i32, tile: Tile| {
        if let Some(p) = Position::new(x, y) {
            layer[p.index()] = tile.byte();
        }
    };

    for x in 0..12 {
        put(x, 0, Tile::Wall);
        put(x, 2, Tile::Wall);
    }
    put(1, 1, Tile::ChipRight);
    put(3, 1, Tile::Chip);
    put(5, 1, Tile::Chip);
    put(7, 1, Tile::Socket);
    put(9, 1, Tile::Exit);

    for x in 2..9 {
        put(x, 4, Tile::Wall);
        put(x, 8, Tile::Wall);
    }
    for y in 4..9 {
        put(2, y, Tile::Wall);
        put(8, y, Tile::Wall);
    }
    put(4, 6, Tile::BugUp);

    LevelDescription {
        number: 1,
        title: "Demo Corridor".to_string(),
        time_limit: 100,
        chips_required: 2,
        layer,
        rng_seed: 0x1234,
        ..LevelDescription::default()
    }
}
