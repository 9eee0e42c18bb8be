//! # Stream Walk
//!
//! Walks a viewpoint across the world at a fixed speed and reports how the
//! chunk manager keeps up.
//!
//! ## Usage
//!
//! ```bash
//! stream_walk --config world.toml --chunks 50 --speed 0.5 --seed 1234
//! ```

use std::process::ExitCode;
use std::time::Instant;

use emberdeep_procedural::{ChunkManager, Layer, LayerMethods, MemoryHost, WorldConfig, WorldSeed};

fn main() -> ExitCode {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         EMBERDEEP STREAM WALK                                    ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    // Simple parsing, no external deps
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = None;
    let mut chunks = 20i64;
    let mut speed = 0.5f64;
    let mut seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--chunks" | "-n" => {
                if i + 1 < args.len() {
                    chunks = args[i + 1].parse().unwrap_or(20);
                    i += 1;
                }
            }
            "--speed" | "-s" => {
                if i + 1 < args.len() {
                    speed = args[i + 1].parse().unwrap_or(0.5);
                    i += 1;
                }
            }
            "--seed" => {
                if i + 1 < args.len() {
                    seed = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: stream_walk [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>    TOML world config (default: built-in)");
                println!("  -n, --chunks <NUM>     Chunks to walk across (default: 20)");
                println!("  -s, --speed <UNITS>    World units per tick (default: 0.5)");
                println!("      --seed <SEED>      Fixed world seed");
                println!("  -h, --help             Show this help");
                return ExitCode::SUCCESS;
            }
            _ => {}
        }
        i += 1;
    }
    if !(speed.is_finite() && speed > 0.0) {
        speed = 0.5;
    }

    let mut config = match config_path {
        Some(path) => match WorldConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load {path}: {err}");
                return ExitCode::FAILURE;
            }
        },
        None => WorldConfig::production(),
    };
    if let Some(seed) = seed {
        config.seed.use_random_seed = false;
        config.seed.seed = seed;
    }

    let world_seed: WorldSeed = config.resolve_seed();
    let methods = LayerMethods::from_config(&config);
    let mut manager = match ChunkManager::with_methods(config, world_seed, methods, MemoryHost::new()) {
        Ok(manager) => manager,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("┌─ CONFIGURATION ─────────────────────────────────────────────────┐");
    println!("│ Seed:               {}", world_seed.value());
    println!("│ Chunk:              {}x{} cells", config.chunk.width, config.chunk.height);
    println!("│ Walk:               {chunks} chunks at {speed} units/tick");
    println!("│ Budget:             {} columns/tick", config.streaming.columns_per_tick);
    println!("└─────────────────────────────────────────────────────────────────┘");
    println!();

    if let Err(err) = manager.start() {
        eprintln!("Initial admission failed: {err}");
    }

    let start = Instant::now();
    let start_x = manager.chunk_start_x(config.streaming.initial_index);
    let end_x = start_x + chunks as f64 * config.chunk_world_width();
    let mut x = start_x;
    let mut stalls = 0u64;
    let mut peak_live = 0usize;

    while x < end_x {
        let report = manager.tick(x);
        peak_live = peak_live.max(manager.host().live_count());

        for index in &report.completed {
            let surface = manager
                .ready_grid(*index, Layer::Overworld)
                .map_or(0, |grid| grid.column_fill_height(0));
            println!("  chunk {index:>4} ready (surface at column 0: {surface})");
        }
        for failure in &report.failed {
            println!("  chunk {:>4} FAILED: {}", failure.index, failure.message);
        }

        // Hold the viewpoint while the chunk ahead is still generating.
        let boundary = manager.chunk_start_x(manager.next_index());
        if x + speed >= boundary && !manager.is_chunk_ready(manager.next_index()) {
            stalls += 1;
        } else {
            x += speed;
        }
    }

    let elapsed = start.elapsed();
    let stats = manager.stats();

    println!();
    println!("┌─ RESULTS ───────────────────────────────────────────────────────┐");
    println!("│ Ticks:              {}", stats.ticks);
    println!("│ Chunks generated:   {}", stats.generated);
    println!("│ Chunks evicted:     {}", stats.evicted);
    println!("│ Failures:           {}", stats.failed);
    println!("│ Columns written:    {}", stats.columns_written);
    println!("│ Tiles published:    {}", stats.tiles_published);
    println!("│ Stalled ticks:      {stalls}");
    println!("│ Peak containers:    {peak_live}");
    println!("│ Wall time:          {:.2} ms", elapsed.as_secs_f64() * 1000.0);
    println!("└─────────────────────────────────────────────────────────────────┘");

    manager.shutdown();
    ExitCode::SUCCESS
}
