#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for the seedpath simulation.

mod autobuild;
mod layout_transfer;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use seedpath_core::{clock_seed, Difficulty, Event, WaveError};
use seedpath_simulation::{Simulation, SimulationConfig};
use seedpath_system_spawning::WaveComposition;
use seedpath_world::query;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::{
    autobuild::AutoBuilder,
    layout_transfer::{LayoutSnapshot, LayoutTower},
};

/// Simulated time between two tick calls.
const FRAME: Duration = Duration::from_millis(16);
/// Tick calls after which a wave is considered stuck.
const WAVE_FRAME_LIMIT: u32 = 100_000;

#[derive(Debug, Parser)]
#[command(
    name = "seedpath",
    version,
    about = "Headless runner for the seedpath tower-defence simulation"
)]
struct Cli {
    /// TOML configuration applied before the flags below.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Map seed. Defaults to the configuration, then to the wall clock.
    #[arg(long, global = true)]
    seed: Option<u32>,
    /// Canvas width in world units.
    #[arg(long, global = true)]
    width: Option<f32>,
    /// Canvas height in world units.
    #[arg(long, global = true)]
    height: Option<f32>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Plays waves with a deterministic auto-builder and prints a summary.
    Run {
        /// Number of waves to play.
        #[arg(long, default_value_t = 3)]
        waves: u32,
        /// Tick bodies per frame, 1 to 5.
        #[arg(long)]
        speed: Option<u32>,
        /// Difficulty level: easy, normal, hard or nightmare.
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Layout code to rebuild instead of auto-building.
        #[arg(long)]
        layout: Option<String>,
        /// Print the layout code of the final towers.
        #[arg(long)]
        export: bool,
    },
    /// Prints the generated path as JSON.
    Path,
    /// Prints the enemy composition of upcoming waves.
    Preview {
        /// Number of waves to preview.
        #[arg(long, default_value_t = 5)]
        waves: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(width) = cli.width {
        config.canvas_width = width;
    }
    if let Some(height) = cli.height {
        config.canvas_height = height;
    }
    let seed = *config.seed.get_or_insert_with(clock_seed);

    match cli.command {
        Commands::Run {
            waves,
            speed,
            difficulty,
            layout,
            export,
        } => {
            if let Some(speed) = speed {
                config.game_speed = speed;
            }
            if let Some(difficulty) = difficulty {
                config.difficulty = difficulty;
            }
            run(&config, waves, layout.as_deref(), export)
        }
        Commands::Path => print_path(&config),
        Commands::Preview { waves } => {
            print_preview(seed, waves);
            Ok(())
        }
    }
}

#[derive(Debug, Default)]
struct RunSummary {
    waves_cleared: u32,
    kills: u32,
    leaks: u32,
    bonus: u32,
}

impl RunSummary {
    fn record(&mut self, event: &Event) -> bool {
        match event {
            Event::EnemyKilled { .. } => self.kills += 1,
            Event::EnemyLeaked { .. } => self.leaks += 1,
            Event::WaveCompleted { bonus, .. } => {
                self.waves_cleared += 1;
                self.bonus += bonus;
                return true;
            }
            _ => {}
        }
        false
    }
}

fn run(config: &SimulationConfig, waves: u32, layout: Option<&str>, export: bool) -> Result<()> {
    let mut simulation = Simulation::from_config(config);
    let mut builder = match layout {
        Some(code) => {
            rebuild_layout(&mut simulation, code)?;
            None
        }
        None => Some(AutoBuilder::new(&simulation)),
    };

    let mut summary = RunSummary::default();
    let mut clock = Duration::ZERO;
    'waves: for _ in 0..waves {
        if let Some(builder) = builder.as_mut() {
            let built = builder.spend(&mut simulation);
            tracing::debug!(built, currency = simulation.currency(), "auto-builder spent");
        }

        let wave = loop {
            match simulation.start_wave() {
                Ok(wave) => break wave,
                Err(WaveError::CountdownActive) => {
                    clock += FRAME;
                    simulation.tick(clock);
                }
                Err(WaveError::GameOver) => break 'waves,
                Err(error @ WaveError::InProgress) => {
                    return Err(error).context("could not start the next wave");
                }
            }
        };

        let mut completed = false;
        let mut frames = 0;
        while !completed && !simulation.is_game_over() {
            if frames == WAVE_FRAME_LIMIT {
                bail!("wave {wave} did not finish within {WAVE_FRAME_LIMIT} frames");
            }
            frames += 1;
            clock += FRAME;
            simulation.tick(clock);
            for event in simulation.drain_events() {
                completed |= summary.record(&event);
            }
        }
        tracing::info!(
            wave,
            kills = summary.kills,
            base_health = simulation.base_health(),
            currency = simulation.currency(),
            "wave finished"
        );
    }

    let path = query::path(simulation.world());
    println!("seed:          {}", simulation.seed());
    println!("canvas:        {}x{}", path.width(), path.height());
    println!("waves cleared: {}/{waves}", summary.waves_cleared);
    println!("kills:         {}", summary.kills);
    println!("leaks:         {}", summary.leaks);
    println!("wave bonuses:  {}", summary.bonus);
    println!("base health:   {}", simulation.base_health());
    println!("currency:      {}", simulation.currency());
    println!("towers:        {}", simulation.towers().iter().count());
    println!("game over:     {}", simulation.is_game_over());

    if export {
        let snapshot = LayoutSnapshot {
            seed: simulation.seed(),
            canvas_width: path.width(),
            canvas_height: path.height(),
            towers: simulation
                .towers()
                .iter()
                .map(|tower| LayoutTower {
                    kind: tower.kind,
                    x: tower.position.x,
                    y: tower.position.y,
                })
                .collect(),
        };
        println!("layout:        {}", snapshot.encode()?);
    }
    Ok(())
}

fn rebuild_layout(simulation: &mut Simulation, code: &str) -> Result<()> {
    let snapshot = LayoutSnapshot::decode(code).context("invalid layout code")?;
    simulation.configure_canvas(snapshot.canvas_width, snapshot.canvas_height);
    simulation.regenerate_map(snapshot.seed);
    for tower in &snapshot.towers {
        let _ = simulation
            .place_tower(tower.kind, Vec2::new(tower.x, tower.y))
            .with_context(|| {
                format!(
                    "could not rebuild {} tower at ({}, {})",
                    tower.kind.name(),
                    tower.x,
                    tower.y
                )
            })?;
    }
    tracing::info!(
        seed = snapshot.seed,
        towers = snapshot.towers.len(),
        "layout rebuilt"
    );
    Ok(())
}

#[derive(Debug, Serialize)]
struct PathReport {
    seed: u32,
    width: f32,
    height: f32,
    length: f32,
    waypoints: Vec<[f32; 2]>,
}

fn print_path(config: &SimulationConfig) -> Result<()> {
    let simulation = Simulation::from_config(config);
    let path = query::path(simulation.world());
    let report = PathReport {
        seed: path.seed(),
        width: path.width(),
        height: path.height(),
        length: path.total_length(),
        waypoints: path.waypoints().iter().map(|point| point.to_array()).collect(),
    };
    let json = serde_json::to_string_pretty(&report).context("failed to serialize path")?;
    println!("{json}");
    Ok(())
}

fn print_preview(seed: u32, waves: u32) {
    println!("seed {seed}");
    for wave in 1..=waves {
        let composition = WaveComposition::preview(seed, wave);
        let kinds: Vec<String> = composition
            .iter()
            .map(|(kind, count)| format!("{} {count}", kind.name()))
            .collect();
        println!(
            "wave {wave}: {} enemies ({})",
            composition.total(),
            kinds.join(", ")
        );
    }
}
