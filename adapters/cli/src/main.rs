#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Hexburst level headlessly.

mod board_transfer;
mod render;

use std::{
    f32::consts::PI,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use glam::Vec2;
use hexburst_core::{Event, HexLayout, LevelConfig};
use hexburst_system_turn::{Session, TurnStatus};
use hexburst_world::query;
use log::LevelFilter;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use board_transfer::BoardSnapshot;

const DEFAULT_LEVEL: &str = include_str!("../levels/default.toml");
const AIM_MARGIN: f32 = 0.35;

/// Plays a Hexburst level with seeded shots and prints each turn.
#[derive(Debug, Parser)]
#[command(name = "hexburst", version, about)]
struct Args {
    /// Level description in TOML. The built-in level is used when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Seed for lane rolls, rack colors, and aiming.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Stop after this many player actions.
    #[arg(long, value_name = "N")]
    shots: Option<u32>,
    /// Print debug logs to stderr.
    #[arg(long)]
    verbose: bool,
    /// Print a snapshot code of the final board.
    #[arg(long)]
    snapshot: bool,
    /// Render a board snapshot code instead of playing.
    #[arg(long, value_name = "CODE", conflicts_with_all = ["level", "shots", "snapshot"])]
    inspect: Option<String>,
}

/// Entry point for the Hexburst command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    if let Some(code) = &args.inspect {
        let snapshot = BoardSnapshot::decode(code).context("invalid board snapshot")?;
        println!("{}", render::render_grid(&snapshot.restore(HexLayout::default())));
        return Ok(());
    }

    let level = load_level(args.level.as_deref())?;
    play(level, &args)
}

/// Logs to stderr, filtered by `RUST_LOG` or warnings by default.
/// `--verbose` forces debug output.
fn init_logging(verbose: bool) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if verbose {
        let _ = builder.filter_level(LevelFilter::Debug);
    }
    builder.try_init().context("failed to install logger")
}

fn load_level(path: Option<&Path>) -> Result<LevelConfig> {
    let (source, name) = match path {
        Some(path) => (
            fs::read_to_string(path)
                .with_context(|| format!("failed to read level {}", path.display()))?,
            path.display().to_string(),
        ),
        None => (DEFAULT_LEVEL.to_owned(), "built-in level".to_owned()),
    };
    let level: LevelConfig =
        toml::from_str(&source).with_context(|| format!("failed to parse {name}"))?;
    level
        .validate()
        .with_context(|| format!("{name} is not playable"))?;
    Ok(level)
}

fn play(level: LevelConfig, args: &Args) -> Result<()> {
    let mut session = Session::new(level, args.seed);
    let mut aim = ChaCha8Rng::seed_from_u64(args.seed.wrapping_add(1));
    let mut events = Vec::new();

    let _ = session.start(&mut events);
    let mut status = settle(&mut session, &mut events);
    report("setup", &session, &mut events);

    let limit = args.shots.unwrap_or(u32::MAX);
    let mut turn = 0;
    while status == TurnStatus::Ready && turn < limit {
        turn += 1;
        let angle = aim.gen_range(AIM_MARGIN..PI - AIM_MARGIN);
        let direction = Vec2::new(angle.cos(), angle.sin());

        // A piece that would be wasted is worth more on the gauge.
        let wasted = session.aim_from_shooter(direction).placement().is_err();
        if wasted && session.gauge().accepts_sacrifice() {
            session.sacrifice(&mut events)?;
        } else {
            session.fire_from_shooter(direction, &mut events)?;
        }
        status = settle(&mut session, &mut events);
        report(&format!("turn {turn}"), &session, &mut events);
    }

    let world = session.world();
    let boss = query::boss(world);
    println!(
        "{status:?}: score {}, boss {}/{}, {} shots left",
        query::score(world),
        boss.current(),
        boss.max(),
        query::shots_remaining(world)
    );
    if args.snapshot {
        println!("{}", BoardSnapshot::capture(query::grid(world)).encode()?);
    }
    Ok(())
}

/// Resumes through every animation; nothing is drawn between steps.
fn settle(session: &mut Session, events: &mut Vec<Event>) -> TurnStatus {
    let mut status = session.status();
    while let TurnStatus::Awaiting(kind) = status {
        log::debug!("skipping {kind:?} animation");
        status = session.resume(events);
    }
    status
}

fn report(title: &str, session: &Session, events: &mut Vec<Event>) {
    println!("== {title}");
    for line in events.drain(..).filter_map(|event| render::describe(&event)) {
        println!("  {line}");
    }
    println!("{}", render::render_grid(query::grid(session.world())));
}
