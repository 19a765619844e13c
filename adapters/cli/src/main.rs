#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Lane Clash match between two
//! scripted sides.

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use lane_clash_core::{Catalog, Command, GameMode, Side};
use lane_clash_system_opponent::OpponentPolicy;
use lane_clash_world::{self as world, query, query::Outcome, MatchSetup, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

/// Runs a scripted Lane Clash match and prints its outcome.
#[derive(Debug, Parser)]
#[command(name = "lane-clash", version)]
struct Args {
    /// Seed driving every random decision in the match.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Trophy count steering the player-side policy.
    #[arg(long, default_value_t = 2_000)]
    player_trophies: u32,

    /// Trophy count steering the opponent-side policy.
    #[arg(long, default_value_t = 2_000)]
    opponent_trophies: u32,

    /// Ruleset variant.
    #[arg(long, value_enum, default_value_t = ModeArg::Standard)]
    mode: ModeArg,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Tick budget before the run is abandoned.
    #[arg(long, default_value_t = 30_000)]
    max_ticks: u64,

    /// TOML card catalog replacing the built-in one.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Writes the final battle state as JSON to this path.
    #[arg(long)]
    dump: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Standard,
    TripleElixir,
    SuddenDeath,
    Rage,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => GameMode::Standard,
            ModeArg::TripleElixir => GameMode::TripleElixir,
            ModeArg::SuddenDeath => GameMode::SuddenDeath,
            ModeArg::Rage => GameMode::RageMode,
        }
    }
}

/// What a finished run reports.
#[derive(Debug)]
struct Report {
    ticks: u64,
    outcome: Option<Outcome>,
    world: World,
}

fn load_catalog(path: Option<&PathBuf>) -> Result<Catalog> {
    let Some(path) = path else {
        return Ok(Catalog::standard());
    };
    let document = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    Catalog::from_toml_str(&document)
        .with_context(|| format!("failed to parse catalog {}", path.display()))
}

fn run(args: &Args, catalog: Catalog) -> Result<Report> {
    let setup = MatchSetup::new(args.mode.into());
    let mut world = World::new(&setup, catalog).context("failed to set up the match")?;
    let policy = OpponentPolicy::default();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let dt = Duration::from_millis(args.tick_ms.max(1));
    let mut events = Vec::new();

    let mut ticks = 0;
    while ticks < args.max_ticks && query::outcome(&world).is_none() {
        for (side, trophies) in [
            (Side::Player, args.player_trophies),
            (Side::Opponent, args.opponent_trophies),
        ] {
            world::play_scripted(&mut world, &policy, side, trophies, &mut rng, &mut events)
                .with_context(|| format!("{side:?} policy failed at tick {ticks}"))?;
        }
        world::apply(&mut world, Command::Tick { dt }, &mut rng, &mut events)
            .with_context(|| format!("tick {ticks} failed"))?;
        events.clear();
        ticks += 1;
    }

    Ok(Report {
        ticks,
        outcome: query::outcome(&world),
        world,
    })
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Entry point for the Lane Clash command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let catalog = load_catalog(args.catalog.as_ref())?;
    let report = run(&args, catalog)?;

    match report.outcome {
        Some(outcome) => {
            let winner = outcome
                .winner
                .map_or_else(|| "draw".to_owned(), |side| format!("{side:?}"));
            info!(ticks = report.ticks, "match finished");
            println!(
                "winner: {winner}, crowns: {}-{}, trophies: {:+}",
                outcome.crowns.player, outcome.crowns.opponent, outcome.trophy_delta
            );
        }
        None => {
            warn!(ticks = report.ticks, "tick budget exhausted before the match ended");
            println!("unfinished after {} ticks", report.ticks);
        }
    }

    if let Some(path) = &args.dump {
        let json = serde_json::to_string_pretty(query::state(&report.world))
            .context("failed to serialize the final state")?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
