//! Headless skirmish runner
//!
//! Builds a seeded random scenario, lets the computer players fight it out
//! for a number of turns and prints a summary.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Parser;
use hex_command::core::config::load_config;
use hex_command::economy::Ledger;
use hex_command::game::{
    build_world, run_full_turn, GameOutcome, ScenarioSettings, TurnEvent, World,
};
use hex_command::{AiConfig, Result};
use serde::Serialize;

/// Skirmish - two computer-controlled nations on a random hex map
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Run a seeded AI vs AI skirmish and print the outcome")]
struct Args {
    /// Random seed for reproducible runs
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of full turns to play
    #[arg(long, default_value_t = 20)]
    turns: u32,

    /// Map width in hexes
    #[arg(long, default_value_t = 24)]
    width: u32,

    /// Map height in hexes
    #[arg(long, default_value_t = 16)]
    height: u32,

    /// AI tuning file (TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every decision
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize, Default)]
struct ActivityCounts {
    attacks: u32,
    moves: u32,
    captures: u32,
    purchases: u32,
    discarded_purchases: u32,
    deployments: u32,
    orders_issued: u32,
    orders_kept: u32,
}

impl ActivityCounts {
    fn record(&mut self, event: &TurnEvent) {
        match event {
            TurnEvent::Attack(_) => self.attacks += 1,
            TurnEvent::UnitMoved { .. } => self.moves += 1,
            TurnEvent::KeyPointCaptured { .. } => self.captures += 1,
            TurnEvent::UnitPurchased { .. } => self.purchases += 1,
            TurnEvent::PurchaseDiscarded { .. } => self.discarded_purchases += 1,
            TurnEvent::UnitDeployed { .. } => self.deployments += 1,
            TurnEvent::OrderIssued { .. } => self.orders_issued += 1,
            TurnEvent::OrderKept { .. } => self.orders_kept += 1,
            _ => {}
        }
    }
}

#[derive(Serialize)]
struct NationSummary {
    nation: String,
    victory_points: u32,
    key_points_held: usize,
    units_alive: usize,
    general_points: u32,
}

/// JSON output structure
#[derive(Serialize)]
struct SkirmishSummary {
    seed: u64,
    turns_played: u32,
    outcome: String,
    nations: Vec<NationSummary>,
    activity: ActivityCounts,
}

fn summarize(
    world: &World,
    seed: u64,
    turns_played: u32,
    activity: ActivityCounts,
) -> SkirmishSummary {
    let outcome = match world.outcome() {
        GameOutcome::InProgress => "in progress".to_string(),
        GameOutcome::Draw => "draw".to_string(),
        GameOutcome::Victory(nation) => format!("{} wins", nation),
    };

    let nations = world
        .nations()
        .into_iter()
        .map(|nation| {
            let general_points = world
                .general_of(&nation)
                .and_then(|id| world.ledger(id).ok())
                .map(|l| l.points().economic)
                .unwrap_or(0);
            NationSummary {
                victory_points: world.victory_points_of(&nation),
                key_points_held: world
                    .key_points
                    .iter()
                    .filter(|kp| kp.is_held_by(&nation))
                    .count(),
                units_alive: world
                    .units
                    .values()
                    .filter(|u| u.owner.nation == nation && !u.is_destroyed())
                    .count(),
                general_points,
                nation: nation.to_string(),
            }
        })
        .collect();

    SkirmishSummary {
        seed,
        turns_played,
        outcome,
        nations,
        activity,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "hex_command=debug"
    } else {
        "hex_command=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => AiConfig::default(),
    };

    let settings = ScenarioSettings {
        seed: args.seed,
        width: args.width,
        height: args.height,
        max_turns: args.turns,
        ..Default::default()
    };
    let mut world = build_world(&settings, config)?;

    let mut activity = ActivityCounts::default();
    let mut turns_played = 0;
    let mut per_turn_vp: Vec<BTreeMap<String, u32>> = Vec::new();
    while world.current_turn <= world.max_turns {
        let events = run_full_turn(&mut world)?;
        turns_played += 1;
        for event in &events {
            activity.record(event);
        }
        per_turn_vp.push(
            world
                .victory_points
                .iter()
                .map(|(n, vp)| (n.to_string(), *vp))
                .collect(),
        );
        if events.iter().any(|e| matches!(e, TurnEvent::GameOver { .. })) {
            break;
        }
    }

    let summary = summarize(&world, args.seed, turns_played, activity);

    if args.format == "text" {
        println!("Skirmish seed {} - {} turns", summary.seed, summary.turns_played);
        for (turn, standings) in per_turn_vp.iter().enumerate() {
            let line: Vec<String> = standings
                .iter()
                .map(|(n, vp)| format!("{} {}", n, vp))
                .collect();
            println!("  turn {:>3}: {}", turn + 1, line.join(", "));
        }
        for nation in &summary.nations {
            println!(
                "{}: {} VP, {} key points, {} units, {} points in reserve",
                nation.nation,
                nation.victory_points,
                nation.key_points_held,
                nation.units_alive,
                nation.general_points
            );
        }
        println!("Outcome: {}", summary.outcome);
    } else {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}
