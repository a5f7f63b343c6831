/// Juvenile fish zone advisory tool: loads the fisheries CSV, trains the
/// zone classifier once and answers a single query as JSON on stdout.
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fishzone_core::{load_and_train, HeatmapWeight, TrainParams};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── CLI ──────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "advisor", about = "Juvenile fish risk zones and fishing advisories by state")]
struct Args {
    /// Fisheries CSV snapshot
    #[arg(long, env = "FISH_DATA_PATH", default_value = "data/converted_final.csv")]
    data_path: PathBuf,

    /// JSON file with training parameters (missing keys keep defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the training seed
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Advisories for every record of a state
    Advise {
        #[arg(long)]
        state: String,
        /// Display label attached to each advisory
        #[arg(long)]
        river_name: Option<String>,
    },
    /// Heat-map points for a state
    Heatmap {
        #[arg(long)]
        state: String,
        #[arg(long)]
        river_name: Option<String>,
        /// Weight column, e.g. juvenile_risk_prob or depth_m
        #[arg(long, default_value = "juvenile_risk_prob")]
        weight: String,
    },
    /// States present in the dataset
    States,
    /// River names present in the dataset
    Rivers {
        #[arg(long)]
        state: Option<String>,
    },
    /// Held-out evaluation of the trained classifier
    Evaluate,
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn train_params(args: &Args) -> Result<TrainParams> {
    let mut params = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            TrainParams::from_json(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => TrainParams::default(),
    };
    if let Some(seed) = args.seed {
        params.seed = seed;
    }
    Ok(params)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let params = train_params(&args)?;

    // Reject a bad weight before spending time on training.
    let weight = match &args.command {
        Command::Heatmap { weight, .. } => Some(weight.parse::<HeatmapWeight>()?),
        _ => None,
    };

    let ctx = load_and_train(&args.data_path, &params)
        .with_context(|| format!("loading and training on {}", args.data_path.display()))?;

    match &args.command {
        Command::Advise { state, river_name } => {
            let advisories = ctx.advisories_for_state(state, river_name.as_deref());
            info!(state = %state, count = advisories.len(), "advisories generated");
            print_json(&json!({
                "success": true,
                "count": advisories.len(),
                "state": state,
                "river_name": river_name,
                "advisories": advisories,
            }))
        }
        Command::Heatmap { state, river_name, .. } => {
            let weight = weight.unwrap_or_default();
            let points = ctx.heatmap_points(state, river_name.as_deref(), weight);
            print_json(&json!({
                "success": true,
                "state": state,
                "river_name": river_name,
                "weight": weight,
                "count": points.len(),
                "points": points,
            }))
        }
        Command::States => print_json(&json!({
            "success": true,
            "states": ctx.available_states(),
        })),
        Command::Rivers { state } => print_json(&json!({
            "success": true,
            "state": state,
            "rivers": ctx.available_rivers(state.as_deref()),
        })),
        Command::Evaluate => print_json(ctx.evaluation()),
    }
}
