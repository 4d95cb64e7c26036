// CLI entry point: plan one tick for one agent from a JSON scene file.
//
// Builds the navigation graph for the scene, runs the archetype's policy
// against the scene's snapshot, routes the resulting action and prints the
// plan as JSON on stdout. Logs go to stderr, filtered by `RUST_LOG`.
//
// Usage:
//   plan --scene <FILE> [OPTIONS]
//     --seed <N>      Seed for the decision RNG (default: 1)
//     --raw           Also print the unsmoothed route
//
// Scene format (all of `config`, `obstacles`, `ground_height` optional):
//   { "config": { ... AiConfig ... },
//     "bounds": { "min": {x,y,z}, "max": {x,y,z} }, "step": 2.0,
//     "obstacles": [ { "min": {..}, "max": {..} } ], "ground_height": 0.0,
//     "archetype": "tactical", "snapshot": { ... WorldSnapshot ... } }

use serde::Deserialize;
use skirmish_ai::action::Action;
use skirmish_ai::config::AiConfig;
use skirmish_ai::planner::{Plan, TickPlanner};
use skirmish_ai::prng::GameRng;
use skirmish_ai::probe::{Aabb, ObstacleSet};
use skirmish_ai::profile::Archetype;
use skirmish_ai::snapshot::WorldSnapshot;
use skirmish_ai::types::Bounds;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

struct Args {
    scene: PathBuf,
    seed: u64,
    raw: bool,
}

#[derive(Deserialize)]
struct Scene {
    #[serde(default)]
    config: AiConfig,
    bounds: Bounds,
    step: f32,
    #[serde(default)]
    obstacles: Vec<Aabb>,
    #[serde(default)]
    ground_height: Option<f32>,
    archetype: String,
    snapshot: WorldSnapshot,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    if let Err(e) = run(&args) {
        eprintln!("plan: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(&args.scene)
        .map_err(|e| format!("cannot read {}: {e}", args.scene.display()))?;
    let scene: Scene = serde_json::from_str(&text)?;

    let mut obstacles = ObstacleSet::new();
    for aabb in scene.obstacles {
        obstacles.push(aabb);
    }
    if let Some(height) = scene.ground_height {
        obstacles = obstacles.with_ground(height);
    }

    let mut planner = TickPlanner::new(scene.config)?;
    planner.initialize(&scene.bounds, scene.step, &obstacles)?;

    let mut rng = GameRng::new(args.seed);
    let plan = match scene.archetype.parse::<Archetype>() {
        Ok(archetype) => planner.plan(archetype, &scene.snapshot, &obstacles, &mut rng),
        Err(e) => {
            tracing::warn!(%e, "holding position");
            Plan {
                action: Action::hold_fallback(),
                path: Vec::new(),
            }
        }
    };

    let output = if args.raw {
        let raw_path = match plan.action.target {
            Some(target) if plan.action.kind.requires_movement() => planner
                .navigation()
                .find_path(scene.snapshot.agent_position, target),
            _ => Vec::new(),
        };
        serde_json::json!({ "plan": plan, "raw_path": raw_path })
    } else {
        serde_json::to_value(&plan)?
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Parse command-line arguments. Simple `std::env::args()` matching.
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut scene = None;
    let mut seed = 1;
    let mut raw = false;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--scene" => {
                i += 1;
                scene = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--scene requires a file path");
                    std::process::exit(1);
                }));
            }
            "--seed" => {
                i += 1;
                seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a valid number");
                    std::process::exit(1);
                });
            }
            "--raw" => raw = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(scene) = scene else {
        eprintln!("--scene is required");
        print_usage();
        std::process::exit(1);
    };
    Args { scene, seed, raw }
}

fn print_usage() {
    println!("Usage: plan --scene <FILE> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --scene <FILE>    JSON scene to plan against (required)");
    println!("  --seed <N>        Seed for the decision RNG (default: 1)");
    println!("  --raw             Also print the unsmoothed route");
    println!("  --help, -h        Show this help");
}
