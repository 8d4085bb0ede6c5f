use std::path::PathBuf;

use bevy::app::AppExit;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use runner::init::{self, RunnerConfig};
use runner::scene::{load_scene, scatter_balls};
use sim::{ScenePreset, TICKS_PER_SECOND};

const MAX_RANDOM_BALLS: usize = 200;

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PresetArg {
    Default,
    SingleBall,
    Empty,
}

impl From<PresetArg> for ScenePreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Default => ScenePreset::ThreeBalls,
            PresetArg::SingleBall => ScenePreset::SingleBall,
            PresetArg::Empty => ScenePreset::Empty,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// RON scene file; overrides --preset
    #[arg(short, long)]
    scene: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = PresetArg::Default)]
    preset: PresetArg,

    /// Number of fixed ticks to simulate
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Tick at wall-clock speed instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// Extra balls dropped at random positions
    #[arg(long, default_value_t = 0)]
    random_balls: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Ticks between stats log lines, 0 to disable
    #[arg(long, default_value_t = TICKS_PER_SECOND * 5)]
    stats_interval: u64,

    /// Write the final snapshot to this RON file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if !args.realtime && args.ticks.is_none() {
        eprintln!("Error: batch runs need a tick count.");
        eprintln!("Pass --ticks <N>, or --realtime to run until interrupted.");
        std::process::exit(1);
    }

    if args.random_balls > MAX_RANDOM_BALLS {
        eprintln!("Error: random_balls must be at most {MAX_RANDOM_BALLS}.");
        eprintln!("Got: {}", args.random_balls);
        std::process::exit(1);
    }

    let mut scene = match &args.scene {
        Some(path) => match load_scene(path) {
            Ok(scene) => scene,
            Err(err) => {
                eprintln!("Could not load scene {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => ScenePreset::from(args.preset).to_config(),
    };

    if args.random_balls > 0 {
        let seed = args.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let extra = scatter_balls(&mut rng, args.random_balls, &scene);
        scene.balls.extend(extra);
        println!("Scattered {} balls with seed {}", args.random_balls, seed);
    }

    let exit = init::init(RunnerConfig {
        scene,
        ticks: args.ticks,
        realtime: args.realtime,
        stats_interval: args.stats_interval,
        output: args.output,
    });

    if let AppExit::Error(code) = exit {
        std::process::exit(code.get() as i32);
    }
}
