use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_app::ScheduleRunnerPlugin;
use bevy_log::{error, info};
use sim::sets::SimFixedUpdateSet;
use sim::{ConfigError, SceneConfig, TankSimulation, TankSimulationPlugin, TICKS_PER_SECOND};
use std::path::PathBuf;
use std::time::Duration;

use crate::scene::save_snapshot;

const TICK_DURATION: Duration = Duration::from_millis(1000 / TICKS_PER_SECOND);

#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub scene: SceneConfig,
    /// Stop after this many fixed ticks; `None` runs until interrupted
    pub ticks: Option<u64>,
    /// Follow the wall clock instead of ticking as fast as possible
    pub realtime: bool,
    pub stats_interval: u64,
    /// Where the final snapshot is written
    pub output: Option<PathBuf>,
}

#[derive(Resource, Debug, Clone)]
struct RunLimit {
    ticks: Option<u64>,
    output: Option<PathBuf>,
}

/// Builds the headless app without starting it.
pub fn build_app(config: RunnerConfig) -> Result<App, ConfigError> {
    let simulation = TankSimulation::new(config.scene)?;

    let mut app = App::new();
    let loop_interval = if config.realtime {
        TICK_DURATION
    } else {
        Duration::ZERO
    };
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(loop_interval)));
    app.add_plugins(TankSimulationPlugin {
        stats_interval: config.stats_interval,
    });

    app.insert_resource(Time::<Fixed>::from_duration(TICK_DURATION));
    if !config.realtime {
        // Every update advances exactly one fixed tick
        app.insert_resource(TimeUpdateStrategy::ManualDuration(TICK_DURATION));
    }

    app.insert_resource(simulation);
    app.insert_resource(RunLimit {
        ticks: config.ticks,
        output: config.output,
    });
    app.add_systems(
        FixedUpdate,
        stop_after_tick_limit.after(SimFixedUpdateSet::Diagnostics),
    );

    Ok(app)
}

fn stop_after_tick_limit(
    simulation: Res<TankSimulation>,
    limit: Res<RunLimit>,
    mut exit: EventWriter<AppExit>,
    mut finished: Local<bool>,
) {
    let Some(ticks) = limit.ticks else {
        return;
    };
    if *finished || simulation.tick_count() < ticks {
        return;
    }
    *finished = true;

    let stats = simulation.stats();
    info!(
        "Finished {} ticks: water volume {:.4}, ball kinetic energy {:.4}",
        stats.tick, stats.water_volume, stats.ball_kinetic_energy
    );

    if let Some(path) = &limit.output {
        if let Err(err) = save_snapshot(&simulation.snapshot(), path) {
            error!("Failed to save snapshot to {}: {}", path.display(), err);
            exit.write(AppExit::from_code(1));
            return;
        }
    }

    exit.write(AppExit::Success);
}

pub fn init(config: RunnerConfig) -> AppExit {
    let realtime = config.realtime;
    let ticks = config.ticks;

    let mut app = match build_app(config) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("Invalid scene: {err}");
            return AppExit::from_code(1);
        }
    };
    app.add_plugins(bevy_log::LogPlugin::default());

    match ticks {
        Some(ticks) => info!(
            "Running {} ticks ({})",
            ticks,
            if realtime { "realtime" } else { "batch" }
        ),
        None => info!("Running until interrupted"),
    }

    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim::ScenePreset;

    fn run_to_exit(app: &mut App, max_updates: usize) -> Option<AppExit> {
        for _ in 0..max_updates {
            app.update();
            if let Some(exit) = app.should_exit() {
                return Some(exit);
            }
        }
        None
    }

    #[test]
    fn test_batch_run_stops_at_tick_limit() {
        let output = std::env::temp_dir().join(format!("runner-init-{}.ron", std::process::id()));
        let mut app = build_app(RunnerConfig {
            scene: ScenePreset::SingleBall.to_config(),
            ticks: Some(5),
            realtime: false,
            stats_interval: 0,
            output: Some(output.clone()),
        })
        .unwrap();

        let exit = run_to_exit(&mut app, 20);

        assert_eq!(exit, Some(AppExit::Success));
        assert_eq!(app.world().resource::<TankSimulation>().tick_count(), 5);
        assert!(output.exists());
        std::fs::remove_file(&output).unwrap();
    }

    #[test]
    fn test_invalid_scene_is_rejected() {
        let mut scene = ScenePreset::Empty.to_config();
        scene.column_spacing = 0.0;

        let result = build_app(RunnerConfig {
            scene,
            ticks: Some(1),
            realtime: false,
            stats_interval: 0,
            output: None,
        });

        assert!(matches!(
            result,
            Err(ConfigError::InvalidSpacing { spacing }) if spacing == 0.0
        ));
    }
}
