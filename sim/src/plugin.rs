//! Bevy plugin driving a [`TankSimulation`] resource.
//!
//! The simulation advances once per `FixedUpdate`. Pause and grab commands
//! arrive as [`SimulationCommand`] events and are applied in `Update`, so they
//! never land in the middle of a physics step.

use bevy::math::{Ray3d, Vec3};
use bevy::prelude::*;
use bevy_log::{debug, info, warn};

use crate::physics::Grabber;
use crate::sets::{SimFixedUpdateSet, SimUpdateSet};
use crate::simulation::TankSimulation;

#[derive(Event, Debug, Clone, PartialEq)]
pub enum SimulationCommand {
    Pause,
    Resume,
    TogglePause,
    Grab { index: usize, position: Vec3 },
    MoveGrabbed { index: usize, position: Vec3 },
    Release {
        index: usize,
        position: Vec3,
        velocity: Vec3,
    },
    /// Grabs the closest ball under a pointer ray
    PointerDown(Ray3d),
    PointerMove(Ray3d),
    PointerUp(Ray3d),
}

/// Pointer-driven grab state shared by the pointer commands.
#[derive(Resource, Debug, Default)]
pub struct PointerGrab(pub Grabber);

/// Number of fixed ticks between two stats log lines. Zero disables logging.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsLogInterval(pub u64);

pub struct TankSimulationPlugin {
    pub stats_interval: u64,
}

impl Default for TankSimulationPlugin {
    fn default() -> Self {
        Self {
            stats_interval: crate::TICKS_PER_SECOND * 5,
        }
    }
}

impl Plugin for TankSimulationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SimulationCommand>()
            .init_resource::<PointerGrab>()
            .insert_resource(StatsLogInterval(self.stats_interval))
            .configure_sets(
                FixedUpdate,
                (SimFixedUpdateSet::Physics, SimFixedUpdateSet::Diagnostics).chain(),
            )
            .add_systems(
                Update,
                apply_simulation_commands
                    .in_set(SimUpdateSet::Commands)
                    .run_if(resource_exists::<TankSimulation>),
            )
            .add_systems(
                FixedUpdate,
                step_simulation
                    .in_set(SimFixedUpdateSet::Physics)
                    .run_if(resource_exists::<TankSimulation>),
            )
            .add_systems(
                FixedUpdate,
                log_simulation_stats
                    .in_set(SimFixedUpdateSet::Diagnostics)
                    .run_if(resource_exists::<TankSimulation>),
            );
    }
}

fn step_simulation(mut simulation: ResMut<TankSimulation>, time: Res<Time<Fixed>>) {
    simulation.tick(time.delta_secs());
}

fn log_simulation_stats(simulation: Res<TankSimulation>, interval: Res<StatsLogInterval>) {
    let tick = simulation.tick_count();
    if interval.0 == 0 || tick == 0 || tick % interval.0 != 0 || simulation.is_paused() {
        return;
    }

    let stats = simulation.stats();
    info!(
        "tick {}: water volume {:.4}, height {:.4}..{:.4}, {} of {} balls in water",
        stats.tick,
        stats.water_volume,
        stats.min_height,
        stats.max_height,
        stats.submerged_balls,
        simulation.balls().len()
    );
    debug!(
        "tick {}: wave energy {:.5}, ball kinetic energy {:.5}, contacts {}",
        stats.tick, stats.wave_energy, stats.ball_kinetic_energy, stats.contacts_last_tick
    );
}

fn apply_simulation_commands(
    mut commands: EventReader<SimulationCommand>,
    mut simulation: ResMut<TankSimulation>,
    mut pointer: ResMut<PointerGrab>,
    time: Res<Time>,
) {
    for command in commands.read() {
        let result = match *command {
            SimulationCommand::Pause => {
                simulation.set_paused(true);
                Ok(())
            }
            SimulationCommand::Resume => {
                simulation.set_paused(false);
                Ok(())
            }
            SimulationCommand::TogglePause => {
                let paused = simulation.is_paused();
                simulation.set_paused(!paused);
                Ok(())
            }
            SimulationCommand::Grab { index, position } => simulation.grab_ball(index, position),
            SimulationCommand::MoveGrabbed { index, position } => {
                simulation.move_grabbed_ball(index, position)
            }
            SimulationCommand::Release {
                index,
                position,
                velocity,
            } => simulation.release_ball(index, position, velocity),
            SimulationCommand::PointerDown(ray) => {
                pointer.0.start(simulation.balls_mut(), &ray);
                Ok(())
            }
            SimulationCommand::PointerMove(ray) => {
                pointer.0.drag(simulation.balls_mut(), &ray);
                Ok(())
            }
            SimulationCommand::PointerUp(ray) => {
                pointer
                    .0
                    .release(simulation.balls_mut(), &ray, time.delta_secs());
                Ok(())
            }
        };

        if let Err(error) = result {
            warn!("Ignoring simulation command {:?}: {}", command, error);
        }
    }
}
