//! Height-field water tank with buoyant spheres.
//!
//! A grid of water columns evolves under a damped wave equation while rigid
//! balls fall into it, float or sink, bump into each other and stir the
//! surface. [`TankSimulation`] owns the whole state; [`TankSimulationPlugin`]
//! drives it from a Bevy app.

pub mod config;
pub mod constants;
pub mod error;
pub mod physics;
pub mod plugin;
pub mod sets;
pub mod simulation;
pub mod snapshot;
pub mod water;

pub use config::{
    BallSpec, CollisionMode, CouplingParams, SceneConfig, ScenePreset, TankConfig, WaveParams,
};
pub use constants::*;
pub use error::{ConfigError, SimulationError};
pub use plugin::{PointerGrab, SimulationCommand, StatsLogInterval, TankSimulationPlugin};
pub use simulation::{SimulationStats, TankSimulation};
pub use snapshot::{BallSnapshot, SimulationSnapshot, SurfaceSnapshot};
