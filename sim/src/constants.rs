use bevy::prelude::*;

pub const TICKS_PER_SECOND: u64 = 50;
pub const DEFAULT_GRAVITY: Vec3 = Vec3 {
    x: 0.0,
    y: -10.0,
    z: 0.0,
};

/// Velocity scale applied by every buoyancy force application.
pub const FORCE_VELOCITY_DAMPING: f32 = 0.999;
pub const DEFAULT_RESTITUTION: f32 = 0.1;
pub const SUBMERGED_SMOOTHING_PASSES: usize = 2;

/// Separations shorter than this are treated as coincident centers.
pub const MIN_SEPARATION: f32 = 1e-6;

pub const DEFAULT_WAVE_SPEED: f32 = 2.0;
pub const DEFAULT_POSITIONAL_DAMPING: f32 = 1.0;
pub const DEFAULT_VELOCITY_DAMPING: f32 = 0.3;
pub const DEFAULT_COUPLING_STRENGTH: f32 = 0.5;
pub const DEFAULT_MAX_INFLUENCE_RADIUS: f32 = 0.6;
pub const DEFAULT_DRAG_COEFFICIENT: f32 = 2.0;

pub const DEFAULT_TANK_SIZE: Vec3 = Vec3 {
    x: 6.0,
    y: 1.25,
    z: 8.0,
};
pub const DEFAULT_TANK_BORDER: f32 = 0.01;
pub const DEFAULT_WATER_DEPTH: f32 = 0.8;
pub const DEFAULT_COLUMN_SPACING: f32 = 0.03;

/// Upper bound on the number of columns in one height field.
pub const MAX_GRID_COLUMNS: usize = 1 << 24;
