//! Column height field with a damped wave equation.
//!
//! The surface is a regular grid of water columns. Each column stores a
//! height and a vertical velocity; neighboring columns pull on each other
//! through a discrete Laplacian, and a relaxation term smooths the surface
//! toward the local neighbor average every step.
//!
//! ## Layout
//! Columns are stored x-major: `index = x * num_columns_z + z`. The grid is
//! centered on the world origin, column `(x, z)` sitting at
//! `((x - center_x) * spacing, height, (z - center_z) * spacing)`.
//!
//! ## Boundaries
//! Edges are reflective: a neighbor that falls outside the grid is replaced
//! by the column's own height.

use bevy::math::{IVec2, Vec3};

use crate::config::WaveParams;
use crate::constants::MAX_GRID_COLUMNS;
use crate::error::ConfigError;

#[derive(Debug, Clone)]
pub struct HeightField {
    num_columns_x: usize,
    num_columns_z: usize,
    column_spacing: f32,
    heights: Vec<f32>,
    velocities: Vec<f32>,
    wave_speed: f32,
    positional_damping: f32,
    velocity_damping: f32,
    coupling_strength: f32,
}

impl HeightField {
    /// Creates a field covering `size_x` by `size_z` world units.
    ///
    /// Each axis gets `floor(size / spacing) + 1` columns, all at `initial_depth`.
    pub fn new(
        size_x: f32,
        size_z: f32,
        initial_depth: f32,
        column_spacing: f32,
        params: &WaveParams,
    ) -> Result<Self, ConfigError> {
        validate_spacing(column_spacing)?;
        if !size_x.is_finite() || !size_z.is_finite() || size_x <= 0.0 || size_z <= 0.0 {
            return Err(ConfigError::InvalidSurfaceSize { size_x, size_z });
        }

        let columns_x = (size_x as f64 / column_spacing as f64).floor() + 1.0;
        let columns_z = (size_z as f64 / column_spacing as f64).floor() + 1.0;
        if columns_x * columns_z > MAX_GRID_COLUMNS as f64 {
            // `as u64` saturates on absurd counts
            return Err(ConfigError::GridTooLarge {
                columns_x: columns_x as u64,
                columns_z: columns_z as u64,
            });
        }
        let num_columns_x = columns_x as usize;
        let num_columns_z = columns_z as usize;

        Self::with_columns(
            num_columns_x,
            num_columns_z,
            column_spacing,
            initial_depth,
            params,
        )
    }

    /// Creates a field with an explicit column count per axis.
    pub fn with_columns(
        num_columns_x: usize,
        num_columns_z: usize,
        column_spacing: f32,
        initial_depth: f32,
        params: &WaveParams,
    ) -> Result<Self, ConfigError> {
        validate_spacing(column_spacing)?;
        params.validate()?;
        if !initial_depth.is_finite() || initial_depth < 0.0 {
            return Err(ConfigError::InvalidWaterDepth {
                depth: initial_depth,
            });
        }

        let total = num_columns_x
            .checked_mul(num_columns_z)
            .filter(|&total| total <= MAX_GRID_COLUMNS)
            .ok_or(ConfigError::GridTooLarge {
                columns_x: num_columns_x as u64,
                columns_z: num_columns_z as u64,
            })?;

        Ok(Self {
            num_columns_x,
            num_columns_z,
            column_spacing,
            heights: vec![initial_depth; total],
            velocities: vec![0.0; total],
            wave_speed: params.wave_speed,
            positional_damping: params.positional_damping,
            velocity_damping: params.velocity_damping,
            coupling_strength: params.coupling_strength,
        })
    }

    #[inline]
    pub fn num_columns_x(&self) -> usize {
        self.num_columns_x
    }

    #[inline]
    pub fn num_columns_z(&self) -> usize {
        self.num_columns_z
    }

    #[inline]
    pub fn total_columns(&self) -> usize {
        self.heights.len()
    }

    #[inline]
    pub fn column_spacing(&self) -> f32 {
        self.column_spacing
    }

    /// Current (possibly stability-clamped) wave speed.
    #[inline]
    pub fn wave_speed(&self) -> f32 {
        self.wave_speed
    }

    #[inline]
    pub fn coupling_strength(&self) -> f32 {
        self.coupling_strength
    }

    /// Grid coordinates of the column closest to the world origin.
    #[inline]
    pub fn center_column(&self) -> IVec2 {
        IVec2::new((self.num_columns_x / 2) as i32, (self.num_columns_z / 2) as i32)
    }

    #[inline]
    pub fn column_index(&self, x: usize, z: usize) -> usize {
        x * self.num_columns_z + z
    }

    /// World X/Z of a column, ignoring its height.
    #[inline]
    pub fn column_world_xz(&self, x: usize, z: usize) -> (f32, f32) {
        let center = self.center_column();
        (
            (x as i32 - center.x) as f32 * self.column_spacing,
            (z as i32 - center.y) as f32 * self.column_spacing,
        )
    }

    /// World position of a column's surface point.
    pub fn column_world_position(&self, index: usize) -> Vec3 {
        let x = index / self.num_columns_z;
        let z = index % self.num_columns_z;
        let (world_x, world_z) = self.column_world_xz(x, z);
        Vec3::new(world_x, self.heights[index], world_z)
    }

    #[inline]
    pub fn height(&self, index: usize) -> f32 {
        self.heights[index]
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    pub fn set_height(&mut self, index: usize, height: f32) {
        self.heights[index] = height;
    }

    pub fn set_velocity(&mut self, index: usize, velocity: f32) {
        self.velocities[index] = velocity;
    }

    /// Raises (or lowers) a single column.
    #[inline]
    pub fn add_height_delta(&mut self, index: usize, delta: f32) {
        self.heights[index] += delta;
    }

    /// Advances the surface by one wave-propagation step.
    ///
    /// Heights are relaxed in place while sweeping the grid, so a column sees
    /// the already-relaxed heights of the neighbors visited before it.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }

        self.wave_speed = self.wave_speed.min(0.5 * self.column_spacing / dt);

        let wave_constant =
            (self.wave_speed * self.wave_speed) / (self.column_spacing * self.column_spacing);
        let positional_damping = (self.positional_damping * dt).clamp(0.0, 1.0);
        let velocity_damping = (1.0 - self.velocity_damping * dt).max(0.0);

        let nx = self.num_columns_x;
        let nz = self.num_columns_z;

        for x in 0..nx {
            for z in 0..nz {
                let index = x * nz + z;
                let height = self.heights[index];

                let mut neighbor_sum = 0.0;
                neighbor_sum += if x > 0 { self.heights[index - nz] } else { height };
                neighbor_sum += if x + 1 < nx { self.heights[index + nz] } else { height };
                neighbor_sum += if z > 0 { self.heights[index - 1] } else { height };
                neighbor_sum += if z + 1 < nz { self.heights[index + 1] } else { height };

                let acceleration = wave_constant * (neighbor_sum - 4.0 * height);
                self.velocities[index] += dt * acceleration;

                self.heights[index] += (0.25 * neighbor_sum - height) * positional_damping;
            }
        }

        for (height, velocity) in self.heights.iter_mut().zip(self.velocities.iter_mut()) {
            *velocity *= velocity_damping;
            *height += *velocity * dt;
        }
    }

    /// Water volume above the tank floor.
    pub fn total_volume(&self) -> f32 {
        let area = self.column_spacing * self.column_spacing;
        self.heights.iter().sum::<f32>() * area
    }

    /// Sum of squared column velocities.
    pub fn kinetic_energy(&self) -> f32 {
        self.velocities.iter().map(|v| v * v).sum()
    }

    /// Lowest and highest column, or `None` for an empty grid.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        let mut iter = self.heights.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }
}

fn validate_spacing(column_spacing: f32) -> Result<(), ConfigError> {
    if !column_spacing.is_finite() || column_spacing <= 0.0 {
        return Err(ConfigError::InvalidSpacing {
            spacing: column_spacing,
        });
    }
    Ok(())
}
