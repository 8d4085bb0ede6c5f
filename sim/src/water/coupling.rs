//! Two-way coupling between balls and the height field.
//!
//! Each tick the coupler measures how much of every water column is occupied
//! by balls, turns that occupancy into buoyancy and drag on the balls, and
//! feeds the change in occupancy since the previous tick back into the water
//! surface. That last step is the only way balls make waves.
//!
//! ## Tick order
//! 1. Accumulate submerged heights of all balls into the current buffer.
//! 2. Smooth the buffer.
//! 3. Apply buoyancy and drag, one force per ball per overlapping column.
//! 4. Push `coupling_strength * (current - previous)` into the surface.

use bevy::math::Vec3;
use bevy_log::debug;

use crate::config::CouplingParams;
use crate::constants::SUBMERGED_SMOOTHING_PASSES;
use crate::physics::BallBody;

use super::height_field::HeightField;

/// Vertical extent of a sphere slice that lies between the floor and the water surface.
///
/// The slice is the part of the sphere above a column at horizontal squared
/// distance `horizontal_distance_sq` from its center.
#[inline]
pub fn submerged_height_at_column(
    center_y: f32,
    radius: f32,
    horizontal_distance_sq: f32,
    water_height: f32,
) -> f32 {
    let half_extent = (radius * radius - horizontal_distance_sq).sqrt();
    let bottom = (center_y - half_extent).max(0.0);
    let top = (center_y + half_extent).min(water_height);
    (top - bottom).max(0.0)
}

/// Every column under the horizontal footprint of a sphere, with the
/// submerged height of the sphere at that column.
///
/// The column box is clamped to the grid, so a sphere partly (or entirely)
/// outside the field only reports the columns that exist.
pub fn submerged_columns(
    field: &HeightField,
    center: Vec3,
    radius: f32,
) -> impl Iterator<Item = (usize, f32)> + '_ {
    let inverse_spacing = 1.0 / field.column_spacing();
    let grid_center = field.center_column();
    let max_x = field.num_columns_x() as i64 - 1;
    let max_z = field.num_columns_z() as i64 - 1;

    let to_column = |world: f32, grid_center: i32| -> i64 {
        grid_center as i64 + (world * inverse_spacing).floor() as i64
    };

    let min_column_x = to_column(center.x - radius, grid_center.x).max(0);
    let max_column_x = to_column(center.x + radius, grid_center.x).min(max_x);
    let min_column_z = to_column(center.z - radius, grid_center.y).max(0);
    let max_column_z = to_column(center.z + radius, grid_center.y).min(max_z);
    let radius_sq = radius * radius;

    (min_column_x..=max_column_x).flat_map(move |x| {
        (min_column_z..=max_column_z).filter_map(move |z| {
            let (x, z) = (x as usize, z as usize);
            let (world_x, world_z) = field.column_world_xz(x, z);
            let dx = center.x - world_x;
            let dz = center.z - world_z;
            let distance_sq = dx * dx + dz * dz;

            if distance_sq >= radius_sq {
                return None;
            }

            let index = field.column_index(x, z);
            let submerged =
                submerged_height_at_column(center.y, radius, distance_sq, field.height(index));
            Some((index, submerged))
        })
    })
}

/// Owns the per-column submerged-height buffers and runs the coupling passes.
#[derive(Debug, Clone)]
pub struct Coupler {
    params: CouplingParams,
    current: Vec<f32>,
    previous: Vec<f32>,
}

impl Coupler {
    pub fn new(params: CouplingParams, total_columns: usize) -> Self {
        Self {
            params,
            current: vec![0.0; total_columns],
            previous: vec![0.0; total_columns],
        }
    }

    pub fn params(&self) -> &CouplingParams {
        &self.params
    }

    /// Smoothed submerged heights of the latest tick.
    pub fn submerged_heights(&self) -> &[f32] {
        &self.current
    }

    /// Submerged heights of the tick before.
    pub fn previous_submerged_heights(&self) -> &[f32] {
        &self.previous
    }

    /// Runs all four coupling passes for one tick.
    pub fn step(
        &mut self,
        field: &mut HeightField,
        balls: &mut [BallBody],
        gravity: Vec3,
        dt: f32,
    ) {
        self.accumulate_submerged_heights(field, balls);
        self.smooth_submerged_heights(field.num_columns_x(), field.num_columns_z());
        self.apply_buoyancy(field, balls, gravity, dt);
        self.push_displacement(field);
    }

    /// Rolls the buffers and sums every ball's submerged height per column.
    pub fn accumulate_submerged_heights(&mut self, field: &HeightField, balls: &[BallBody]) {
        debug_assert_eq!(self.current.len(), field.total_columns());

        self.previous.copy_from_slice(&self.current);
        self.current.fill(0.0);

        for ball in balls {
            let radius = self.params.effective_radius(ball.radius());
            for (index, submerged) in submerged_columns(field, ball.position, radius) {
                self.current[index] += submerged;
            }
        }
    }

    /// Replaces each column with the average of its existing 4-neighbors.
    ///
    /// Updates happen in place, so later columns read already-smoothed values.
    pub fn smooth_submerged_heights(&mut self, num_columns_x: usize, num_columns_z: usize) {
        let nz = num_columns_z;
        for _ in 0..SUBMERGED_SMOOTHING_PASSES {
            for x in 0..num_columns_x {
                for z in 0..nz {
                    let index = x * nz + z;
                    let mut sum = 0.0;
                    let mut count = 0u32;

                    if x > 0 {
                        sum += self.current[index - nz];
                        count += 1;
                    }
                    if x + 1 < num_columns_x {
                        sum += self.current[index + nz];
                        count += 1;
                    }
                    if z > 0 {
                        sum += self.current[index - 1];
                        count += 1;
                    }
                    if z + 1 < nz {
                        sum += self.current[index + 1];
                        count += 1;
                    }

                    if count > 0 {
                        self.current[index] = sum / count as f32;
                    }
                }
            }
        }
    }

    /// Pushes every ball up by the weight of the water it displaces, column by column.
    pub fn apply_buoyancy(
        &self,
        field: &HeightField,
        balls: &mut [BallBody],
        gravity: Vec3,
        dt: f32,
    ) {
        let column_area = field.column_spacing() * field.column_spacing();

        for ball in balls.iter_mut() {
            let radius = self.params.effective_radius(ball.radius());
            let area_scale = self.params.area_scale(ball.radius());
            let center = ball.position;
            let mut contributing = 0usize;

            for (_, submerged) in submerged_columns(field, center, radius) {
                if submerged <= 0.0 {
                    continue;
                }
                contributing += 1;

                let displaced_volume = submerged * column_area * area_scale;
                let buoyancy = -displaced_volume * gravity.y;
                ball.apply_force(buoyancy, dt);

                if self.params.enable_drag {
                    let drag = -ball.velocity * self.params.drag_coefficient * displaced_volume;
                    ball.position += drag * dt * dt * 0.5;
                }
            }

            if contributing > 0 {
                debug!(
                    "Ball at {:?} displaced water in {} columns",
                    center, contributing
                );
            }
        }
    }

    /// Feeds the change in ball occupancy into the water surface.
    pub fn push_displacement(&self, field: &mut HeightField) {
        let strength = field.coupling_strength();
        for (index, (current, previous)) in self.current.iter().zip(&self.previous).enumerate() {
            field.add_height_delta(index, strength * (current - previous));
        }
    }
}
