//! The tank aggregate: water, balls and the per-tick driver.
//!
//! ## Tick order
//! 1. Coupler: submerged heights, buoyancy and drag, surface feedback
//! 2. Wave step of the height field
//! 3. Ball integration and ball-ball contacts
//!
//! A paused simulation, or a tick with a non-positive `dt`, changes nothing.

use bevy::math::{Ray3d, Vec3};
use bevy_ecs::resource::Resource;
use bevy_log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::{SceneConfig, ScenePreset};
use crate::error::{ConfigError, SimulationError};
use crate::physics::{closest_hit, BallBody, CollisionResolver};
use crate::snapshot::{BallSnapshot, SimulationSnapshot, SurfaceSnapshot};
use crate::water::{Coupler, HeightField, SurfaceMesh};

/// Aggregated diagnostics for one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStats {
    pub tick: u64,
    pub water_volume: f32,
    /// Sum of squared column velocities
    pub wave_energy: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub ball_kinetic_energy: f32,
    /// Balls with any part below the local water surface
    pub submerged_balls: usize,
    pub contacts_last_tick: usize,
}

#[derive(Resource, Debug, Clone)]
pub struct TankSimulation {
    config: SceneConfig,
    height_field: HeightField,
    coupler: Coupler,
    balls: Vec<BallBody>,
    resolver: CollisionResolver,
    paused: bool,
    tick_count: u64,
    contacts_last_tick: usize,
}

impl TankSimulation {
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let height_field = HeightField::new(
            config.tank.size.x,
            config.tank.size.z,
            config.water_depth,
            config.column_spacing,
            &config.waves,
        )?;
        let coupler = Coupler::new(config.coupling, height_field.total_columns());
        let balls = config
            .balls
            .iter()
            .map(BallBody::from_spec)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            "Tank simulation created: {}x{} columns, {} balls",
            height_field.num_columns_x(),
            height_field.num_columns_z(),
            balls.len()
        );

        Ok(Self {
            resolver: CollisionResolver::new(config.collision_mode),
            config,
            height_field,
            coupler,
            balls,
            paused: false,
            tick_count: 0,
            contacts_last_tick: 0,
        })
    }

    pub fn from_preset(preset: ScenePreset) -> Result<Self, ConfigError> {
        Self::new(preset.to_config())
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn height_field(&self) -> &HeightField {
        &self.height_field
    }

    pub fn height_field_mut(&mut self) -> &mut HeightField {
        &mut self.height_field
    }

    pub fn coupler(&self) -> &Coupler {
        &self.coupler
    }

    pub fn balls(&self) -> &[BallBody] {
        &self.balls
    }

    pub fn balls_mut(&mut self) -> &mut [BallBody] {
        &mut self.balls
    }

    pub fn ball(&self, index: usize) -> Result<&BallBody, SimulationError> {
        let count = self.balls.len();
        self.balls
            .get(index)
            .ok_or(SimulationError::UnknownBall { index, count })
    }

    fn ball_mut(&mut self, index: usize) -> Result<&mut BallBody, SimulationError> {
        let count = self.balls.len();
        self.balls
            .get_mut(index)
            .ok_or(SimulationError::UnknownBall { index, count })
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            debug!("Simulation {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
    }

    /// Advances the whole tank by `dt`. Returns `false` when nothing happened.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.paused || dt <= 0.0 {
            return false;
        }

        let gravity = self.config.gravity;

        self.coupler
            .step(&mut self.height_field, &mut self.balls, gravity, dt);
        self.height_field.step(dt);
        self.contacts_last_tick =
            self.resolver
                .integrate_and_resolve(&mut self.balls, dt, gravity, &self.config.tank);

        self.tick_count += 1;
        true
    }

    pub fn grab_ball(&mut self, index: usize, position: Vec3) -> Result<(), SimulationError> {
        self.ball_mut(index)?.start_grab(position);
        Ok(())
    }

    pub fn move_grabbed_ball(&mut self, index: usize, position: Vec3) -> Result<(), SimulationError> {
        let ball = self.ball_mut(index)?;
        if !ball.is_grabbed() {
            return Err(SimulationError::NotGrabbed { index });
        }
        ball.move_grabbed(position);
        Ok(())
    }

    pub fn release_ball(
        &mut self,
        index: usize,
        position: Vec3,
        velocity: Vec3,
    ) -> Result<(), SimulationError> {
        let ball = self.ball_mut(index)?;
        if !ball.is_grabbed() {
            return Err(SimulationError::NotGrabbed { index });
        }
        ball.end_grab(position, velocity);
        Ok(())
    }

    /// Closest ball hit by `ray`, with the hit distance.
    pub fn pick(&self, ray: &Ray3d) -> Option<(usize, f32)> {
        closest_hit(&self.balls, ray)
    }

    /// Surface height at the column closest to world `(x, z)`, clamped to the grid.
    pub fn water_height_at(&self, x: f32, z: f32) -> f32 {
        let field = &self.height_field;
        let center = field.center_column();
        let inverse_spacing = 1.0 / field.column_spacing();
        let column = |world: f32, center: i32, count: usize| -> usize {
            let offset = (world * inverse_spacing).round() as i64;
            (center as i64 + offset).clamp(0, count as i64 - 1) as usize
        };

        let column_x = column(x, center.x, field.num_columns_x());
        let column_z = column(z, center.y, field.num_columns_z());
        field.height(field.column_index(column_x, column_z))
    }

    pub fn stats(&self) -> SimulationStats {
        let (min_height, max_height) = self.height_field.height_range().unwrap_or_default();
        let submerged_balls = self
            .balls
            .iter()
            .filter(|ball| {
                ball.position.y - ball.radius()
                    < self.water_height_at(ball.position.x, ball.position.z)
            })
            .count();

        SimulationStats {
            tick: self.tick_count,
            water_volume: self.height_field.total_volume(),
            wave_energy: self.height_field.kinetic_energy(),
            min_height,
            max_height,
            ball_kinetic_energy: self.balls.iter().map(BallBody::kinetic_energy).sum(),
            submerged_balls,
            contacts_last_tick: self.contacts_last_tick,
        }
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            tick: self.tick_count,
            surface: SurfaceSnapshot::from(&self.height_field),
            balls: self.balls.iter().map(BallSnapshot::from).collect(),
        }
    }

    pub fn surface_mesh(&self) -> SurfaceMesh {
        SurfaceMesh::from_height_field(&self.height_field)
    }
}
