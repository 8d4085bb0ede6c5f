//! Construction-time scene configuration.
//!
//! A [`SceneConfig`] fully describes a tank: its walls, the water grid, the
//! wave constants, the ball coupling constants and the balls themselves.
//! Nothing in it changes once a [`crate::TankSimulation`] has been built from it.
//!
//! Every struct is serializable so a scene can live in a RON file and be
//! shared between runs.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;

/// Wave propagation constants of the height field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    /// Requested propagation speed; clamped per step for stability
    pub wave_speed: f32,
    /// Rate of the relaxation toward the neighbor average
    pub positional_damping: f32,
    /// Rate at which column velocities decay
    pub velocity_damping: f32,
    /// Fraction of a ball's submerged-height change pushed into the surface
    pub coupling_strength: f32,
}

impl WaveParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("wave_speed", self.wave_speed),
            ("positional_damping", self.positional_damping),
            ("velocity_damping", self.velocity_damping),
            ("coupling_strength", self.coupling_strength),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidWaveParameter { name, value });
            }
        }
        Ok(())
    }
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wave_speed: DEFAULT_WAVE_SPEED,
            positional_damping: DEFAULT_POSITIONAL_DAMPING,
            velocity_damping: DEFAULT_VELOCITY_DAMPING,
            coupling_strength: DEFAULT_COUPLING_STRENGTH,
        }
    }
}

/// How balls exchange forces with the water.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CouplingParams {
    /// Limit the footprint of large balls to `max_influence_radius`
    pub enable_radius_clamping: bool,
    pub max_influence_radius: f32,
    pub enable_drag: bool,
    pub drag_coefficient: f32,
}

impl CouplingParams {
    /// Radius used for the submerged-volume query of a ball.
    #[inline]
    pub fn effective_radius(&self, radius: f32) -> f32 {
        if self.enable_radius_clamping {
            radius.min(self.max_influence_radius)
        } else {
            radius
        }
    }

    /// Scale that compensates a clamped footprint so the force matches the full ball.
    #[inline]
    pub fn area_scale(&self, radius: f32) -> f32 {
        if self.enable_radius_clamping && radius > self.max_influence_radius {
            (radius * radius) / (self.max_influence_radius * self.max_influence_radius)
        } else {
            1.0
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enable_radius_clamping
            && (!self.max_influence_radius.is_finite() || self.max_influence_radius <= 0.0)
        {
            return Err(ConfigError::InvalidInfluenceRadius {
                radius: self.max_influence_radius,
            });
        }
        if !self.drag_coefficient.is_finite() || self.drag_coefficient < 0.0 {
            return Err(ConfigError::InvalidWaveParameter {
                name: "drag_coefficient",
                value: self.drag_coefficient,
            });
        }
        Ok(())
    }
}

impl Default for CouplingParams {
    fn default() -> Self {
        Self {
            enable_radius_clamping: true,
            max_influence_radius: DEFAULT_MAX_INFLUENCE_RADIUS,
            enable_drag: true,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
        }
    }
}

/// The open-topped box holding the water.
///
/// The tank is centered on the world origin in X/Z and its floor sits at `y = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    /// Extents (X, Y, Z)
    pub size: Vec3,
    /// Wall thickness
    pub border: f32,
}

impl TankConfig {
    /// Largest |x| and |z| the center of a ball of `radius` may reach.
    #[inline]
    pub fn wall_limits(&self, radius: f32) -> (f32, f32) {
        (
            0.5 * self.size.x - radius - 0.5 * self.border,
            0.5 * self.size.z - radius - 0.5 * self.border,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.size.is_finite() || self.size.min_element() <= 0.0 {
            return Err(ConfigError::InvalidTankSize {
                size: self.size.to_array(),
            });
        }
        if !self.border.is_finite() || self.border < 0.0 {
            return Err(ConfigError::InvalidBorder {
                border: self.border,
            });
        }
        Ok(())
    }
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_TANK_SIZE,
            border: DEFAULT_TANK_BORDER,
        }
    }
}

/// Initial state of one ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallSpec {
    pub position: Vec3,
    pub radius: f32,
    pub density: f32,
    pub restitution: f32,
    /// Opaque identity handed to renderers
    pub material: String,
}

impl BallSpec {
    pub fn new(position: Vec3, radius: f32, density: f32, material: impl Into<String>) -> Self {
        Self {
            position,
            radius,
            density,
            restitution: DEFAULT_RESTITUTION,
            material: material.into(),
        }
    }
}

impl Default for BallSpec {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.0, 0.0), 0.25, 1.0, "default")
    }
}

/// Order in which ball pairs are resolved each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionMode {
    /// Ball `i` is integrated, then pushed against the already-updated balls
    /// `0..i`; the restitution of ball `i` governs each pair.
    #[default]
    Sequential,
    /// All balls are integrated first, then every pair is resolved once with
    /// the mean restitution of both balls.
    Symmetric,
}

/// Complete description of a tank scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub gravity: Vec3,
    pub tank: TankConfig,
    /// Rest height of the water surface
    pub water_depth: f32,
    pub column_spacing: f32,
    pub waves: WaveParams,
    pub coupling: CouplingParams,
    pub collision_mode: CollisionMode,
    pub balls: Vec<BallSpec>,
}

impl SceneConfig {
    /// Checks every construction-time parameter.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.column_spacing.is_finite() || self.column_spacing <= 0.0 {
            return Err(ConfigError::InvalidSpacing {
                spacing: self.column_spacing,
            });
        }
        if !self.water_depth.is_finite() || self.water_depth < 0.0 {
            return Err(ConfigError::InvalidWaterDepth {
                depth: self.water_depth,
            });
        }
        self.tank.validate()?;
        self.waves.validate()?;
        self.coupling.validate()?;
        for ball in &self.balls {
            validate_ball(ball.radius, ball.density)?;
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        ScenePreset::default().to_config()
    }
}

pub(crate) fn validate_ball(radius: f32, density: f32) -> Result<(), ConfigError> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(ConfigError::InvalidRadius { radius });
    }
    if !density.is_finite() || density <= 0.0 {
        return Err(ConfigError::InvalidDensity { density });
    }
    Ok(())
}

/// Ready-made scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ScenePreset {
    /// Three balls of decreasing density dropped into the default tank
    #[default]
    ThreeBalls,
    /// One light ball dropped in the middle of the tank
    SingleBall,
    /// Water only
    Empty,
}

impl ScenePreset {
    pub fn to_config(self) -> SceneConfig {
        let mut config = SceneConfig {
            gravity: DEFAULT_GRAVITY,
            tank: TankConfig::default(),
            water_depth: DEFAULT_WATER_DEPTH,
            column_spacing: DEFAULT_COLUMN_SPACING,
            waves: WaveParams::default(),
            coupling: CouplingParams::default(),
            collision_mode: CollisionMode::default(),
            balls: Vec::new(),
        };

        match self {
            ScenePreset::Empty => {}
            ScenePreset::SingleBall => {
                config
                    .balls
                    .push(BallSpec::new(Vec3::new(0.0, 1.0, 0.0), 0.3, 0.5, "white"));
            }
            ScenePreset::ThreeBalls => {
                config.balls.extend([
                    BallSpec::new(Vec3::new(-0.5, 1.0, -0.5), 0.20, 2.0, "gray"),
                    BallSpec::new(Vec3::new(0.5, 1.0, -0.5), 0.30, 0.7, "white"),
                    BallSpec::new(Vec3::new(0.5, 1.0, 0.5), 0.25, 0.2, "green"),
                ]);
            }
        }

        config
    }
}
