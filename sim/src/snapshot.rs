//! Serializable view of a simulation, for renderers and saved runs.

use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::water::HeightField;
use crate::physics::BallBody;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    pub num_columns_x: usize,
    pub num_columns_z: usize,
    pub column_spacing: f32,
    /// Column heights, x-major
    pub heights: Vec<f32>,
}

impl From<&HeightField> for SurfaceSnapshot {
    fn from(field: &HeightField) -> Self {
        Self {
            num_columns_x: field.num_columns_x(),
            num_columns_z: field.num_columns_z(),
            column_spacing: field.column_spacing(),
            heights: field.heights().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallSnapshot {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    pub is_grabbed: bool,
    pub material: String,
}

impl From<&BallBody> for BallSnapshot {
    fn from(ball: &BallBody) -> Self {
        Self {
            position: ball.position,
            velocity: ball.velocity,
            radius: ball.radius(),
            is_grabbed: ball.is_grabbed(),
            material: ball.material().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub tick: u64,
    pub surface: SurfaceSnapshot,
    pub balls: Vec<BallSnapshot>,
}
