//! Error types for scene construction and out-of-band commands.

/// A scene description that cannot be turned into a stable simulation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("column spacing must be positive and finite, got {spacing}")]
    InvalidSpacing { spacing: f32 },

    #[error("tank size must be positive and finite on every axis, got {size:?}")]
    InvalidTankSize { size: [f32; 3] },

    #[error("water surface size must be positive and finite, got {size_x} x {size_z}")]
    InvalidSurfaceSize { size_x: f32, size_z: f32 },

    #[error("column grid of {columns_x} x {columns_z} exceeds the column limit")]
    GridTooLarge { columns_x: u64, columns_z: u64 },

    #[error("tank border must be non-negative and finite, got {border}")]
    InvalidBorder { border: f32 },

    #[error("water depth must be non-negative and finite, got {depth}")]
    InvalidWaterDepth { depth: f32 },

    #[error("ball radius must be positive and finite, got {radius}")]
    InvalidRadius { radius: f32 },

    #[error("ball density must be positive and finite, got {density}")]
    InvalidDensity { density: f32 },

    #[error("max influence radius must be positive and finite, got {radius}")]
    InvalidInfluenceRadius { radius: f32 },

    #[error("wave parameter {name} must be non-negative and finite, got {value}")]
    InvalidWaveParameter { name: &'static str, value: f32 },
}

/// A runtime command that refers to state the simulation does not have.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("no ball with index {index} (simulation has {count} balls)")]
    UnknownBall { index: usize, count: usize },

    #[error("ball {index} is not grabbed")]
    NotGrabbed { index: usize },
}
