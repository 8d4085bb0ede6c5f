//! Height-field water surface and its coupling to balls.
//!
//! ## Parts
//! - [`HeightField`]: column grid advanced by a damped wave equation
//! - [`Coupler`]: submerged-height buffers, buoyancy, drag and surface feedback
//! - [`SurfaceMesh`]: render-ready vertex, index and UV data

pub mod coupling;
pub mod height_field;
pub mod surface_mesh;

pub use coupling::{submerged_columns, submerged_height_at_column, Coupler};
pub use height_field::HeightField;
pub use surface_mesh::SurfaceMesh;
