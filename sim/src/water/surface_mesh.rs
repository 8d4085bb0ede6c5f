//! Triangle mesh data for the water surface.
//!
//! The mesh is a regular grid with one vertex per column. Indices and UVs
//! only depend on the grid dimensions, so they are built once; positions are
//! refreshed from the height field every frame.

use bevy::math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::height_field::HeightField;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    /// Triangle list, counter-clockwise when seen from above
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    pub fn from_height_field(field: &HeightField) -> Self {
        let nx = field.num_columns_x();
        let nz = field.num_columns_z();

        let mut mesh = Self {
            positions: Vec::with_capacity(field.total_columns()),
            uvs: Vec::with_capacity(field.total_columns()),
            indices: grid_indices(nx, nz),
        };

        for x in 0..nx {
            for z in 0..nz {
                mesh.uvs
                    .push(Vec2::new(x as f32 / nx as f32, z as f32 / nz as f32));
            }
        }
        mesh.update_positions(field);
        mesh
    }

    /// Copies the current column heights into the vertex positions.
    pub fn update_positions(&mut self, field: &HeightField) {
        self.positions.clear();
        self.positions
            .extend((0..field.total_columns()).map(|i| field.column_world_position(i)));
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Two triangles per grid cell, `(bl, br, tr)` and `(bl, tr, tl)`.
fn grid_indices(nx: usize, nz: usize) -> Vec<u32> {
    if nx < 2 || nz < 2 {
        return Vec::new();
    }

    let mut indices = Vec::with_capacity((nx - 1) * (nz - 1) * 6);
    for x in 0..nx - 1 {
        for z in 0..nz - 1 {
            let bottom_left = (x * nz + z) as u32;
            let bottom_right = (x * nz + z + 1) as u32;
            let top_right = ((x + 1) * nz + z + 1) as u32;
            let top_left = ((x + 1) * nz + z) as u32;

            indices.extend_from_slice(&[bottom_left, bottom_right, top_right]);
            indices.extend_from_slice(&[bottom_left, top_right, top_left]);
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveParams;

    #[test]
    fn test_mesh_layout() {
        let field = HeightField::with_columns(3, 4, 0.5, 1.0, &WaveParams::default()).unwrap();
        let mesh = SurfaceMesh::from_height_field(&field);

        assert_eq!(mesh.positions.len(), 12);
        assert_eq!(mesh.uvs.len(), 12);
        assert_eq!(mesh.triangle_count(), 2 * 3 * 2);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < 12));
        assert_eq!(&mesh.indices[..6], &[0, 1, 5, 0, 5, 4]);
        assert_eq!(mesh.uvs[5], Vec2::new(1.0 / 3.0, 0.25));
    }

    #[test]
    fn test_triangles_face_up() {
        let field = HeightField::with_columns(3, 3, 1.0, 1.0, &WaveParams::default()).unwrap();
        let mesh = SurfaceMesh::from_height_field(&field);

        for triangle in mesh.indices.chunks_exact(3) {
            let a = mesh.positions[triangle[0] as usize];
            let b = mesh.positions[triangle[1] as usize];
            let c = mesh.positions[triangle[2] as usize];
            let normal = (b - a).cross(c - a);
            assert!(normal.y > 0.0, "triangle {:?} normal {:?}", triangle, normal);
        }
    }

    #[test]
    fn test_positions_follow_heights() {
        let mut field = HeightField::with_columns(3, 3, 1.0, 1.0, &WaveParams::default()).unwrap();
        let mut mesh = SurfaceMesh::from_height_field(&field);

        field.set_height(4, 1.5);
        mesh.update_positions(&field);

        assert_eq!(mesh.positions[4], Vec3::new(0.0, 1.5, 0.0));
        assert_eq!(mesh.positions[0], Vec3::new(-1.0, 1.0, -1.0));
    }

    #[test]
    fn test_degenerate_grid_has_no_triangles() {
        let field = HeightField::with_columns(1, 5, 1.0, 1.0, &WaveParams::default()).unwrap();
        let mesh = SurfaceMesh::from_height_field(&field);
        assert_eq!(mesh.triangle_count(), 0);
        assert_eq!(mesh.positions.len(), 5);
    }
}
