//! Index-buffer mesh container shared by all generators.

use glam::Vec3;

use crate::GeometryError;

/// Positions, matching unit normals, and a `u32` triangle index list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions {
            min = min.min(*p);
            max = max.max(*p);
        }
        Some((min, max))
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Move the mesh so its bounding-box midpoint sits at the origin.
    /// Returns the translation that was applied.
    pub fn center(&mut self) -> Vec3 {
        let Some((min, max)) = self.bounds() else {
            return Vec3::ZERO;
        };
        let offset = -(min + max) * 0.5;
        self.translate(offset);
        offset
    }

    /// Append a vertex, returning its index.
    pub(crate) fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        index
    }

    /// Check the structural invariants every generator promises.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.positions.len() != self.normals.len() {
            return Err(GeometryError::InvalidMesh(format!(
                "{} positions vs {} normals",
                self.positions.len(),
                self.normals.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::InvalidMesh(format!(
                "index count {} is not a triangle list",
                self.indices.len()
            )));
        }
        let limit = self.positions.len() as u32;
        if let Some(&bad) = self.indices.iter().find(|&&i| i >= limit) {
            return Err(GeometryError::InvalidMesh(format!(
                "index {bad} out of range (vertex count {limit})"
            )));
        }
        for (i, n) in self.normals.iter().enumerate() {
            if (n.length_squared() - 1.0).abs() > 1e-3 {
                return Err(GeometryError::InvalidMesh(format!(
                    "normal {i} is not unit length: {n}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData {
            positions: vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(3.0, 0.0, 0.0),
                Vec3::new(3.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
            ],
            normals: vec![Vec3::Z; 4],
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn centering_moves_bbox_midpoint_to_origin() {
        let mut mesh = quad();
        let applied = mesh.center();
        assert_eq!(applied, Vec3::new(-2.0, -0.5, 0.0));
        let (min, max) = mesh.bounds().unwrap();
        assert!((min + max).length() < 1e-6);
    }

    #[test]
    fn validate_accepts_well_formed_mesh() {
        assert!(quad().validate().is_ok());
        assert_eq!(quad().triangle_count(), 2);
    }

    #[test]
    fn validate_rejects_out_of_range_index() {
        let mut mesh = quad();
        mesh.indices[3] = 9;
        assert!(matches!(
            mesh.validate(),
            Err(GeometryError::InvalidMesh(_))
        ));
    }

    #[test]
    fn validate_rejects_non_unit_normal() {
        let mut mesh = quad();
        mesh.normals[0] = Vec3::new(0.0, 0.0, 2.0);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn empty_mesh_has_no_bounds() {
        assert!(MeshData::default().bounds().is_none());
        let mut empty = MeshData::default();
        assert_eq!(empty.center(), Vec3::ZERO);
    }
}
