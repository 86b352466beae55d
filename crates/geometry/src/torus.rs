//! Torus generation.

use std::f32::consts::TAU;

use glam::Vec3;

use crate::MeshData;

/// Indexed torus around the z axis: `radius` from the center to the middle
/// of the tube, `tube` the tube's own radius. Normals are analytic, so they
/// are exactly unit length. The seam rows are duplicated, which keeps the
/// index math regular.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let stride = tubular_segments + 1;

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        let (sv, cv) = v.sin_cos();
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;
            let (su, cu) = u.sin_cos();
            let ring = radius + tube * cv;
            let position = Vec3::new(ring * cu, ring * su, tube * sv);
            let center = Vec3::new(radius * cu, radius * su, 0.0);
            mesh.positions.push(position);
            mesh.normals.push((position - center) / tube);
        }
    }

    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = stride * j + i - 1;
            let b = stride * (j - 1) + i - 1;
            let c = stride * (j - 1) + i;
            let d = stride * j + i;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    mesh
}
