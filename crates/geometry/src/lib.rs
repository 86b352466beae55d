//! Mesh generation for the marquee scene.
//!
//! Produces index-buffer meshes with positions and unit normals only; matcap
//! shading needs nothing else. Two generators matter here: [`torus`] for the
//! scattered donuts and [`extrude_text`] for the beveled headline.
//!
//! # Invariants
//! - `indices.len()` is a multiple of 3 and every index is in range.
//! - Normals are unit length.
//! - Triangles wind counterclockwise seen from outside the solid.

pub mod mesh;
pub mod text;
pub mod torus;

pub use mesh::MeshData;
pub use text::{extrude_text, Bevel, TextStyle};
pub use torus::torus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("text {text:?} produced no geometry")]
    EmptyText { text: String },
    #[error("cap tessellation failed: {0}")]
    Tessellation(String),
    #[error("malformed mesh: {0}")]
    InvalidMesh(String),
}
