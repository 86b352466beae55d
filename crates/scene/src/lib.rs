//! Scene assembly.
//!
//! A marquee scene is one extruded headline mesh plus a cloud of donut
//! (torus) meshes scattered deterministically from a seed, and exactly two
//! shared materials: one for the text, one for every donut. The panel
//! mutates the materials in place; everything else is immutable after
//! [`Scene::build`].
//!
//! # Invariants
//! - The same `SceneConfig` always builds the same scene, bit for bit.
//! - Donut transforms never change after build.
//! - Donut positions lie in (-5, 5) per axis, scales in [0, 1).

mod material;
mod scene;

pub use material::{MatcapMaterial, Materials};
pub use scene::{
    scatter_donuts, Scene, SceneConfig, SceneStats, DONUT_RADIAL_SEGMENTS, DONUT_RADIUS,
    DONUT_TUBE, DONUT_TUBULAR_SEGMENTS,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Geometry(#[from] marquee_geometry::GeometryError),
}
