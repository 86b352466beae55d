//! wgpu backend: orbit camera, matcap pipelines, and the frame loop's draw
//! call.
//!
//! # Invariants
//!
//! - Mesh and instance buffers are uploaded once at startup and never
//!   rewritten; per-frame traffic is limited to the camera and tint uniforms.
//! - Every (material, matcap) combination has a bind group built ahead of
//!   time, so panel edits never allocate GPU resources mid-frame.
//! - Render targets are recreated on resize with dimensions clamped to at
//!   least one texel.

mod camera;
mod gpu;
mod shaders;
mod texture;

pub use camera::OrbitCamera;
pub use gpu::{MatcapRenderer, MSAA_SAMPLES};
