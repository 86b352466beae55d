//! Shared types for the marquee scene: spatial transforms and colors.
//!
//! # Invariants
//! - `Transform` composes as scale, then rotation, then translation.
//! - `Rgba` components are sRGB-encoded; linearization happens once, at
//!   uniform-upload time.

pub mod color;
pub mod types;

pub use color::Rgba;
pub use types::Transform;
