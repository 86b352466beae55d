//! Asset loading for the marquee scene.
//!
//! Two kinds of assets feed the renderer: matcap textures (one per
//! [`MatcapSlot`]) and a vector typeface used to extrude the headline text.
//! Both loaders degrade gracefully when files are missing, so the binary
//! runs out of the box with procedurally baked matcaps and a built-in
//! segment-display face.
//!
//! # Invariants
//!
//! - A [`texture::MatcapSet`] always holds exactly [`MATCAP_COUNT`] textures.
//! - Texture pixel data is RGBA8, sRGB-encoded, `width * height * 4` bytes.
//! - Glyph outlines are expressed in em units (1.0 = font size).

mod segment;
pub mod texture;
pub mod typeface;

pub use texture::{MatcapSet, MatcapSource, TextureData};
pub use typeface::{Contour, FontFace, Glyph, PathSegment};

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Number of matcap slots a [`MatcapSet`] carries.
pub const MATCAP_COUNT: usize = 8;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture data is {actual} bytes, expected {expected} for {width}x{height} RGBA8")]
    TextureSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to parse typeface JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad glyph outline for {glyph:?}: {detail}")]
    Outline { glyph: char, detail: String },
    #[error("typeface {family:?} defines no usable glyphs")]
    EmptyFace { family: String },
}

/// Index of one matcap texture, `0..MATCAP_COUNT`.
///
/// Slots are stable identifiers: materials store a slot, not a texture,
/// so swapping the texture under a slot retargets every user at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatcapSlot(usize);

impl MatcapSlot {
    /// Every slot in order, for iteration and for naming fixed defaults.
    pub const SLOTS: [MatcapSlot; MATCAP_COUNT] = [
        MatcapSlot(0),
        MatcapSlot(1),
        MatcapSlot(2),
        MatcapSlot(3),
        MatcapSlot(4),
        MatcapSlot(5),
        MatcapSlot(6),
        MatcapSlot(7),
    ];

    pub fn new(index: usize) -> Option<Self> {
        (index < MATCAP_COUNT).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0
    }

    /// Display name used by the panel dropdowns, `matcap1` through `matcap8`.
    pub fn name(self) -> String {
        format!("matcap{}", self.0 + 1)
    }

    pub fn all() -> impl Iterator<Item = MatcapSlot> {
        Self::SLOTS.into_iter()
    }
}

impl Default for MatcapSlot {
    fn default() -> Self {
        Self(0)
    }
}

impl fmt::Display for MatcapSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_rejects_out_of_range() {
        assert!(MatcapSlot::new(MATCAP_COUNT).is_none());
        assert!(MatcapSlot::new(0).is_some());
    }

    #[test]
    fn slot_names_are_one_based() {
        assert_eq!(MatcapSlot::new(0).unwrap().to_string(), "matcap1");
        assert_eq!(MatcapSlot::new(7).unwrap().to_string(), "matcap8");
    }

    #[test]
    fn all_yields_every_slot_once() {
        let slots: Vec<_> = MatcapSlot::all().collect();
        assert_eq!(slots.len(), MATCAP_COUNT);
        assert_eq!(slots[0].index(), 0);
        assert_eq!(slots[MATCAP_COUNT - 1].index(), MATCAP_COUNT - 1);
    }
}
