//! Matcap texture loading.
//!
//! A matcap is a pre-shaded sphere image sampled by view-space normal, so a
//! texture is all the lighting the scene has. Files live in
//! `<assets>/matcaps/1.png .. 8.png`; every slot that fails to load is
//! replaced by [`procedural_matcap`] so rendering never depends on assets
//! being present.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use marquee_common::color::{linear_to_srgb, srgb_to_linear};

use crate::{AssetError, MatcapSlot, MATCAP_COUNT};

/// Side length of procedurally baked matcaps.
const PROCEDURAL_SIZE: u32 = 256;

/// CPU-side RGBA8 image, sRGB-encoded, tightly packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextureData {
    pub fn from_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, AssetError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(AssetError::TextureSize {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode an image file (PNG or JPEG) into RGBA8.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let image = image::open(path).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Where a slot's texture came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcapSource {
    File(PathBuf),
    Procedural,
}

/// The eight matcap textures the scene can bind, indexed by [`MatcapSlot`].
#[derive(Debug, Clone)]
pub struct MatcapSet {
    textures: Vec<TextureData>,
    sources: Vec<MatcapSource>,
}

impl MatcapSet {
    /// Load the full set from `<assets_dir>/matcaps/`, falling back to a
    /// baked matcap for any slot whose file is missing or undecodable.
    pub fn load(assets_dir: &Path) -> Self {
        let mut textures = Vec::with_capacity(MATCAP_COUNT);
        let mut sources = Vec::with_capacity(MATCAP_COUNT);
        for slot in MatcapSlot::all() {
            let path = assets_dir
                .join("matcaps")
                .join(format!("{}.png", slot.index() + 1));
            match TextureData::load(&path) {
                Ok(texture) => {
                    debug!(slot = %slot, path = %path.display(), "loaded matcap");
                    textures.push(texture);
                    sources.push(MatcapSource::File(path));
                }
                Err(err) => {
                    warn!(slot = %slot, error = %err, "matcap unavailable, baking fallback");
                    textures.push(procedural_matcap(slot, PROCEDURAL_SIZE));
                    sources.push(MatcapSource::Procedural);
                }
            }
        }
        Self { textures, sources }
    }

    /// A set made entirely of baked matcaps, no filesystem involved.
    pub fn procedural() -> Self {
        let textures = MatcapSlot::all()
            .map(|slot| procedural_matcap(slot, PROCEDURAL_SIZE))
            .collect();
        let sources = vec![MatcapSource::Procedural; MATCAP_COUNT];
        Self { textures, sources }
    }

    pub fn texture(&self, slot: MatcapSlot) -> &TextureData {
        &self.textures[slot.index()]
    }

    pub fn source(&self, slot: MatcapSlot) -> &MatcapSource {
        &self.sources[slot.index()]
    }

    pub fn file_count(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s, MatcapSource::File(_)))
            .count()
    }
}

/// One baked matcap look: a Blinn-Phong sphere under a fixed light.
struct MatcapStyle {
    /// Base albedo, sRGB components.
    base: [f32; 3],
    light: [f32; 3],
    ambient: f32,
    diffuse: f32,
    spec_power: f32,
    spec_strength: f32,
    rim: f32,
}

/// One distinct look per slot so the panel dropdowns stay meaningful
/// without texture files.
const MATCAP_STYLES: [MatcapStyle; MATCAP_COUNT] = [
    // porcelain
    MatcapStyle {
        base: [0.91, 0.91, 0.91],
        light: [0.4, 0.6, 0.7],
        ambient: 0.25,
        diffuse: 0.75,
        spec_power: 48.0,
        spec_strength: 0.50,
        rim: 0.08,
    },
    // terracotta
    MatcapStyle {
        base: [0.71, 0.31, 0.24],
        light: [-0.3, 0.5, 0.8],
        ambient: 0.30,
        diffuse: 0.70,
        spec_power: 12.0,
        spec_strength: 0.15,
        rim: 0.05,
    },
    // steel
    MatcapStyle {
        base: [0.43, 0.55, 0.71],
        light: [0.5, 0.5, 0.7],
        ambient: 0.15,
        diffuse: 0.55,
        spec_power: 96.0,
        spec_strength: 0.90,
        rim: 0.20,
    },
    // emerald
    MatcapStyle {
        base: [0.17, 0.55, 0.35],
        light: [0.2, 0.7, 0.7],
        ambient: 0.20,
        diffuse: 0.70,
        spec_power: 32.0,
        spec_strength: 0.45,
        rim: 0.10,
    },
    // gold
    MatcapStyle {
        base: [0.78, 0.59, 0.20],
        light: [0.45, 0.55, 0.7],
        ambient: 0.25,
        diffuse: 0.65,
        spec_power: 28.0,
        spec_strength: 0.80,
        rim: 0.12,
    },
    // amethyst
    MatcapStyle {
        base: [0.47, 0.31, 0.67],
        light: [-0.4, 0.4, 0.8],
        ambient: 0.22,
        diffuse: 0.68,
        spec_power: 40.0,
        spec_strength: 0.50,
        rim: 0.15,
    },
    // pearl
    MatcapStyle {
        base: [0.84, 0.63, 0.66],
        light: [0.0, 0.6, 0.8],
        ambient: 0.35,
        diffuse: 0.60,
        spec_power: 20.0,
        spec_strength: 0.35,
        rim: 0.25,
    },
    // graphite
    MatcapStyle {
        base: [0.20, 0.20, 0.21],
        light: [0.5, 0.6, 0.63],
        ambient: 0.12,
        diffuse: 0.45,
        spec_power: 64.0,
        spec_strength: 0.85,
        rim: 0.10,
    },
];

/// Bake a lit-sphere image for `slot`. Pixels outside the sphere take the
/// rim direction's shade so clamped UV lookups stay continuous.
pub fn procedural_matcap(slot: MatcapSlot, size: u32) -> TextureData {
    let style = &MATCAP_STYLES[slot.index()];
    let base = style.base.map(srgb_to_linear);
    let light = normalize3(style.light);
    // Blinn half vector for a fixed view along +z.
    let half = normalize3([light[0], light[1], light[2] + 1.0]);

    let mut pixels = Vec::with_capacity(size as usize * size as usize * 4);
    for py in 0..size {
        for px in 0..size {
            let mut x = (px as f32 + 0.5) / size as f32 * 2.0 - 1.0;
            let mut y = 1.0 - (py as f32 + 0.5) / size as f32 * 2.0;
            let r2 = x * x + y * y;
            let z = if r2 >= 1.0 {
                let inv = 1.0 / r2.sqrt();
                x *= inv;
                y *= inv;
                0.0
            } else {
                (1.0 - r2).sqrt()
            };
            let normal = [x, y, z];

            let n_dot_l = dot3(normal, light).max(0.0);
            let spec = dot3(normal, half).max(0.0).powf(style.spec_power) * style.spec_strength;
            let fresnel = (1.0 - z).powi(3) * style.rim;
            for channel in 0..3 {
                let lit = base[channel] * (style.ambient + style.diffuse * n_dot_l)
                    + spec
                    + fresnel;
                pixels.push((linear_to_srgb(lit) * 255.0 + 0.5) as u8);
            }
            pixels.push(255);
        }
    }
    TextureData {
        width: size,
        height: size,
        pixels,
    }
}

fn dot3(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn normalize3(v: [f32; 3]) -> [f32; 3] {
    let len = dot3(v, v).sqrt();
    [v[0] / len, v[1] / len, v[2] / len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_pixel_buffer() {
        let err = TextureData::from_rgba8(4, 4, vec![0; 10]).unwrap_err();
        assert!(matches!(err, AssetError::TextureSize { expected: 64, .. }));
    }

    #[test]
    fn procedural_matcap_is_deterministic() {
        let slot = MatcapSlot::new(2).unwrap();
        let a = procedural_matcap(slot, 64);
        let b = procedural_matcap(slot, 64);
        assert_eq!(a, b);
        assert_eq!(a.width(), 64);
        assert_eq!(a.pixels().len(), 64 * 64 * 4);
    }

    #[test]
    fn procedural_slots_differ() {
        let a = procedural_matcap(MatcapSlot::new(0).unwrap(), 32);
        let b = procedural_matcap(MatcapSlot::new(7).unwrap(), 32);
        assert_ne!(a.pixels(), b.pixels());
    }

    #[test]
    fn sphere_is_brighter_than_background_rim() {
        // Center pixel faces the viewer; it should not be fully dark for
        // any style.
        let data = procedural_matcap(MatcapSlot::new(4).unwrap(), 64);
        let center = (32 * 64 + 32) * 4;
        assert!(data.pixels()[center] > 20);
    }

    #[test]
    fn set_without_files_is_fully_procedural() {
        let dir = tempfile::tempdir().unwrap();
        let set = MatcapSet::load(dir.path());
        assert_eq!(set.file_count(), 0);
        for slot in MatcapSlot::all() {
            assert_eq!(set.source(slot), &MatcapSource::Procedural);
            assert_eq!(set.texture(slot).width(), PROCEDURAL_SIZE);
        }
    }

    #[test]
    fn set_picks_up_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let matcaps = dir.path().join("matcaps");
        std::fs::create_dir_all(&matcaps).unwrap();
        let img = image::RgbaImage::from_pixel(8, 8, image::Rgba([10, 20, 30, 255]));
        img.save(matcaps.join("3.png")).unwrap();

        let set = MatcapSet::load(dir.path());
        assert_eq!(set.file_count(), 1);
        let slot = MatcapSlot::new(2).unwrap();
        assert!(matches!(set.source(slot), MatcapSource::File(_)));
        assert_eq!(set.texture(slot).width(), 8);
        assert_eq!(&set.texture(slot).pixels()[0..4], &[10, 20, 30, 255]);
    }
}
