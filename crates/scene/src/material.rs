//! The two live-mutable materials.

use marquee_assets::MatcapSlot;
use marquee_common::Rgba;

/// Matcap material: which sphere texture to sample, a tint multiplied in,
/// and whether to draw as wireframe. Mutating one of these retints every
/// mesh bound to it, which is the whole point of sharing them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcapMaterial {
    pub matcap: MatcapSlot,
    pub color: Rgba,
    pub wireframe: bool,
}

impl MatcapMaterial {
    pub fn with_slot(slot: MatcapSlot) -> Self {
        Self {
            matcap: slot,
            color: Rgba::WHITE,
            wireframe: false,
        }
    }
}

/// The scene's material set: `text` for the headline, `donut` shared by
/// every torus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Materials {
    pub text: MatcapMaterial,
    pub donut: MatcapMaterial,
}

impl Default for Materials {
    fn default() -> Self {
        Self {
            text: MatcapMaterial::with_slot(MatcapSlot::SLOTS[0]),
            donut: MatcapMaterial::with_slot(MatcapSlot::SLOTS[1]),
        }
    }
}

impl Materials {
    /// Restore both materials to their startup values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_first_two_slots_untinted() {
        let materials = Materials::default();
        assert_eq!(materials.text.matcap.index(), 0);
        assert_eq!(materials.donut.matcap.index(), 1);
        assert_eq!(materials.text.color, Rgba::WHITE);
        assert!(!materials.text.wireframe);
        assert!(!materials.donut.wireframe);
    }

    #[test]
    fn reset_undoes_panel_edits() {
        let mut materials = Materials::default();
        materials.donut.wireframe = true;
        materials.text.color.set_rgb([0.2, 0.4, 0.6]);
        materials.text.matcap = MatcapSlot::new(5).unwrap();
        materials.reset();
        assert_eq!(materials, Materials::default());
    }
}
