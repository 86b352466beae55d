use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An sRGB color with alpha, components in `[0, 1]`.
///
/// Stored sRGB-encoded because that is what color pickers and `#rrggbb`
/// strings carry; call [`Rgba::to_linear`] when handing the value to a
/// shader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Errors from parsing a hex color string.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected '#rrggbb', got {0:?}")]
    BadFormat(String),
    #[error("invalid hex digit in {0:?}")]
    BadDigit(String),
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// The `r`, `g`, `b` components as an array (for GUI bindings).
    pub fn rgb_array(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Replace the `r`, `g`, `b` components, keeping alpha.
    pub fn set_rgb(&mut self, rgb: [f32; 3]) {
        self.r = rgb[0];
        self.g = rgb[1];
        self.b = rgb[2];
    }

    /// Decode to linear light for shading. Alpha passes through unchanged.
    pub fn to_linear(&self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            self.a,
        ]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// sRGB electro-optical transfer function, per component.
pub fn srgb_to_linear(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Inverse of [`srgb_to_linear`]: encode linear light as sRGB.
pub fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    /// Parse `#rrggbb` (the debug panel's color encoding).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::BadFormat(s.into()))?;
        if hex.len() != 6 {
            return Err(ColorParseError::BadFormat(s.into()));
        }
        let byte = |i: usize| -> Result<f32, ColorParseError> {
            // get() rather than an index: a multi-byte char can put the
            // component boundary inside a char even when the length is 6.
            let digits = hex
                .get(i..i + 2)
                .ok_or_else(|| ColorParseError::BadDigit(s.into()))?;
            u8::from_str_radix(digits, 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| ColorParseError::BadDigit(s.into()))
        };
        Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, 1.0))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        write!(
            f,
            "#{:02x}{:02x}{:02x}",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex() {
        let c: Rgba = "#ffffff".parse().unwrap();
        assert_eq!(c, Rgba::WHITE);
        let c: Rgba = "#ff8000".parse().unwrap();
        assert!((c.r - 1.0).abs() < 1e-6);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 0.0).abs() < 1e-6);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!("ffffff".parse::<Rgba>().is_err());
        assert!("#fff".parse::<Rgba>().is_err());
        assert!("#gghhii".parse::<Rgba>().is_err());
        // six bytes but a two-byte char straddles a component boundary
        assert!("#fff\u{e9}1".parse::<Rgba>().is_err());
        assert!("#f\u{e9}ff1".parse::<Rgba>().is_err());
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(Rgba::WHITE.to_string(), "#ffffff");
        let c: Rgba = "#12ab9f".parse().unwrap();
        assert_eq!(c.to_string(), "#12ab9f");
    }

    #[test]
    fn linearization_endpoints() {
        let lin = Rgba::WHITE.to_linear();
        assert!((lin[0] - 1.0).abs() < 1e-6);
        let black = Rgba::new(0.0, 0.0, 0.0, 1.0).to_linear();
        assert_eq!(black[0], 0.0);
        // mid grey decodes below its encoded value
        let mid = srgb_to_linear(0.5);
        assert!(mid > 0.21 && mid < 0.22);
    }

    #[test]
    fn transfer_functions_invert() {
        for i in 0..=16 {
            let c = i as f32 / 16.0;
            let back = linear_to_srgb(srgb_to_linear(c));
            assert!((back - c).abs() < 1e-5, "round trip drifted at {c}");
        }
    }

    #[test]
    fn rgb_array_round_trip() {
        let mut c = Rgba::WHITE;
        c.set_rgb([0.25, 0.5, 0.75]);
        assert_eq!(c.rgb_array(), [0.25, 0.5, 0.75]);
        assert_eq!(c.a, 1.0);
    }
}
