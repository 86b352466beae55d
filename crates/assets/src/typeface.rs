//! Typeface parsing.
//!
//! The headline font ships as `typeface.json`, a JSON dump of glyph outlines:
//! a global `resolution` in units per em and, per glyph, a horizontal advance
//! `ha` plus an outline string `o` of whitespace-separated commands
//! (`m x y`, `l x y`, `q x y cx cy`, `b x y c1x c1y c2x c2y`, `z`). End
//! points precede control points in this encoding. All coordinates are
//! divided by `resolution`, so everything downstream works in em units.

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{segment, AssetError};

/// One step of a closed outline, starting from the previous end point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Line { to: Vec2 },
    Quadratic { ctrl: Vec2, to: Vec2 },
    Cubic { ctrl1: Vec2, ctrl2: Vec2, to: Vec2 },
}

impl PathSegment {
    pub fn end(&self) -> Vec2 {
        match *self {
            PathSegment::Line { to } => to,
            PathSegment::Quadratic { to, .. } => to,
            PathSegment::Cubic { to, .. } => to,
        }
    }
}

/// A closed outline. The contour runs from `start` through each segment's
/// end point and closes back to `start` implicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub start: Vec2,
    pub segments: Vec<PathSegment>,
}

/// A glyph in em units, y up, origin at the pen position on the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub advance: f32,
    pub contours: Vec<Contour>,
}

/// A parsed font: glyph outlines addressable by character.
#[derive(Debug, Clone)]
pub struct FontFace {
    family: String,
    glyphs: BTreeMap<char, Glyph>,
}

#[derive(Deserialize)]
struct RawFace {
    glyphs: BTreeMap<String, RawGlyph>,
    #[serde(default = "default_resolution")]
    resolution: f32,
    #[serde(default, rename = "familyName")]
    family_name: String,
}

#[derive(Deserialize)]
struct RawGlyph {
    ha: f32,
    #[serde(default)]
    o: String,
}

fn default_resolution() -> f32 {
    1000.0
}

impl FontFace {
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let face = Self::from_json_str(&text)?;
        debug!(
            family = face.family(),
            glyphs = face.glyph_count(),
            path = %path.display(),
            "loaded typeface"
        );
        Ok(face)
    }

    pub fn from_json_str(text: &str) -> Result<Self, AssetError> {
        let raw: RawFace = serde_json::from_str(text)?;
        let scale = 1.0 / raw.resolution;
        let mut glyphs = BTreeMap::new();
        for (key, glyph) in &raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                warn!(key = %key, "skipping multi-character glyph key");
                continue;
            };
            glyphs.insert(
                ch,
                Glyph {
                    advance: glyph.ha * scale,
                    contours: parse_outline(&glyph.o, scale, ch)?,
                },
            );
        }
        if glyphs.is_empty() {
            return Err(AssetError::EmptyFace {
                family: raw.family_name,
            });
        }
        Ok(Self {
            family: raw.family_name,
            glyphs,
        })
    }

    /// The embedded fourteen-segment face used when no font file is found.
    pub fn builtin() -> Self {
        segment::builtin_face()
    }

    pub(crate) fn from_parts(family: String, glyphs: BTreeMap<char, Glyph>) -> Self {
        Self { family, glyphs }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

fn parse_outline(outline: &str, scale: f32, glyph: char) -> Result<Vec<Contour>, AssetError> {
    let mut tokens = outline.split_ascii_whitespace();
    let mut contours = Vec::new();
    let mut current: Option<Contour> = None;

    while let Some(cmd) = tokens.next() {
        match cmd {
            "m" => {
                let start = read_point(&mut tokens, scale, glyph)?;
                close(current.take(), &mut contours);
                current = Some(Contour {
                    start,
                    segments: Vec::new(),
                });
            }
            "l" => {
                let to = read_point(&mut tokens, scale, glyph)?;
                open_contour(&mut current, glyph)?
                    .segments
                    .push(PathSegment::Line { to });
            }
            "q" => {
                let to = read_point(&mut tokens, scale, glyph)?;
                let ctrl = read_point(&mut tokens, scale, glyph)?;
                open_contour(&mut current, glyph)?
                    .segments
                    .push(PathSegment::Quadratic { ctrl, to });
            }
            "b" => {
                let to = read_point(&mut tokens, scale, glyph)?;
                let ctrl1 = read_point(&mut tokens, scale, glyph)?;
                let ctrl2 = read_point(&mut tokens, scale, glyph)?;
                open_contour(&mut current, glyph)?
                    .segments
                    .push(PathSegment::Cubic { ctrl1, ctrl2, to });
            }
            "z" => close(current.take(), &mut contours),
            other => {
                return Err(AssetError::Outline {
                    glyph,
                    detail: format!("unknown outline command {other:?}"),
                });
            }
        }
    }
    close(current, &mut contours);
    Ok(contours)
}

/// Finish a contour, dropping bare movetos that never drew anything.
fn close(contour: Option<Contour>, contours: &mut Vec<Contour>) {
    if let Some(contour) = contour {
        if !contour.segments.is_empty() {
            contours.push(contour);
        }
    }
}

fn open_contour<'a>(
    current: &'a mut Option<Contour>,
    glyph: char,
) -> Result<&'a mut Contour, AssetError> {
    current.as_mut().ok_or_else(|| AssetError::Outline {
        glyph,
        detail: "draw command before any moveto".into(),
    })
}

fn read_point<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    scale: f32,
    glyph: char,
) -> Result<Vec2, AssetError> {
    let mut component = || -> Result<f32, AssetError> {
        let token = tokens.next().ok_or_else(|| AssetError::Outline {
            glyph,
            detail: "outline ended mid-command".into(),
        })?;
        token.parse::<f32>().map_err(|_| AssetError::Outline {
            glyph,
            detail: format!("bad coordinate {token:?}"),
        })
    };
    let x = component()?;
    let y = component()?;
    Ok(Vec2::new(x * scale, y * scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(glyphs_json: &str) -> Result<FontFace, AssetError> {
        FontFace::from_json_str(&format!(
            r#"{{"familyName":"Fixture","resolution":1000,"glyphs":{glyphs_json}}}"#
        ))
    }

    #[test]
    fn parses_line_outline_in_em_units() {
        let face = face(r#"{"A":{"ha":700,"o":"m 0 0 l 700 0 l 350 700 z"}}"#).unwrap();
        let glyph = face.glyph('A').unwrap();
        assert!((glyph.advance - 0.7).abs() < 1e-6);
        assert_eq!(glyph.contours.len(), 1);
        let contour = &glyph.contours[0];
        assert_eq!(contour.start, Vec2::ZERO);
        assert_eq!(contour.segments.len(), 2);
        assert_eq!(
            contour.segments[1],
            PathSegment::Line {
                to: Vec2::new(0.35, 0.7)
            }
        );
    }

    #[test]
    fn quadratic_reads_end_point_first() {
        let face = face(r#"{"o":{"ha":500,"o":"m 0 0 l 100 0 q 100 100 50 0"}}"#).unwrap();
        let contour = &face.glyph('o').unwrap().contours[0];
        assert_eq!(
            contour.segments[1],
            PathSegment::Quadratic {
                ctrl: Vec2::new(0.05, 0.0),
                to: Vec2::new(0.1, 0.1),
            }
        );
    }

    #[test]
    fn cubic_reads_end_point_first() {
        let face = face(r#"{"s":{"ha":500,"o":"m 0 0 l 10 0 b 0 80 40 20 40 60"}}"#).unwrap();
        let contour = &face.glyph('s').unwrap().contours[0];
        assert_eq!(
            contour.segments[1],
            PathSegment::Cubic {
                ctrl1: Vec2::new(0.04, 0.02),
                ctrl2: Vec2::new(0.04, 0.06),
                to: Vec2::new(0.0, 0.08),
            }
        );
    }

    #[test]
    fn implicit_close_keeps_trailing_contour() {
        let face = face(r#"{"A":{"ha":700,"o":"m 0 0 l 1 0 l 1 1"}}"#).unwrap();
        assert_eq!(face.glyph('A').unwrap().contours.len(), 1);
    }

    #[test]
    fn rejects_unknown_command() {
        let err = face(r#"{"A":{"ha":700,"o":"m 0 0 x 1 2"}}"#).unwrap_err();
        assert!(matches!(err, AssetError::Outline { glyph: 'A', .. }));
    }

    #[test]
    fn rejects_truncated_command() {
        let err = face(r#"{"A":{"ha":700,"o":"m 5"}}"#).unwrap_err();
        assert!(matches!(err, AssetError::Outline { .. }));
    }

    #[test]
    fn rejects_draw_before_moveto() {
        let err = face(r#"{"A":{"ha":700,"o":"l 1 2"}}"#).unwrap_err();
        assert!(matches!(err, AssetError::Outline { .. }));
    }

    #[test]
    fn skips_ligature_keys_and_rejects_empty_faces() {
        let face = face(r#"{"ff":{"ha":900,"o":"m 0 0 l 1 0 l 1 1 z"},"f":{"ha":400,"o":""}}"#)
            .unwrap();
        assert_eq!(face.glyph_count(), 1);
        assert!(face.glyph('f').unwrap().contours.is_empty());

        let err = self::face(r#"{}"#).unwrap_err();
        assert!(matches!(err, AssetError::EmptyFace { .. }));
    }

    #[test]
    fn respects_resolution_scaling() {
        let face = FontFace::from_json_str(
            r#"{"resolution":500,"glyphs":{"I":{"ha":250,"o":"m 0 0 l 250 0 l 250 500 z"}}}"#,
        )
        .unwrap();
        let glyph = face.glyph('I').unwrap();
        assert!((glyph.advance - 0.5).abs() < 1e-6);
        assert_eq!(glyph.contours[0].segments[1].end(), Vec2::new(0.5, 1.0));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.typeface.json");
        std::fs::write(
            &path,
            r#"{"familyName":"Disk","resolution":1000,"glyphs":{"A":{"ha":700,"o":"m 0 0 l 700 0 l 350 700 z"}}}"#,
        )
        .unwrap();
        let face = FontFace::load(&path).unwrap();
        assert_eq!(face.family(), "Disk");
        assert_eq!(face.glyph_count(), 1);

        let missing = FontFace::load(&dir.path().join("nope.json"));
        assert!(matches!(missing, Err(AssetError::Io { .. })));
    }
}
