//! Beveled text extrusion.
//!
//! Glyph outlines from a [`FontFace`] are laid out along a baseline,
//! flattened to polylines, and extruded along +z: a tessellated cap at each
//! end and quad-strip walls following a bevel profile in between. The
//! silhouette swells outward by the bevel size through the middle of the
//! extrusion and matches the raw outline at the caps, so the caps always
//! sit at the z extremes.

use std::f32::consts::FRAC_PI_2;

use glam::{vec2, Vec2, Vec3};
use lyon::math::point;
use lyon::path::Path;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use marquee_assets::{Contour, FontFace, Glyph, PathSegment};

use crate::{GeometryError, MeshData};

/// Rounded edge between a cap and the side walls. `thickness` extends the
/// extrusion along z at both ends, `size` is the outward swell, `offset`
/// shifts the whole profile off the outline, `segments` is the ring count
/// per rounded edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bevel {
    pub thickness: f32,
    pub size: f32,
    pub offset: f32,
    pub segments: u32,
}

impl Default for Bevel {
    fn default() -> Self {
        Self {
            thickness: 0.03,
            size: 0.02,
            offset: 0.0,
            segments: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// World units per em.
    pub size: f32,
    /// Extrusion depth, before the bevel extends it.
    pub depth: f32,
    /// Polyline points per curved outline segment.
    pub curve_segments: u32,
    pub bevel: Option<Bevel>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 0.5,
            depth: 0.2,
            curve_segments: 12,
            bevel: Some(Bevel::default()),
        }
    }
}

/// Extrude `text` into a single mesh, centered on its bounding box.
///
/// Characters without a glyph fall back to their uppercase form, then are
/// skipped with a warning. Fails only when nothing at all could be built.
pub fn extrude_text(
    face: &FontFace,
    text: &str,
    style: &TextStyle,
) -> Result<MeshData, GeometryError> {
    let profile = extrusion_profile(style);
    let cap_offset = style.bevel.map_or(0.0, |b| b.offset);
    let z_back = profile[0].0;
    let z_front = profile[profile.len() - 1].0;

    let mut mesh = MeshData::default();
    let mut pen = 0.0;
    for ch in text.chars() {
        let Some(glyph) = lookup(face, ch) else {
            warn!(character = %ch.escape_debug(), "no glyph in face, skipping");
            continue;
        };
        let contours = flatten_glyph(glyph, style.size, vec2(pen, 0.0), style.curve_segments);
        pen += glyph.advance * style.size;
        if contours.is_empty() {
            continue;
        }

        // One cap tessellation serves both ends of the extrusion.
        let cap = tessellate_cap(&contours, cap_offset)?;
        append_cap(&mut mesh, &cap, z_front, true);
        append_cap(&mut mesh, &cap, z_back, false);
        for contour in &contours {
            build_walls(&mut mesh, contour, &profile);
        }
    }

    if mesh.indices.is_empty() {
        return Err(GeometryError::EmptyText {
            text: text.to_owned(),
        });
    }
    mesh.center();
    mesh.validate()?;
    Ok(mesh)
}

fn lookup<'a>(face: &'a FontFace, ch: char) -> Option<&'a Glyph> {
    face.glyph(ch)
        .or_else(|| face.glyph(ch.to_ascii_uppercase()))
}

/// Profile rings as `(z, outward offset)`, back to front, strictly
/// increasing in z. The caps sit on the first and last ring.
fn extrusion_profile(style: &TextStyle) -> Vec<(f32, f32)> {
    let Some(bevel) = style.bevel else {
        return vec![(0.0, 0.0), (style.depth, 0.0)];
    };
    let segments = bevel.segments.max(1);
    let mut rings = Vec::with_capacity(2 * segments as usize + 2);
    for b in 0..=segments {
        let t = b as f32 / segments as f32 * FRAC_PI_2;
        let ring = (
            -bevel.thickness * t.cos(),
            bevel.offset + bevel.size * t.sin(),
        );
        rings.push(ring);
    }
    rings.push((style.depth, bevel.offset + bevel.size));
    for b in (0..segments).rev() {
        let t = b as f32 / segments as f32 * FRAC_PI_2;
        let ring = (
            style.depth + bevel.thickness * t.cos(),
            bevel.offset + bevel.size * t.sin(),
        );
        rings.push(ring);
    }
    rings
}

/// Flatten a glyph's contours into polylines in world units, winding
/// normalized: outers counterclockwise, holes clockwise.
fn flatten_glyph(glyph: &Glyph, scale: f32, origin: Vec2, curve_segments: u32) -> Vec<Vec<Vec2>> {
    let mut contours: Vec<Vec<Vec2>> = glyph
        .contours
        .iter()
        .filter_map(|c| flatten_contour(c, scale, origin, curve_segments))
        .collect();
    normalize_windings(&mut contours);
    contours
}

fn flatten_contour(
    contour: &Contour,
    scale: f32,
    origin: Vec2,
    curve_segments: u32,
) -> Option<Vec<Vec2>> {
    let steps = curve_segments.max(1);
    let place = |p: Vec2| p * scale + origin;
    let mut points: Vec<Vec2> = vec![place(contour.start)];
    let mut push = |points: &mut Vec<Vec2>, p: Vec2| {
        let p = place(p);
        if points
            .last()
            .is_none_or(|last| last.distance_squared(p) > 1e-12)
        {
            points.push(p);
        }
    };

    let mut cursor = contour.start;
    for segment in &contour.segments {
        match *segment {
            PathSegment::Line { to } => push(&mut points, to),
            PathSegment::Quadratic { ctrl, to } => {
                for s in 1..=steps {
                    let t = s as f32 / steps as f32;
                    push(&mut points, quadratic_point(cursor, ctrl, to, t));
                }
            }
            PathSegment::Cubic { ctrl1, ctrl2, to } => {
                for s in 1..=steps {
                    let t = s as f32 / steps as f32;
                    push(&mut points, cubic_point(cursor, ctrl1, ctrl2, to, t));
                }
            }
        }
        cursor = segment.end();
    }
    // Drop an explicit closing point; the contour closes implicitly.
    if points.len() > 1 && points[0].distance_squared(points[points.len() - 1]) <= 1e-12 {
        points.pop();
    }
    (points.len() >= 3).then_some(points)
}

fn quadratic_point(from: Vec2, ctrl: Vec2, to: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    from * (u * u) + ctrl * (2.0 * u * t) + to * (t * t)
}

fn cubic_point(from: Vec2, ctrl1: Vec2, ctrl2: Vec2, to: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    from * (u * u * u) + ctrl1 * (3.0 * u * u * t) + ctrl2 * (3.0 * u * t * t) + to * (t * t * t)
}

/// Orient outers counterclockwise and holes clockwise. A contour is a hole
/// when a point of it lies inside an odd number of the glyph's other
/// contours.
fn normalize_windings(contours: &mut [Vec<Vec2>]) {
    let count = contours.len();
    let mut is_hole = vec![false; count];
    for i in 0..count {
        let probe = contours[i][0];
        let depth = (0..count)
            .filter(|&j| j != i && contains(&contours[j], probe))
            .count();
        is_hole[i] = depth % 2 == 1;
    }
    for (contour, hole) in contours.iter_mut().zip(is_hole) {
        let ccw = signed_area(contour) > 0.0;
        if ccw == hole {
            contour.reverse();
        }
    }
}

fn signed_area(contour: &[Vec2]) -> f32 {
    let mut doubled = 0.0;
    for (i, p) in contour.iter().enumerate() {
        let q = contour[(i + 1) % contour.len()];
        doubled += p.x * q.y - q.x * p.y;
    }
    doubled * 0.5
}

/// Even-odd point-in-polygon raycast.
fn contains(contour: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let mut j = contour.len() - 1;
    for i in 0..contour.len() {
        let (a, b) = (contour[i], contour[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let cross_x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

struct CapMesh {
    vertices: Vec<Vec2>,
    /// Counterclockwise in the xy plane.
    indices: Vec<u32>,
}

fn tessellate_cap(contours: &[Vec<Vec2>], outline_offset: f32) -> Result<CapMesh, GeometryError> {
    let mut builder = Path::builder();
    for contour in contours {
        let ring: Vec<Vec2> = if outline_offset != 0.0 {
            offset_ring(contour, outline_offset)
        } else {
            contour.clone()
        };
        builder.begin(point(ring[0].x, ring[0].y));
        for p in &ring[1..] {
            builder.line_to(point(p.x, p.y));
        }
        builder.end(true);
    }
    let path = builder.build();

    let mut buffers: VertexBuffers<Vec2, u32> = VertexBuffers::new();
    let mut tessellator = FillTessellator::new();
    tessellator
        .tessellate_path(
            &path,
            &FillOptions::default().with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut buffers, |v: FillVertex| {
                let p = v.position();
                vec2(p.x, p.y)
            }),
        )
        .map_err(|e| GeometryError::Tessellation(format!("{e:?}")))?;

    let VertexBuffers { vertices, mut indices } = buffers;
    for tri in indices.chunks_exact_mut(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| vertices[i as usize]);
        if (b - a).perp_dot(c - a) < 0.0 {
            tri.swap(1, 2);
        }
    }
    Ok(CapMesh { vertices, indices })
}

fn append_cap(mesh: &mut MeshData, cap: &CapMesh, z: f32, front: bool) {
    let normal = if front { Vec3::Z } else { Vec3::NEG_Z };
    let base = mesh.positions.len() as u32;
    for v in &cap.vertices {
        mesh.push_vertex(Vec3::new(v.x, v.y, z), normal);
    }
    for tri in cap.indices.chunks_exact(3) {
        let (a, b, c) = if front {
            (tri[0], tri[1], tri[2])
        } else {
            (tri[0], tri[2], tri[1])
        };
        mesh.indices
            .extend_from_slice(&[base + a, base + b, base + c]);
    }
}

/// Quad strips along the profile. Every band gets its own vertex rings, so
/// profile corners shade sharp while the contour direction shades smooth.
fn build_walls(mesh: &mut MeshData, contour: &[Vec2], profile: &[(f32, f32)]) {
    let miters = miter_normals(contour);
    let count = contour.len() as u32;
    for band in profile.windows(2) {
        let (z0, off0) = band[0];
        let (z1, off1) = band[1];
        let dz = z1 - z0;
        let d_off = off1 - off0;
        let base = mesh.positions.len() as u32;
        for (z, off) in [(z0, off0), (z1, off1)] {
            for (p, m) in contour.iter().zip(&miters) {
                let outward = m.normalize();
                let normal = Vec3::new(outward.x * dz, outward.y * dz, -d_off).normalize();
                let shifted = *p + *m * off;
                mesh.push_vertex(Vec3::new(shifted.x, shifted.y, z), normal);
            }
        }
        for i in 0..count {
            let k = (i + 1) % count;
            let a = base + i;
            let b = base + k;
            let c = base + count + k;
            let d = base + count + i;
            mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
}

fn offset_ring(contour: &[Vec2], offset: f32) -> Vec<Vec2> {
    let miters = miter_normals(contour);
    contour
        .iter()
        .zip(&miters)
        .map(|(p, m)| *p + *m * offset)
        .collect()
}

/// Per-vertex offset directions: averaged adjacent edge normals, scaled so
/// a unit offset displaces both edges by one unit (mitered), capped at 4x
/// for near-reversals.
fn miter_normals(contour: &[Vec2]) -> Vec<Vec2> {
    let count = contour.len();
    let mut miters = Vec::with_capacity(count);
    for i in 0..count {
        let prev = contour[(i + count - 1) % count];
        let here = contour[i];
        let next = contour[(i + 1) % count];
        let n_prev = edge_normal(prev, here);
        let n_next = edge_normal(here, next);
        let sum = n_prev + n_next;
        if sum.length_squared() < 1e-12 {
            miters.push(n_next);
            continue;
        }
        let dir = sum.normalize();
        miters.push(dir / dir.dot(n_next).max(0.25));
    }
    miters
}

/// Outward edge normal for counterclockwise winding.
fn edge_normal(from: Vec2, to: Vec2) -> Vec2 {
    let e = to - from;
    vec2(e.y, -e.x).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_face() -> FontFace {
        FontFace::from_json_str(
            r#"{
                "familyName": "Fixture",
                "resolution": 1000,
                "glyphs": {
                    "D": {"ha": 900, "o": "m 100 0 l 800 0 l 800 800 l 100 800 z"},
                    "O": {"ha": 900, "o": "m 0 0 l 800 0 l 800 800 l 0 800 z m 200 200 l 200 600 l 600 600 l 600 200 z"},
                    "Q": {"ha": 500, "o": "m 0 0 l 400 0 q 400 400 500 200 l 0 400 z"}
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn beveled_extrusion_is_centered_with_expected_depth() {
        let face = FontFace::builtin();
        let mesh = extrude_text(&face, "HI", &TextStyle::default()).unwrap();
        mesh.validate().unwrap();

        let (min, max) = mesh.bounds().unwrap();
        // depth 0.2 plus bevel thickness 0.03 on both ends, centered.
        assert!((max.z - 0.13).abs() < 1e-4, "max.z = {}", max.z);
        assert!((min.z + 0.13).abs() < 1e-4);
        assert!((min.x + max.x).abs() < 1e-4);
        assert!((min.y + max.y).abs() < 1e-4);
        // Glyphs are 1 em tall at size 0.5; the bevel swells that slightly.
        let height = max.y - min.y;
        assert!(height > 0.5 && height < 0.58, "height = {height}");
    }

    #[test]
    fn plain_extrusion_spans_depth_exactly() {
        let face = FontFace::builtin();
        let style = TextStyle {
            bevel: None,
            ..TextStyle::default()
        };
        let mesh = extrude_text(&face, "HI", &style).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert!((max.z - min.z - 0.2).abs() < 1e-5);
    }

    #[test]
    fn empty_and_unrenderable_text_fail() {
        let face = FontFace::builtin();
        let style = TextStyle::default();
        assert!(matches!(
            extrude_text(&face, "", &style),
            Err(GeometryError::EmptyText { .. })
        ));
        assert!(matches!(
            extrude_text(&face, "   ", &style),
            Err(GeometryError::EmptyText { .. })
        ));
        assert!(matches!(
            extrude_text(&face, "§§", &style),
            Err(GeometryError::EmptyText { .. })
        ));
    }

    #[test]
    fn unknown_characters_are_skipped_without_advancing() {
        let face = FontFace::builtin();
        let style = TextStyle::default();
        let with_gap = extrude_text(&face, "H§I", &style).unwrap();
        let without = extrude_text(&face, "HI", &style).unwrap();
        assert_eq!(with_gap.positions, without.positions);
        assert_eq!(with_gap.indices, without.indices);
    }

    #[test]
    fn lowercase_falls_back_to_uppercase_glyphs() {
        let face = FontFace::builtin();
        let style = TextStyle::default();
        let lower = extrude_text(&face, "hi", &style).unwrap();
        let upper = extrude_text(&face, "HI", &style).unwrap();
        assert_eq!(lower.positions, upper.positions);
    }

    #[test]
    fn extrusion_is_deterministic() {
        let face = FontFace::builtin();
        let style = TextStyle::default();
        let a = extrude_text(&face, "MARQUEE 42", &style).unwrap();
        let b = extrude_text(&face, "MARQUEE 42", &style).unwrap();
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn holes_add_inner_walls() {
        let face = fixture_face();
        let style = TextStyle::default();
        let with_hole = extrude_text(&face, "O", &style).unwrap();
        let solid = extrude_text(&face, "D", &style).unwrap();
        with_hole.validate().unwrap();
        solid.validate().unwrap();
        assert!(with_hole.triangle_count() > solid.triangle_count());
    }

    #[test]
    fn curve_segments_control_flattening_density() {
        let face = fixture_face();
        let coarse = extrude_text(
            &face,
            "Q",
            &TextStyle {
                curve_segments: 4,
                ..TextStyle::default()
            },
        )
        .unwrap();
        let fine = extrude_text(
            &face,
            "Q",
            &TextStyle {
                curve_segments: 12,
                ..TextStyle::default()
            },
        )
        .unwrap();
        assert!(fine.vertex_count() > coarse.vertex_count());
    }

    #[test]
    fn pen_advances_between_glyphs() {
        let face = FontFace::builtin();
        let style = TextStyle::default();
        let one = extrude_text(&face, "I", &style).unwrap();
        let two = extrude_text(&face, "II", &style).unwrap();
        let width = |m: &MeshData| {
            let (min, max) = m.bounds().unwrap();
            max.x - min.x
        };
        assert!(width(&two) > width(&one) + 0.3);
    }

    #[test]
    fn default_profile_matches_bevel_parameters() {
        let profile = extrusion_profile(&TextStyle::default());
        assert_eq!(profile.len(), 12);
        assert!((profile[0].0 + 0.03).abs() < 1e-6);
        assert!(profile[0].1.abs() < 1e-6);
        assert!((profile[11].0 - 0.23).abs() < 1e-6);
        for pair in profile.windows(2) {
            assert!(pair[1].0 > pair[0].0, "profile z must increase");
        }
    }

    #[test]
    fn mitered_offset_grows_a_square_uniformly() {
        let square = vec![
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
        ];
        let grown = offset_ring(&square, 0.1);
        for (p, q) in [
            (grown[0], vec2(-0.1, -0.1)),
            (grown[1], vec2(1.1, -0.1)),
            (grown[2], vec2(1.1, 1.1)),
            (grown[3], vec2(-0.1, 1.1)),
        ] {
            assert!((p - q).length() < 1e-5, "{p:?} != {q:?}");
        }
    }

    #[test]
    fn winding_normalization_flips_holes_clockwise() {
        let mut contours = vec![
            // Outer square, counterclockwise already.
            vec![
                vec2(0.0, 0.0),
                vec2(4.0, 0.0),
                vec2(4.0, 4.0),
                vec2(0.0, 4.0),
            ],
            // Hole, also counterclockwise: must be flipped.
            vec![
                vec2(1.0, 1.0),
                vec2(3.0, 1.0),
                vec2(3.0, 3.0),
                vec2(1.0, 3.0),
            ],
        ];
        normalize_windings(&mut contours);
        assert!(signed_area(&contours[0]) > 0.0);
        assert!(signed_area(&contours[1]) < 0.0);
    }
}
