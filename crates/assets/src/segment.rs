//! Built-in fourteen-segment display face.
//!
//! Used when no typeface file can be loaded, so the scene always has
//! something to extrude. Each glyph is a union of disjoint segment
//! polygons, LED-display style:
//!
//! ```text
//!  _A_
//! |\|/|   F H I J B
//!  - -    G1  G2
//! |/|\|   E K L M C
//!  |_D_|
//! ```
//!
//! Segments are laid out on a 0.64 x 1.0 em box with visible gaps, so no
//! two polygons of a glyph ever touch or overlap.

use std::collections::BTreeMap;

use glam::{vec2, Vec2};

use crate::typeface::{Contour, FontFace, Glyph, PathSegment};

const SEG_A: u16 = 1 << 0; // top bar
const SEG_B: u16 = 1 << 1; // upper right
const SEG_C: u16 = 1 << 2; // lower right
const SEG_D: u16 = 1 << 3; // bottom bar
const SEG_E: u16 = 1 << 4; // lower left
const SEG_F: u16 = 1 << 5; // upper left
const SEG_G1: u16 = 1 << 6; // middle left
const SEG_G2: u16 = 1 << 7; // middle right
const SEG_H: u16 = 1 << 8; // upper left diagonal
const SEG_I: u16 = 1 << 9; // upper center
const SEG_J: u16 = 1 << 10; // upper right diagonal
const SEG_K: u16 = 1 << 11; // lower left diagonal
const SEG_L: u16 = 1 << 12; // lower center
const SEG_M: u16 = 1 << 13; // lower right diagonal
const SEG_DP: u16 = 1 << 14; // period dot

const BOX_W: f32 = 0.64;
const BOX_H: f32 = 1.0;
const STROKE: f32 = 0.09;
const GAP: f32 = 0.016;
/// Diagonal struts are slightly thinner than bars.
const DIAG_HALF: f32 = 0.034;

const ADVANCE: f32 = 0.9;
const SPACE_ADVANCE: f32 = 0.45;

const CHARSET: &[(char, u16)] = &[
    (' ', 0),
    ('-', SEG_G1 | SEG_G2),
    ('+', SEG_G1 | SEG_G2 | SEG_I | SEG_L),
    ('_', SEG_D),
    ('.', SEG_DP),
    ('0', SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_J | SEG_K),
    ('1', SEG_B | SEG_C),
    ('2', SEG_A | SEG_B | SEG_G1 | SEG_G2 | SEG_E | SEG_D),
    ('3', SEG_A | SEG_B | SEG_C | SEG_D | SEG_G2),
    ('4', SEG_F | SEG_G1 | SEG_G2 | SEG_B | SEG_C),
    ('5', SEG_A | SEG_F | SEG_G1 | SEG_G2 | SEG_C | SEG_D),
    ('6', SEG_A | SEG_F | SEG_E | SEG_D | SEG_C | SEG_G1 | SEG_G2),
    ('7', SEG_A | SEG_B | SEG_C),
    ('8', SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G1 | SEG_G2),
    ('9', SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G1 | SEG_G2),
    ('A', SEG_A | SEG_B | SEG_C | SEG_E | SEG_F | SEG_G1 | SEG_G2),
    ('B', SEG_A | SEG_B | SEG_C | SEG_D | SEG_I | SEG_L | SEG_G2),
    ('C', SEG_A | SEG_D | SEG_E | SEG_F),
    ('D', SEG_A | SEG_B | SEG_C | SEG_D | SEG_I | SEG_L),
    ('E', SEG_A | SEG_D | SEG_E | SEG_F | SEG_G1 | SEG_G2),
    ('F', SEG_A | SEG_E | SEG_F | SEG_G1 | SEG_G2),
    ('G', SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G2),
    ('H', SEG_B | SEG_C | SEG_E | SEG_F | SEG_G1 | SEG_G2),
    ('I', SEG_A | SEG_D | SEG_I | SEG_L),
    ('J', SEG_B | SEG_C | SEG_D | SEG_E),
    ('K', SEG_E | SEG_F | SEG_G1 | SEG_J | SEG_M),
    ('L', SEG_D | SEG_E | SEG_F),
    ('M', SEG_B | SEG_C | SEG_E | SEG_F | SEG_H | SEG_J),
    ('N', SEG_B | SEG_C | SEG_E | SEG_F | SEG_H | SEG_M),
    ('O', SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F),
    ('P', SEG_A | SEG_B | SEG_E | SEG_F | SEG_G1 | SEG_G2),
    ('Q', SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_M),
    ('R', SEG_A | SEG_B | SEG_E | SEG_F | SEG_G1 | SEG_G2 | SEG_M),
    ('S', SEG_A | SEG_C | SEG_D | SEG_F | SEG_G1 | SEG_G2),
    ('T', SEG_A | SEG_I | SEG_L),
    ('U', SEG_B | SEG_C | SEG_D | SEG_E | SEG_F),
    ('V', SEG_E | SEG_F | SEG_J | SEG_K),
    ('W', SEG_B | SEG_C | SEG_E | SEG_F | SEG_K | SEG_M),
    ('X', SEG_H | SEG_J | SEG_K | SEG_M),
    ('Y', SEG_H | SEG_J | SEG_L),
    ('Z', SEG_A | SEG_D | SEG_J | SEG_K),
];

pub(crate) fn builtin_face() -> FontFace {
    let outlines = segment_outlines();
    let mut glyphs = BTreeMap::new();
    for &(ch, mask) in CHARSET {
        let contours = outlines
            .iter()
            .filter(|(bit, _)| mask & bit != 0)
            .map(|(_, points)| polygon_contour(points))
            .collect();
        let advance = if ch == ' ' { SPACE_ADVANCE } else { ADVANCE };
        glyphs.insert(ch, Glyph { advance, contours });
    }
    FontFace::from_parts("Fourteen Segment".into(), glyphs)
}

/// All fifteen segment polygons, counterclockwise, em units.
fn segment_outlines() -> Vec<(u16, Vec<Vec2>)> {
    let t = STROKE;
    let g = GAP;
    let mid = BOX_H / 2.0;
    // Center column edges.
    let cx0 = BOX_W / 2.0 - t / 2.0;
    let cx1 = BOX_W / 2.0 + t / 2.0;
    // Inner corners and diagonal anchor points.
    let left = t + g;
    let right = BOX_W - t - g;
    let bottom = t + g;
    let top = BOX_H - t - g;
    let upper = mid + t / 2.0 + g;
    let lower = mid - t / 2.0 - g;

    vec![
        (SEG_A, h_bar(left, right, BOX_H - t / 2.0)),
        (SEG_B, v_bar(upper, top, BOX_W - t / 2.0)),
        (SEG_C, v_bar(bottom, lower, BOX_W - t / 2.0)),
        (SEG_D, h_bar(left, right, t / 2.0)),
        (SEG_E, v_bar(bottom, lower, t / 2.0)),
        (SEG_F, v_bar(upper, top, t / 2.0)),
        (SEG_G1, h_bar(left, cx0 - g, mid)),
        (SEG_G2, h_bar(cx1 + g, right, mid)),
        (SEG_H, strut(vec2(left, top), vec2(cx0 - g, upper))),
        (SEG_I, rect(cx0, upper, cx1, top)),
        (SEG_J, strut(vec2(right, top), vec2(cx1 + g, upper))),
        (SEG_K, strut(vec2(cx0 - g, lower), vec2(left, bottom))),
        (SEG_L, rect(cx0, bottom, cx1, lower)),
        (SEG_M, strut(vec2(cx1 + g, lower), vec2(right, bottom))),
        // Period dot sits in the bottom-right corner, clear of bar D.
        (SEG_DP, rect(BOX_W - t, 0.0, BOX_W, t)),
    ]
}

/// Horizontal bar with pointed ends, the classic LED hexagon.
fn h_bar(x0: f32, x1: f32, y_mid: f32) -> Vec<Vec2> {
    let h = STROKE / 2.0;
    vec![
        vec2(x0, y_mid),
        vec2(x0 + h, y_mid - h),
        vec2(x1 - h, y_mid - h),
        vec2(x1, y_mid),
        vec2(x1 - h, y_mid + h),
        vec2(x0 + h, y_mid + h),
    ]
}

fn v_bar(y0: f32, y1: f32, x_mid: f32) -> Vec<Vec2> {
    let h = STROKE / 2.0;
    vec![
        vec2(x_mid, y0),
        vec2(x_mid + h, y0 + h),
        vec2(x_mid + h, y1 - h),
        vec2(x_mid, y1),
        vec2(x_mid - h, y1 - h),
        vec2(x_mid - h, y0 + h),
    ]
}

/// Diagonal strut from `p0` to `p1`. End points are pulled in along the
/// axis so the strut's corners stay inside the inter-segment gaps.
fn strut(p0: Vec2, p1: Vec2) -> Vec<Vec2> {
    let dir = (p1 - p0).normalize();
    let n = vec2(-dir.y, dir.x) * DIAG_HALF;
    let p0 = p0 + dir * (2.0 * DIAG_HALF);
    let p1 = p1 - dir * (2.0 * DIAG_HALF);
    vec![p0 - n, p1 - n, p1 + n, p0 + n]
}

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Vec<Vec2> {
    vec![
        vec2(x0, y0),
        vec2(x1, y0),
        vec2(x1, y1),
        vec2(x0, y1),
    ]
}

fn polygon_contour(points: &[Vec2]) -> Contour {
    Contour {
        start: points[0],
        segments: points[1..]
            .iter()
            .map(|&to| PathSegment::Line { to })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aabb(points: &[Vec2]) -> (Vec2, Vec2) {
        let mut min = points[0];
        let mut max = points[0];
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        (min, max)
    }

    fn signed_area(points: &[Vec2]) -> f32 {
        let mut area = 0.0;
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            area += p.x * q.y - q.x * p.y;
        }
        area * 0.5
    }

    #[test]
    fn segments_are_pairwise_disjoint() {
        let outlines = segment_outlines();
        for (i, (_, a)) in outlines.iter().enumerate() {
            for (_, b) in outlines.iter().skip(i + 1) {
                let (amin, amax) = aabb(a);
                let (bmin, bmax) = aabb(b);
                let separated = amax.x <= bmin.x
                    || bmax.x <= amin.x
                    || amax.y <= bmin.y
                    || bmax.y <= amin.y;
                assert!(separated, "segment boxes overlap: {a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn segments_wind_counterclockwise() {
        for (bit, outline) in segment_outlines() {
            assert!(
                signed_area(&outline) > 0.0,
                "segment {bit:#06x} winds clockwise"
            );
        }
    }

    #[test]
    fn segments_stay_inside_the_em_box() {
        for (_, outline) in segment_outlines() {
            let (min, max) = aabb(&outline);
            assert!(min.x >= 0.0 && min.y >= 0.0);
            assert!(max.x <= BOX_W && max.y <= BOX_H);
        }
    }

    #[test]
    fn face_covers_letters_digits_and_space() {
        let face = builtin_face();
        for ch in ('A'..='Z').chain('0'..='9') {
            assert!(face.glyph(ch).is_some(), "missing glyph {ch:?}");
        }
        let space = face.glyph(' ').unwrap();
        assert!(space.contours.is_empty());
        assert!(space.advance > 0.0);
    }

    #[test]
    fn eight_uses_all_bars() {
        let face = builtin_face();
        assert_eq!(face.glyph('8').unwrap().contours.len(), 8);
        assert_eq!(face.glyph('X').unwrap().contours.len(), 4);
    }
}
