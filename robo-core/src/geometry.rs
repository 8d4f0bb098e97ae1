//! Triangle-fan builders for robot parts.
//!
//! Every part is a single convex-ish fan: a center vertex followed by the
//! border, with the first border vertex repeated to close the loop. The
//! per-vertex `shade` is the blend factor from the dark core color to the
//! part's fill color, so fans with a low center shade glow at the rim.

use crate::{color::Color, render::MeshHandle};
use glam::Vec2;

/// One vertex of a triangle fan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanVertex {
    pub pos: Vec2,
    pub shade: f32,
}

/// A closed triangle fan around its first vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fan {
    pub verts: Vec<FanVertex>,
}

impl Fan {
    /// Number of triangles the fan rasterizes to.
    pub fn triangle_count(&self) -> usize {
        self.verts.len().saturating_sub(2)
    }
}

/// A drawable part descriptor owned by a node.
///
/// ### Fields
/// - `fan` - CPU-side vertex data in the node's local space.
/// - `z` - Paint order key before the unit's own offset is added.
/// - `color` - Fill color at the rim of the fan.
/// - `h` - Lowest local y reached by the part, used for extent folding.
/// - `mesh` - Handle of the uploaded mesh, `None` until uploaded and
///   again after release.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub fan: Fan,
    pub z: f32,
    pub color: Color,
    pub h: f32,
    pub mesh: Option<MeshHandle>,
}

/// Builds a stack of trapezoids sharing their boundary edges.
///
/// `widths[i]` is the full width at height `heights[i]`; there are
/// `widths.len() - 1` segments. The center vertex sits halfway between the
/// first and last boundary with shade `0`, every border vertex has shade `1`.
///
/// ### Panics
/// Panics if `widths` and `heights` differ in length or have fewer than two
/// boundaries.
pub fn segmented_rect(widths: &[f32], heights: &[f32], color: Color, z: f32) -> Geometry {
    assert_eq!(widths.len(), heights.len(), "one height per width boundary");
    assert!(widths.len() >= 2, "a segmented rect needs at least one segment");
    let last = widths.len() - 1;
    let expected = 2 + (last + 1) * 2;

    let mut verts = Vec::with_capacity(expected);
    verts.push(FanVertex {
        pos: Vec2::new(0.0, heights[0] + (heights[last] - heights[0]) / 2.0),
        shade: 0.0,
    });
    // Down the left side, then back up the right side.
    for (w, h) in widths.iter().zip(heights) {
        verts.push(rim(-w / 2.0, *h));
    }
    for (w, h) in widths.iter().zip(heights).rev() {
        verts.push(rim(w / 2.0, *h));
    }
    verts.push(rim(-widths[0] / 2.0, heights[0]));
    assert_eq!(verts.len(), expected, "segmented rect vertex count");

    Geometry {
        fan: Fan { verts },
        z,
        color,
        h: heights[last],
        mesh: None,
    }
}

/// Builds a fan whose center is the average of the border vertices.
///
/// ### Parameters
/// - `border` - Border vertices in winding order.
/// - `center_shade` - Shade of the center vertex.
/// - `color` - Rim fill color.
/// - `z` - Paint order key.
pub fn fan_from_border(border: &[Vec2], center_shade: f32, color: Color, z: f32) -> Geometry {
    assert!(!border.is_empty(), "fan border must have vertices");
    let expected = 2 + border.len();
    let sum: Vec2 = border.iter().copied().sum();
    let y_max = border.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);

    let mut verts = Vec::with_capacity(expected);
    verts.push(FanVertex {
        pos: sum / border.len() as f32,
        shade: center_shade,
    });
    verts.extend(border.iter().map(|v| rim(v.x, v.y)));
    verts.push(rim(border[0].x, border[0].y));
    assert_eq!(verts.len(), expected, "border fan vertex count");

    Geometry {
        fan: Fan { verts },
        z,
        color,
        h: y_max,
        mesh: None,
    }
}

/// Mirrors a border horizontally, reversing the order to keep the winding.
pub fn mirror(verts: &mut [Vec2]) {
    for v in verts.iter_mut() {
        v.x = -v.x;
    }
    verts.reverse();
}

/// Adds `delta` to every value.
pub fn shift(values: &mut [f32], delta: f32) {
    for v in values {
        *v += delta;
    }
}

#[inline]
fn rim(x: f32, y: f32) -> FanVertex {
    FanVertex {
        pos: Vec2::new(x, y),
        shade: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segmented_rect_closes_the_loop() {
        let g = segmented_rect(&[40.0, 20.0], &[-10.0, 10.0], Color::HULL, 105.0);
        let v = &g.fan.verts;
        assert_eq!(v.len(), 6);
        assert_eq!(v[0].pos, Vec2::new(0.0, 0.0));
        assert_eq!(v[0].shade, 0.0);
        assert_eq!(v[1].pos, Vec2::new(-20.0, -10.0));
        assert_eq!(v[2].pos, Vec2::new(-10.0, 10.0));
        assert_eq!(v[3].pos, Vec2::new(10.0, 10.0));
        assert_eq!(v[4].pos, Vec2::new(20.0, -10.0));
        assert_eq!(v[5].pos, v[1].pos);
        assert_eq!(g.h, 10.0);
        assert_eq!(g.fan.triangle_count(), 4);
    }

    #[test]
    fn multi_segment_rect_has_expected_vertex_count() {
        let g = segmented_rect(&[100.0, 150.0, 120.0], &[-20.0, 90.0, 200.0], Color::HULL, 100.0);
        assert_eq!(g.fan.verts.len(), 2 + 3 * 2);
        assert_eq!(g.h, 200.0);
    }

    #[test]
    fn border_fan_centers_on_average() {
        let border = [
            Vec2::new(2.0, -1.0),
            Vec2::new(-2.0, -1.0),
            Vec2::new(0.0, 2.0),
        ];
        let g = fan_from_border(&border, 0.9, Color::HULL, 120.0);
        assert_eq!(g.fan.verts.len(), 5);
        assert_eq!(g.fan.verts[0].pos, Vec2::new(0.0, 0.0));
        assert_eq!(g.fan.verts[0].shade, 0.9);
        assert_eq!(g.fan.verts[4].pos, border[0]);
        assert_eq!(g.h, 2.0);
    }

    #[test]
    fn mirror_negates_and_reverses() {
        let mut v = vec![Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0), Vec2::new(3.0, 2.0)];
        mirror(&mut v);
        assert_eq!(
            v,
            vec![Vec2::new(-3.0, 2.0), Vec2::new(-2.0, 1.0), Vec2::new(-1.0, 0.0)]
        );
    }

    #[test]
    fn shift_moves_every_value() {
        let mut v = [0.0, 30.0, 75.0];
        shift(&mut v, -15.0);
        assert_eq!(v, [-15.0, 15.0, 60.0]);
    }
}
