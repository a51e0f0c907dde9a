//! Segment-intersection primitive
//!
//! Single source of truth for every intersection-based query in the sim:
//! the precise mesh overlap test and all three visibility overloads funnel
//! through [`segment_intersection`].

use glam::Vec2;

/// Twice the signed area of triangle abc. Positive when c lies to one side
/// of ab, negative on the other; zero when collinear.
#[inline]
pub fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (a.x - c.x) * (b.y - c.y) - (a.y - c.y) * (b.x - c.x)
}

/// Intersection point of segments ab and cd, if they properly cross.
///
/// Both straddling conditions are tested via signed areas; the crossing
/// parameter comes from the area ratio. Degenerate and collinear segments
/// never intersect (the strict sign tests reject area products of zero),
/// so edge-touching contacts are not reported.
pub fn segment_intersection(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> Option<Vec2> {
    let a1 = triangle_area(a, b, d);
    let a2 = triangle_area(a, b, c);

    if a1 * a2 < 0.0 {
        let a3 = triangle_area(c, d, a);
        let a4 = a3 + a2 - a1;
        if a3 * a4 < 0.0 {
            let t = a3 / (a3 - a4);
            return Some(a + t * (b - a));
        }
    }

    None
}

/// Whether segments ab and cd properly cross.
#[inline]
pub fn segments_cross(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    segment_intersection(a, b, c, d).is_some()
}
