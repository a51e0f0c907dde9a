//! Collision queries: broad-phase AABB, precise rotated mesh, visibility
//!
//! Obstacle lists are scanned linearly; there is no spatial index. That is
//! a deliberate scaling limit of this engine, sized for a few hundred wall
//! segments per map.

use glam::Vec2;

use super::body::Body;
use super::geom::{segment_intersection, segments_cross};
use crate::consts::TILE_SIZE;

/// Overlap margin subtracted on both axes so edge-touching bodies don't
/// count as colliding.
pub const AABB_EPSILON: f32 = 0.1;

/// Broad-phase AABB overlap test. Ignores rotation: always the un-rotated
/// collision box, in y-down storage (position anchors the bottom-left).
pub fn overlaps_fast(one: &Body, two: &Body) -> bool {
    let collision_x = one.position.x + one.collision_box_offset.x + one.collision_box.x
        > two.position.x + two.collision_box_offset.x + AABB_EPSILON
        && two.position.x + two.collision_box.x + two.collision_box_offset.x
            > one.position.x + one.collision_box_offset.x + AABB_EPSILON;

    let collision_y = one.position.y - one.collision_box_offset.y - one.collision_box.y
        < two.position.y - two.collision_box_offset.y - AABB_EPSILON
        && two.position.y - two.collision_box_offset.y - two.collision_box.y
            < one.position.y - one.collision_box_offset.y - AABB_EPSILON;

    collision_x && collision_y
}

/// Precise rotated-mesh overlap test; returns the first edge intersection
/// point found.
///
/// Cheap reject first: bodies more than 3 tile-widths apart on both axes
/// cannot touch, skipping the 16-pair edge scan. Used where rotation
/// matters (fast bullets against rotated bodies).
pub fn overlaps_precise(one: &Body, two: &Body) -> Option<Vec2> {
    if (one.position.x - two.position.x).abs() > 3.0 * TILE_SIZE
        && (one.position.y - two.position.y).abs() > 3.0 * TILE_SIZE
    {
        return None;
    }

    for i in 0..4 {
        let (a, b) = one.mesh_edge(i);
        for j in 0..4 {
            let (c, d) = two.mesh_edge(j);
            if let Some(p) = segment_intersection(a, b, c, d) {
                return Some(p);
            }
        }
    }
    None
}

/// True iff no obstacle edge blocks the segment from `p1` to `p2`.
pub fn point_visible(p1: Vec2, p2: Vec2, obstacles: &[Body]) -> bool {
    for obstacle in obstacles {
        for i in 0..4 {
            let (a, b) = obstacle.mesh_edge(i);
            if segments_cross(a, b, p1, p2) {
                return false;
            }
        }
    }
    true
}

/// True iff `target` is visible from every corner of `body`'s mesh.
///
/// The ray emanates from all 4 corners of the source mesh, not its center;
/// a sightline grazing a wall corner stays blocked until the whole body
/// clears it.
pub fn body_sees_point(body: &Body, target: Vec2, obstacles: &[Body]) -> bool {
    for obstacle in obstacles {
        for j in 0..4 {
            for i in 0..4 {
                let (a, b) = obstacle.mesh_edge(i);
                if segments_cross(a, b, body.mesh[j], target) {
                    return false;
                }
            }
        }
    }
    true
}

/// True iff every corner-to-corner segment between the two meshes is clear
/// of obstacle edges (full 4×4×N scan).
pub fn body_sees_body(one: &Body, two: &Body, obstacles: &[Body]) -> bool {
    for obstacle in obstacles {
        for k in 0..4 {
            for j in 0..4 {
                for i in 0..4 {
                    let (a, b) = obstacle.mesh_edge(i);
                    if segments_cross(a, b, one.mesh[j], two.mesh[k]) {
                        return false;
                    }
                }
            }
        }
    }
    true
}
