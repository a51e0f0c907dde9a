//! Penetration resolution: per-axis back-off after a motion step
//!
//! Given the displacement just applied this tick, figure out which axis of
//! motion caused an overlap, roll only that axis back, then creep forward
//! in 10% steps until the bodies just touch. Motion along the innocent
//! axis survives, which is what lets entities slide along walls.
//!
//! Call once per colliding pair per tick. Three-way overlaps are the
//! caller's job to feed through pairwise; residual overlap after that is
//! acceptable (best effort, not exact).

use glam::Vec2;

use super::body::Body;
use super::collision::overlaps_fast;

/// Hard cap on creep iterations. The full displacement re-creates the
/// overlap within 10 steps of 10%, so the loop converges well under this;
/// the cap keeps a broken invariant from hanging the tick.
const CREEP_STEPS_MAX: u32 = 16;

/// Separate a movable body from a static obstacle after `delta` was
/// applied to the body this tick.
pub fn separate_from_static(moving: &mut Body, obstacle: &Body, delta: Vec2) {
    let mut x_col = false;
    let mut y_col = false;

    moving.position.x -= delta.x;
    if overlaps_fast(moving, obstacle) {
        y_col = true;
    }
    moving.position.x += delta.x;

    moving.position.y -= delta.y;
    if overlaps_fast(moving, obstacle) {
        x_col = true;
    }
    moving.position.x -= delta.x;

    if !y_col {
        moving.position.y += delta.y;
    }
    if !x_col {
        moving.position.x += delta.x;
    }

    // A zero displacement cannot be crept along; that axis counts as
    // already resolved, otherwise the loop below would never progress.
    if delta.y == 0.0 {
        y_col = false;
    }
    if delta.x == 0.0 {
        x_col = false;
    }

    let mut steps = 0;
    while y_col {
        moving.position.y += delta.y * 0.1;
        steps += 1;
        if overlaps_fast(moving, obstacle) || steps > CREEP_STEPS_MAX {
            moving.position.y -= delta.y * 0.1;
            y_col = false;
        }
    }

    steps = 0;
    while x_col {
        moving.position.x += delta.x * 0.1;
        steps += 1;
        if overlaps_fast(moving, obstacle) || steps > CREEP_STEPS_MAX {
            moving.position.x -= delta.x * 0.1;
            x_col = false;
        }
    }

    moving.update_mesh();
}

/// Separate two movable bodies after `d1`/`d2` were applied this tick.
/// Symmetric two-body form of [`separate_from_static`]: both displacements
/// are undone and crept together, so each body keeps its share of the
/// motion along the innocent axis.
pub fn separate_pair(one: &mut Body, two: &mut Body, d1: Vec2, d2: Vec2) {
    let mut x_col = false;
    let mut y_col = false;

    one.position.x -= d1.x;
    two.position.x -= d2.x;
    if overlaps_fast(one, two) {
        y_col = true;
    }
    one.position.x += d1.x;
    two.position.x += d2.x;

    one.position.y -= d1.y;
    two.position.y -= d2.y;
    if overlaps_fast(one, two) {
        x_col = true;
    }
    one.position.x -= d1.x;
    two.position.x -= d2.x;

    if !y_col {
        one.position.y += d1.y;
        two.position.y += d2.y;
    }
    if !x_col {
        one.position.x += d1.x;
        two.position.x += d2.x;
    }

    if d1.y == 0.0 && d2.y == 0.0 {
        y_col = false;
    }
    if d1.x == 0.0 && d2.x == 0.0 {
        x_col = false;
    }

    let mut steps = 0;
    while y_col {
        one.position.y += d1.y * 0.1;
        two.position.y += d2.y * 0.1;
        steps += 1;
        if overlaps_fast(one, two) || steps > CREEP_STEPS_MAX {
            one.position.y -= d1.y * 0.1;
            two.position.y -= d2.y * 0.1;
            y_col = false;
        }
    }

    steps = 0;
    while x_col {
        one.position.x += d1.x * 0.1;
        two.position.x += d2.x * 0.1;
        steps += 1;
        if overlaps_fast(one, two) || steps > CREEP_STEPS_MAX {
            one.position.x -= d1.x * 0.1;
            two.position.x -= d2.x * 0.1;
            x_col = false;
        }
    }

    one.update_mesh();
    two.update_mesh();
}
