//! Gridfire - deterministic core for a top-down tile-based action game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (collision queries, penetration
//!   resolution, AI state machine, world tick)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, audio playback and the A* path-finder are external
//! collaborators: the sim exposes positions, mesh corners, facing buckets
//! and per-tick events, and consumes paths through the [`sim::Pathfinder`]
//! trait.
//!
//! Coordinate convention: world y grows downward in storage (an entity's
//! `position` anchors the bottom-left of its box; the box extends toward
//! smaller y and larger x). Angles are mathematical (y up), in [0, 2π);
//! the `direction_to` helper does the flip.

pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// World and simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// World-space width/height of one grid cell
    pub const TILE_SIZE: f32 = 16.0;

    /// Virtual world dimensions
    pub const WORLD_WIDTH: f32 = 1024.0;
    pub const WORLD_HEIGHT: f32 = 640.0;

    /// Tile grid dimensions
    pub const GRID_WIDTH: usize = (WORLD_WIDTH / TILE_SIZE) as usize;
    pub const GRID_HEIGHT: usize = (WORLD_HEIGHT / TILE_SIZE) as usize;

    /// Default movement speeds (world units per second)
    pub const PLAYER_SPEED: f32 = 32.0;
    pub const BULLET_SPEED: f32 = 65.0;
}

/// Direction from `from` to `to` as an angle in [0, 2π).
///
/// Single-argument arctangent resolved by quadrant, with the y axis flipped
/// from storage (y down) to math (y up). The boundary convention feeds the
/// [`Facing`] buckets and must not change.
///
/// Coincident points produce NaN (degenerate input is not checked here);
/// callers that can legitimately hit that case guard for it.
pub fn direction_to(from: Vec2, to: Vec2) -> f32 {
    use std::f32::consts::PI;
    let dx = to.x - from.x;
    let dy = from.y - to.y;

    if dx >= 0.0 && dy >= 0.0 {
        (dy / dx).atan()
    } else if dx >= 0.0 && dy < 0.0 {
        (dy / dx).atan() + 2.0 * PI
    } else {
        (dy / dx).atan() + PI
    }
}

/// Sprite orientation bucket derived from a facing angle.
///
/// Buckets are π/4 wide around 0, π/2, π and 3π/2; the half-open interval
/// boundaries match the angle chain the renderer keys its tilesets on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Facing {
    #[default]
    East,
    North,
    West,
    South,
}

impl Facing {
    /// Map an angle in [0, 2π) to its bucket.
    pub fn from_angle(a: f32) -> Self {
        use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI};
        if a > 3.0 * FRAC_PI_2 + FRAC_PI_4 || a <= FRAC_PI_4 {
            Facing::East
        } else if a <= FRAC_PI_2 + FRAC_PI_4 {
            Facing::North
        } else if a < PI + FRAC_PI_4 {
            Facing::West
        } else {
            Facing::South
        }
    }
}

/// Nudge an aim angle so shots line up with the sprite's barrel.
///
/// The rotation pivot sits at the bottom-left corner, so east/west facings
/// need a small constant correction.
pub fn aim_correction(a: f32) -> f32 {
    match Facing::from_angle(a) {
        Facing::East => a - 0.02,
        Facing::North => a,
        Facing::West => a + 0.02,
        Facing::South => a,
    }
}

/// Muzzle offset on the collision-box oval for a shot fired at angle `a`.
///
/// Relative to the shooter's `position` (bottom-left anchor, y down).
pub fn shot_muzzle_offset(collision_box: Vec2, a: f32) -> Vec2 {
    let mut x = collision_box.x / 2.0;
    let mut y = -collision_box.y / 2.0;
    x += a.cos() * collision_box.x / 2.0;
    y -= a.sin() * collision_box.y / 2.0;
    Vec2::new(x, y)
}
