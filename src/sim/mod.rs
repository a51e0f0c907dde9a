//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod agent;
pub mod body;
pub mod collision;
pub mod geom;
pub mod grid;
pub mod resolve;
pub mod state;
pub mod tick;

pub use agent::{Agent, AgentState, AgentStep};
pub use body::{Body, BodyKind, MESH_INSET};
pub use collision::{
    AABB_EPSILON, body_sees_body, body_sees_point, overlaps_fast, overlaps_precise, point_visible,
};
pub use geom::{segment_intersection, segments_cross, triangle_area};
pub use grid::{Pathfinder, TileGrid};
pub use resolve::{separate_from_static, separate_pair};
pub use state::{Bullet, GameEvent, PLAYER_ID, Player, World};
pub use tick::{TickInput, tick};
