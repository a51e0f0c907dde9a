//! Collision body shared by every entity kind
//!
//! One closed tagged variant covers players, enemies, bullets and walls;
//! queries and the resolver switch on capability (`is_movable`), never on
//! a concrete kind, so new kinds only touch this file.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Inset applied to the far mesh corners so sprites touching pixel-exact
/// don't register as intersecting.
pub const MESH_INSET: f32 = 1.0;

/// What a body is, gameplay-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Player,
    Enemy,
    Bullet,
    Wall,
}

impl BodyKind {
    /// Movable bodies get displacement applied and resolved; walls don't.
    pub fn is_movable(self) -> bool {
        !matches!(self, BodyKind::Wall)
    }
}

/// Geometry of one entity: an axis-aligned collision box for the broad
/// phase and four rotated mesh corners for the precise tests.
///
/// `position` anchors the bottom-left of the box in y-down storage; the box
/// extends toward +x and -y. `mesh` is derived state: call [`Body::update_mesh`]
/// after any change to position, box fields or `alpha` and before any
/// precise or visibility query (the tick does this once per moved body).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub kind: BodyKind,
    pub position: Vec2,
    /// Visual footprint (sprite quad)
    pub size: Vec2,
    /// Width/height of the collision box
    pub collision_box: Vec2,
    /// Inset of the collision box from the visual box
    pub collision_box_offset: Vec2,
    /// Rotation of the mesh, radians
    pub alpha: f32,
    /// Rotated corner points; consecutive pairs form the quad's 4 edges
    #[serde(skip)]
    pub mesh: [Vec2; 4],
}

impl Body {
    pub fn new(kind: BodyKind, position: Vec2, size: Vec2) -> Self {
        let mut body = Self {
            kind,
            position,
            size,
            collision_box: size,
            collision_box_offset: Vec2::ZERO,
            alpha: 0.0,
            mesh: [Vec2::ZERO; 4],
        };
        body.update_mesh();
        body
    }

    /// Recompute the 4 mesh corners from the collision box, rotated by
    /// `alpha` about the position anchor, then translated to world space.
    pub fn update_mesh(&mut self) {
        let ox = self.collision_box_offset.x;
        let oy = self.collision_box_offset.y;
        let w = self.collision_box.x;
        let h = self.collision_box.y;

        let mut corners = [
            Vec2::new(ox, -oy),
            Vec2::new(ox, -h - oy + MESH_INSET),
            Vec2::new(w + ox - MESH_INSET, -h - oy + MESH_INSET),
            Vec2::new(w + ox - MESH_INSET, -oy),
        ];

        // Negative angle: alpha is math-convention (y up) but corners live
        // in y-down storage, so the rotation runs the other way. Keeps a
        // box's long axis parallel to a velocity of (cos a, -sin a).
        let rot = Vec2::from_angle(-self.alpha);
        for corner in &mut corners {
            *corner = rot.rotate(*corner) + self.position;
        }
        self.mesh = corners;
    }

    /// Edge i of the mesh quad, i in 0..4.
    #[inline]
    pub fn mesh_edge(&self, i: usize) -> (Vec2, Vec2) {
        (self.mesh[i], self.mesh[(i + 1) % 4])
    }
}
