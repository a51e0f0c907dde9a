//! World state: every container the tick operates on, plus the event stream
//!
//! The world owns its entities in plain vectors with stable iteration
//! order, so a fixed seed and identical inputs replay identically. Dead
//! entities are marked during the tick and compacted at the end; nothing
//! is removed mid-iteration.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::body::{Body, BodyKind};
use super::grid::TileGrid;
use crate::consts::{PLAYER_SPEED, TILE_SIZE};
use crate::tuning::Tuning;

/// Entity id reserved for the player in movement events.
pub const PLAYER_ID: u32 = 0;

/// The player avatar: a body driven directly by per-tick input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Body,
    pub speed: f32,
    pub health: i32,
    /// Current aim angle, refreshed from input
    pub shooting_alpha: f32,
    /// Cooldown before the next shot, seconds
    pub shoot_delay: f32,
    /// Whether the player moved last tick (for start/stop edges)
    pub moving: bool,
}

impl Player {
    pub fn new(position: Vec2, tuning: &Tuning) -> Self {
        Self {
            body: Body::new(BodyKind::Player, position, Vec2::splat(TILE_SIZE)),
            speed: PLAYER_SPEED,
            health: tuning.player_health,
            shooting_alpha: 0.0,
            shoot_delay: 0.0,
            moving: false,
        }
    }

    pub fn alive(&self) -> bool {
        self.health > 0
    }
}

/// A projectile in flight. Travels along `alpha` at `speed` until it
/// leaves the world or its rotated mesh crosses something it can hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub body: Body,
    /// Direction of travel (also the mesh rotation)
    pub alpha: f32,
    pub speed: f32,
    pub damage: i32,
    /// Who fired it; bullets only hit the opposing side and walls
    pub owner: BodyKind,
}

/// Things that happened during a tick, for the audio/presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Fired { shooter: BodyKind },
    StartedMoving { id: u32 },
    StoppedMoving { id: u32 },
    BulletImpact { at: Vec2 },
    EnemyDied { id: u32 },
    PlayerDied,
}

/// Complete simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub tuning: Tuning,
    pub grid: TileGrid,
    /// Static wall bodies, one per blocked grid cell
    pub walls: Vec<Body>,
    pub player: Player,
    /// Sorted by id for deterministic iteration
    pub enemies: Vec<Agent>,
    pub bullets: Vec<Bullet>,
    /// Events emitted by the most recent tick
    pub events: Vec<GameEvent>,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tick_count: u64,
    next_id: u32,
}

impl World {
    /// Build a world over a finished tile grid: one wall body per blocked
    /// cell, the player at `player_pos`, no enemies or bullets yet.
    pub fn new(grid: TileGrid, tuning: Tuning, seed: u64, player_pos: Vec2) -> Self {
        let mut walls = Vec::new();
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                if grid.is_blocked(x, y) {
                    // Bottom-left anchor: the cell's bottom edge is one
                    // tile below its top in y-down storage
                    let pos = Vec2::new(x as f32 * TILE_SIZE, (y + 1) as f32 * TILE_SIZE);
                    walls.push(Body::new(BodyKind::Wall, pos, Vec2::splat(TILE_SIZE)));
                }
            }
        }
        log::info!(
            "world: {}x{} grid, {} walls, seed {}",
            grid.width(),
            grid.height(),
            walls.len(),
            seed
        );

        Self {
            player: Player::new(player_pos, &tuning),
            tuning,
            grid,
            walls,
            enemies: Vec::new(),
            bullets: Vec::new(),
            events: Vec::new(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tick_count: 0,
            next_id: PLAYER_ID + 1,
        }
    }

    /// Recompute every body's mesh corners. Meshes are derived state and
    /// skipped by serde, so call this once after deserializing a world.
    pub fn refresh_meshes(&mut self) {
        for wall in &mut self.walls {
            wall.update_mesh();
        }
        self.player.body.update_mesh();
        for enemy in &mut self.enemies {
            enemy.body.update_mesh();
        }
        for bullet in &mut self.bullets {
            bullet.body.update_mesh();
        }
    }

    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn an enemy agent at a world position.
    pub fn spawn_enemy(&mut self, position: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.enemies.push(Agent::new(id, position, &self.tuning));
        id
    }

    /// Spawn a bullet already positioned at its muzzle point.
    pub fn spawn_bullet(&mut self, position: Vec2, alpha: f32, speed: f32, owner: BodyKind) -> u32 {
        let id = self.next_entity_id();
        let mut body = Body::new(BodyKind::Bullet, position, Vec2::new(4.0, 2.0));
        body.alpha = alpha;
        body.update_mesh();
        self.bullets.push(Bullet {
            id,
            body,
            alpha,
            speed,
            damage: self.tuning.bullet_damage,
            owner,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_world() -> World {
        let grid = TileGrid::from_rows(&["####", "#..#", "####"]);
        World::new(grid, Tuning::default(), 7, Vec2::new(16.0, 32.0))
    }

    #[test]
    fn test_walls_built_from_blocked_cells() {
        let world = small_world();
        assert_eq!(world.walls.len(), 10);
        // Top-left cell: anchor at its bottom edge
        assert!(
            world
                .walls
                .iter()
                .any(|w| w.position == Vec2::new(0.0, 16.0))
        );
        // Bottom-right cell
        assert!(
            world
                .walls
                .iter()
                .any(|w| w.position == Vec2::new(48.0, 48.0))
        );
        assert!(world.walls.iter().all(|w| w.kind == BodyKind::Wall));
    }

    #[test]
    fn test_enemy_spawn_narrows_collision_box() {
        let mut world = small_world();
        let id = world.spawn_enemy(Vec2::new(32.0, 32.0));
        let enemy = &world.enemies[0];
        assert_eq!(enemy.id, id);
        // Half a tile plus 2 wide, 2 shorter than the sprite
        assert_eq!(enemy.body.collision_box, Vec2::new(10.0, 14.0));
        assert_eq!(enemy.body.size, Vec2::splat(TILE_SIZE));
    }

    #[test]
    fn test_entity_ids_are_unique_and_skip_player() {
        let mut world = small_world();
        let a = world.spawn_enemy(Vec2::new(16.0, 32.0));
        let b = world.spawn_bullet(Vec2::new(20.0, 20.0), 0.0, 65.0, BodyKind::Player);
        assert_ne!(a, PLAYER_ID);
        assert_ne!(b, PLAYER_ID);
        assert_ne!(a, b);
    }

    #[test]
    fn test_bullet_mesh_is_rotated_at_spawn() {
        let mut world = small_world();
        world.spawn_bullet(
            Vec2::new(100.0, 100.0),
            std::f32::consts::FRAC_PI_2,
            65.0,
            BodyKind::Enemy,
        );
        let bullet = &world.bullets[0];
        assert_eq!(bullet.body.alpha, std::f32::consts::FRAC_PI_2);
        // Fired straight up (y down in storage): the long axis runs
        // vertically, pointing toward -y like the velocity does
        let long_axis = bullet.body.mesh[3] - bullet.body.mesh[0];
        assert!(long_axis.x.abs() < 1e-4);
        assert!(long_axis.y < 0.0);
    }

    #[test]
    fn test_world_serde_round_trip_preserves_rng() {
        let mut world = small_world();
        world.spawn_enemy(Vec2::new(32.0, 32.0));

        let json = serde_json::to_string(&world).unwrap();
        let mut back: World = serde_json::from_str(&json).unwrap();
        back.refresh_meshes();

        assert_eq!(back.enemies.len(), 1);
        assert_eq!(back.walls[0].mesh, world.walls[0].mesh);
        assert_eq!(back.walls.len(), world.walls.len());
        // The rng state travels with the world, so replays continue
        // identically after a save/load
        assert_eq!(back.rng, world.rng);
    }
}
