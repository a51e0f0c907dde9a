//! One fixed-timestep world update
//!
//! Tick order is part of the contract:
//! 1. agents decide and step, all reading the same start-of-tick snapshot
//!    (walls never move, the target position is captured once up front)
//! 2. the player steps from input, clamped to the world border per axis
//! 3. every movable body is separated from walls, then movable pairs from
//!    each other
//! 4. bullets advance, impacts are marked, damage lands
//! 5. dead entities are compacted out and the event list is final
//!
//! Nothing is removed from a container while it is being iterated.

use glam::Vec2;
use rand::Rng;

use super::body::BodyKind;
use super::collision::{overlaps_fast, overlaps_precise};
use super::grid::Pathfinder;
use super::resolve::{separate_from_static, separate_pair};
use super::state::{GameEvent, PLAYER_ID, World};
use crate::consts::{BULLET_SPEED, SIM_DT, TILE_SIZE, WORLD_HEIGHT, WORLD_WIDTH};
use crate::{aim_correction, shot_muzzle_offset};

/// Player intent for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Walk direction, math convention; `None` stands still
    pub move_angle: Option<f32>,
    /// New aim angle, if the aim changed this tick
    pub aim: Option<f32>,
    pub fire: bool,
}

/// Advance the world by one fixed timestep.
pub fn tick(world: &mut World, pathfinder: &impl Pathfinder, input: TickInput) {
    world.events.clear();
    world.tick_count += 1;
    let dt = SIM_DT;

    // Start-of-tick snapshot of the chase target: the player's box center,
    // biased to the convention waypoints use. Every agent reads the same
    // value regardless of processing order.
    let target = world.player.body.position + Vec2::new(TILE_SIZE / 2.0, -TILE_SIZE / 4.0);
    let player_alive = world.player.alive();

    // 1. Agent decisions
    let mut agent_deltas = Vec::with_capacity(world.enemies.len());
    let mut shots: Vec<(Vec2, Vec2, f32)> = Vec::new();
    for enemy in &mut world.enemies {
        if player_alive {
            enemy.set_destination(target);
        }
        let step = enemy.drive(dt, &world.walls, &world.grid, pathfinder, &world.tuning);

        if step.started_moving {
            world.events.push(GameEvent::StartedMoving { id: enemy.id });
        }
        if step.stopped_moving {
            world.events.push(GameEvent::StoppedMoving { id: enemy.id });
        }
        if let Some(aim) = step.fire {
            shots.push((enemy.body.position, enemy.body.collision_box, aim));
        }
        agent_deltas.push(step.delta);
    }
    for (shooter_pos, shooter_box, aim) in shots {
        let spread = world.tuning.shot_spread;
        let jitter = world.rng.random_range(-spread..=spread);
        // The muzzle sits on the box oval at the raw aim; only the flight
        // angle carries the jitter and the barrel correction
        let muzzle = shooter_pos + shot_muzzle_offset(shooter_box, aim);
        let flight = aim_correction(aim + jitter);
        world.spawn_bullet(muzzle, flight, BULLET_SPEED, BodyKind::Enemy);
        world.events.push(GameEvent::Fired {
            shooter: BodyKind::Enemy,
        });
    }

    // 2. Player step
    let mut player_delta = Vec2::ZERO;
    if player_alive {
        if let Some(aim) = input.aim {
            world.player.shooting_alpha = aim;
        }
        if let Some(a) = input.move_angle {
            let path = world.player.speed * dt;
            player_delta = Vec2::new(path * a.cos(), -path * a.sin());
            let player = &mut world.player;
            player.body.position += player_delta;

            // Border clamp, per axis: undo only the offending component
            let p = player.body.position;
            if p.x < 0.0 || p.x + player.body.collision_box.x > WORLD_WIDTH {
                player.body.position.x -= player_delta.x;
                player_delta.x = 0.0;
            }
            if p.y > WORLD_HEIGHT || p.y - player.body.collision_box.y < 0.0 {
                player.body.position.y -= player_delta.y;
                player_delta.y = 0.0;
            }
        }

        let moved = player_delta != Vec2::ZERO;
        if moved && !world.player.moving {
            world.player.moving = true;
            world.events.push(GameEvent::StartedMoving { id: PLAYER_ID });
        }
        if !moved && world.player.moving {
            world.player.moving = false;
            world.events.push(GameEvent::StoppedMoving { id: PLAYER_ID });
        }
        world.player.body.update_mesh();

        if input.fire && world.player.shoot_delay <= 0.0 {
            world.player.shoot_delay = world.tuning.shoot_delay;
            let aim = world.player.shooting_alpha;
            let muzzle = world.player.body.position
                + shot_muzzle_offset(world.player.body.collision_box, aim);
            world.spawn_bullet(muzzle, aim_correction(aim), BULLET_SPEED, BodyKind::Player);
            world.events.push(GameEvent::Fired {
                shooter: BodyKind::Player,
            });
        }
        if world.player.shoot_delay > 0.0 {
            world.player.shoot_delay -= dt;
        }
    }

    // 3a. Movable vs wall separation
    for (enemy, delta) in world.enemies.iter_mut().zip(&agent_deltas) {
        for wall in &world.walls {
            if overlaps_fast(&enemy.body, wall) {
                separate_from_static(&mut enemy.body, wall, *delta);
            }
        }
    }
    for wall in &world.walls {
        if overlaps_fast(&world.player.body, wall) {
            separate_from_static(&mut world.player.body, wall, player_delta);
        }
    }

    // 3b. Movable pair separation
    for i in 0..world.enemies.len() {
        for j in (i + 1)..world.enemies.len() {
            let (head, tail) = world.enemies.split_at_mut(j);
            let (one, two) = (&mut head[i], &mut tail[0]);
            if overlaps_fast(&one.body, &two.body) {
                separate_pair(&mut one.body, &mut two.body, agent_deltas[i], agent_deltas[j]);
            }
        }
        let enemy = &mut world.enemies[i];
        if overlaps_fast(&enemy.body, &world.player.body) {
            separate_pair(
                &mut enemy.body,
                &mut world.player.body,
                agent_deltas[i],
                player_delta,
            );
        }
    }

    // 4. Bullets advance and land
    for bullet in &mut world.bullets {
        let path = bullet.speed * dt;
        bullet.body.position += Vec2::new(path * bullet.alpha.cos(), -path * bullet.alpha.sin());
        bullet.body.update_mesh();
    }

    let mut dead_bullets = vec![false; world.bullets.len()];
    let mut enemy_hits: Vec<usize> = Vec::new();
    let mut player_hits = 0;
    for (bi, bullet) in world.bullets.iter().enumerate() {
        let p = bullet.body.position;
        if p.x < -TILE_SIZE
            || p.x > WORLD_WIDTH + TILE_SIZE
            || p.y < -TILE_SIZE
            || p.y > WORLD_HEIGHT + TILE_SIZE
        {
            dead_bullets[bi] = true;
            continue;
        }

        // Flesh before masonry: a bullet grazing both an entity and a wall
        // in the same tick deals its damage
        match bullet.owner {
            BodyKind::Player => {
                for (ei, enemy) in world.enemies.iter().enumerate() {
                    if let Some(at) = overlaps_precise(&bullet.body, &enemy.body) {
                        dead_bullets[bi] = true;
                        enemy_hits.push(ei);
                        world.events.push(GameEvent::BulletImpact { at });
                        break;
                    }
                }
            }
            _ => {
                if player_alive {
                    if let Some(at) = overlaps_precise(&bullet.body, &world.player.body) {
                        dead_bullets[bi] = true;
                        player_hits += 1;
                        world.events.push(GameEvent::BulletImpact { at });
                    }
                }
            }
        }
        if dead_bullets[bi] {
            continue;
        }

        if let Some(at) = world
            .walls
            .iter()
            .find_map(|wall| overlaps_precise(&bullet.body, wall))
        {
            dead_bullets[bi] = true;
            world.events.push(GameEvent::BulletImpact { at });
        }
    }

    let damage = world.tuning.bullet_damage;
    let mut kills = 0;
    for ei in enemy_hits {
        let enemy = &mut world.enemies[ei];
        let was_alive = enemy.health > 0;
        enemy.health -= damage;
        if was_alive && enemy.health <= 0 {
            log::debug!("agent {} died", enemy.id);
            world.events.push(GameEvent::EnemyDied { id: enemy.id });
            kills += 1;
        }
    }
    if kills > 0 && player_alive {
        world.player.health = (world.player.health + world.tuning.heal_on_kill * kills)
            .min(world.tuning.max_health);
    }
    if player_hits > 0 && player_alive {
        world.player.health -= damage * player_hits;
        if !world.player.alive() {
            log::info!("player died on tick {}", world.tick_count);
            world.events.push(GameEvent::PlayerDied);
        }
    }

    // 5. Compact the dead
    let mut keep = dead_bullets.iter();
    world.bullets.retain(|_| !*keep.next().unwrap());
    world.enemies.retain(|e| e.health > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::agent::AgentState;
    use crate::sim::grid::TileGrid;
    use crate::tuning::Tuning;

    struct NoPath;
    impl Pathfinder for NoPath {
        fn find_path(&self, _: (i32, i32), _: (i32, i32), _: &TileGrid) -> Vec<usize> {
            Vec::new()
        }
    }

    /// 10x6 room with a solid border.
    fn room() -> TileGrid {
        TileGrid::from_rows(&[
            "##########",
            "#........#",
            "#........#",
            "#........#",
            "#........#",
            "##########",
        ])
    }

    fn room_world() -> World {
        World::new(room(), Tuning::default(), 42, Vec2::new(32.0, 48.0))
    }

    fn move_east() -> TickInput {
        TickInput {
            move_angle: Some(0.0),
            ..TickInput::default()
        }
    }

    #[test]
    fn test_player_walks_east() {
        let mut world = room_world();
        let x0 = world.player.body.position.x;

        tick(&mut world, &NoPath, move_east());

        assert!(world.player.body.position.x > x0);
        assert!(world.events.contains(&GameEvent::StartedMoving { id: PLAYER_ID }));
    }

    #[test]
    fn test_player_stopped_by_wall() {
        let mut world = room_world();
        // Walk east into the right border wall for plenty of ticks
        for _ in 0..2000 {
            tick(&mut world, &NoPath, move_east());
        }
        let p = &world.player.body;
        // Held left of the right wall's inner face at x=144
        assert!(p.position.x + p.collision_box.x <= 144.0 + 0.5);
        for wall in &world.walls {
            assert!(!overlaps_fast(p, wall));
        }
    }

    #[test]
    fn test_player_fire_spawns_bullet_on_cooldown() {
        let mut world = room_world();
        let input = TickInput {
            aim: Some(0.0),
            fire: true,
            ..TickInput::default()
        };

        tick(&mut world, &NoPath, input);
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].owner, BodyKind::Player);
        assert!(world.events.contains(&GameEvent::Fired {
            shooter: BodyKind::Player
        }));

        // Cooldown holds the trigger
        tick(&mut world, &NoPath, input);
        assert_eq!(world.bullets.len(), 1);
    }

    #[test]
    fn test_bullet_despawns_on_wall_impact() {
        let mut world = room_world();
        // Fire east from the middle of the room; the bullet must cross
        // ~100 units to the right wall at 65 u/s
        tick(
            &mut world,
            &NoPath,
            TickInput {
                aim: Some(0.0),
                fire: true,
                ..TickInput::default()
            },
        );
        assert_eq!(world.bullets.len(), 1);

        let mut impact = false;
        for _ in 0..200 {
            tick(&mut world, &NoPath, TickInput::default());
            if world
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::BulletImpact { .. }))
            {
                impact = true;
                break;
            }
        }
        assert!(impact, "bullet never landed");
        assert!(world.bullets.is_empty(), "bullet not compacted");
    }

    #[test]
    fn test_player_bullets_wear_down_enemy() {
        let mut world = room_world();
        let id = world.spawn_enemy(Vec2::new(112.0, 48.0));
        let health = world.tuning.enemy_health;

        // Fire east point-blank until the enemy dies; one shot per
        // cooldown window
        let mut died = false;
        for _ in 0..(health as usize * 90) {
            tick(
                &mut world,
                &NoPath,
                TickInput {
                    aim: Some(0.0),
                    fire: true,
                    ..TickInput::default()
                },
            );
            if world.events.contains(&GameEvent::EnemyDied { id }) {
                died = true;
                break;
            }
        }
        assert!(died, "enemy survived sustained fire");
        assert!(world.enemies.is_empty(), "dead enemy not compacted");
    }

    #[test]
    fn test_enemy_engages_visible_player() {
        let mut world = room_world();
        // Close and in clear line of sight: seek -> chase -> stall, one
        // transition per tick
        world.spawn_enemy(Vec2::new(96.0, 48.0));

        tick(&mut world, &NoPath, TickInput::default());
        assert_eq!(world.enemies[0].state, AgentState::Chase);

        tick(&mut world, &NoPath, TickInput::default());
        assert_eq!(world.enemies[0].state, AgentState::Stall);
        assert!(world.events.contains(&GameEvent::Fired {
            shooter: BodyKind::Enemy
        }));
        assert_eq!(world.bullets.len(), 1);
        assert_eq!(world.bullets[0].owner, BodyKind::Enemy);
    }

    #[test]
    fn test_same_seed_same_inputs_replay_identically() {
        let run = || {
            let mut world = room_world();
            world.spawn_enemy(Vec2::new(112.0, 80.0));
            for i in 0..120 {
                let input = TickInput {
                    move_angle: (i % 3 != 0).then_some(0.0),
                    aim: Some(1.0),
                    fire: i % 7 == 0,
                };
                tick(&mut world, &NoPath, input);
            }
            world
        };

        let a = run();
        let b = run();
        assert_eq!(a.player.body.position, b.player.body.position);
        assert_eq!(a.bullets.len(), b.bullets.len());
        assert_eq!(
            a.enemies.iter().map(|e| e.body.position).collect::<Vec<_>>(),
            b.enemies.iter().map(|e| e.body.position).collect::<Vec<_>>(),
        );
        assert_eq!(a.rng, b.rng);
    }

    #[test]
    fn test_pair_separation_holds_walker_out() {
        let mut world = room_world();
        // Geometry only: a huge cooldown keeps guns out of the picture
        world.tuning.shoot_delay = 1e9;
        world.spawn_enemy(Vec2::new(112.0, 48.0));

        // The enemy closes to stall range and stands; the player then
        // walks east into it for a long while
        for _ in 0..900 {
            tick(&mut world, &NoPath, move_east());
        }
        let enemy = &world.enemies[0];
        let player = &world.player.body;
        assert!(!overlaps_fast(player, &enemy.body));
        assert!(player.position.x + player.collision_box.x <= enemy.body.position.x + 1.0);
    }

    #[test]
    fn test_player_shot_muzzle_uses_raw_aim() {
        let mut world = room_world();
        tick(
            &mut world,
            &NoPath,
            TickInput {
                aim: Some(0.0),
                fire: true,
                ..TickInput::default()
            },
        );

        let bullet = &world.bullets[0];
        // Flight angle carries the barrel correction...
        assert_eq!(bullet.alpha, crate::aim_correction(0.0));
        // ...but the muzzle sits on the box oval at the raw aim: mid-height
        // of the shooter, not nudged by the correction. One tick of flight
        // moves it well under 0.05 vertically.
        assert!((bullet.body.position.y - 40.0).abs() < 0.05);
    }

    #[test]
    fn test_bullet_outlives_exact_world_edge_by_a_tile() {
        let mut world = room_world();
        world.spawn_bullet(Vec2::new(1023.5, 100.0), 0.0, 65.0, BodyKind::Player);

        tick(&mut world, &NoPath, TickInput::default());
        // Past the edge but inside the one-tile grace margin
        assert_eq!(world.bullets.len(), 1);
        assert!(world.bullets[0].body.position.x > 1024.0);

        for _ in 0..20 {
            tick(&mut world, &NoPath, TickInput::default());
        }
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_bullet_grazing_enemy_and_wall_damages_enemy() {
        let mut world = room_world();
        // Enemy one unit clear of the right wall face at x=144; a 4-long
        // bullet placed to cross the enemy's right mesh edge and the
        // wall's left edge in the same tick
        world.spawn_enemy(Vec2::new(134.0, 48.0));
        world.spawn_bullet(
            Vec2::new(142.0 - 65.0 / 60.0, 40.0),
            0.0,
            65.0,
            BodyKind::Player,
        );

        tick(&mut world, &NoPath, TickInput::default());

        assert_eq!(
            world.enemies[0].health,
            Tuning::default().enemy_health - 1,
            "entity hit must win over the wall hit"
        );
        assert!(world.bullets.is_empty());
    }

    #[test]
    fn test_kill_heals_player() {
        let mut world = room_world();
        world.player.health = 2;
        let id = world.spawn_enemy(Vec2::new(112.0, 48.0));
        world.enemies[0].health = 1;
        world.enemies[0].shoot_delay = 1e9;

        let mut killed = false;
        for _ in 0..120 {
            tick(
                &mut world,
                &NoPath,
                TickInput {
                    aim: Some(0.0),
                    fire: true,
                    ..TickInput::default()
                },
            );
            if world.events.contains(&GameEvent::EnemyDied { id }) {
                killed = true;
                break;
            }
        }
        assert!(killed);
        assert_eq!(world.player.health, 3);
    }

    #[test]
    fn test_kill_heal_respects_cap() {
        let mut world = room_world();
        world.player.health = world.tuning.max_health;
        let id = world.spawn_enemy(Vec2::new(112.0, 48.0));
        world.enemies[0].health = 1;
        world.enemies[0].shoot_delay = 1e9;

        for _ in 0..120 {
            tick(
                &mut world,
                &NoPath,
                TickInput {
                    aim: Some(0.0),
                    fire: true,
                    ..TickInput::default()
                },
            );
            if world.events.contains(&GameEvent::EnemyDied { id }) {
                break;
            }
        }
        assert_eq!(world.player.health, world.tuning.max_health);
    }

    #[test]
    fn test_player_death_emits_once_and_stops_input() {
        let mut world = room_world();
        world.player.health = 1;
        // Stalled enemy right next to the player fires immediately
        world.spawn_enemy(Vec2::new(64.0, 48.0));

        let mut died = false;
        for _ in 0..600 {
            tick(&mut world, &NoPath, move_east());
            if world.events.contains(&GameEvent::PlayerDied) {
                died = true;
                break;
            }
        }
        assert!(died, "player survived point-blank fire");
        assert!(!world.player.alive());

        // Dead players don't walk
        let at = world.player.body.position;
        tick(&mut world, &NoPath, move_east());
        assert_eq!(world.player.body.position, at);
    }
}
