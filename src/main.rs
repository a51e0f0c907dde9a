//! Headless soak runner
//!
//! Drives the sim for a few thousand ticks over a fixed map with scripted
//! input and a deliberately dumb one-step path-finder, logging the event
//! stream. Useful for eyeballing behavior and profiling without a
//! renderer; the real game supplies its own A* through [`Pathfinder`].

use std::f32::consts::PI;

use glam::Vec2;
use gridfire::consts::SIM_DT;
use gridfire::sim::{GameEvent, Pathfinder, TickInput, TileGrid, World, tick};
use gridfire::tuning::Tuning;

/// One-step greedy path-finder: hands out whichever free neighbor of the
/// start cell shrinks the Manhattan distance to the goal. Walks into
/// dead ends that A* would avoid, which is fine for a soak map without
/// any.
struct GreedyStep;

impl Pathfinder for GreedyStep {
    fn find_path(&self, start: (i32, i32), goal: (i32, i32), grid: &TileGrid) -> Vec<usize> {
        let mut best: Option<(i32, usize)> = None;
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (nx, ny) = (start.0 + dx, start.1 + dy);
            if nx < 0 || ny < 0 || nx >= grid.width() as i32 || ny >= grid.height() as i32 {
                continue;
            }
            if grid.is_blocked(nx as usize, ny as usize) {
                continue;
            }
            let dist = (goal.0 - nx).abs() + (goal.1 - ny).abs();
            if best.is_none_or(|(d, _)| dist < d) {
                best = Some((dist, grid.index_of(nx, ny)));
            }
        }
        best.map(|(_, cell)| vec![cell]).unwrap_or_default()
    }
}

const MAP: &[&str] = &[
    "####################",
    "#........#.........#",
    "#........#.........#",
    "#...##...#....##...#",
    "#...##........##...#",
    "#........#.........#",
    "#........#.........#",
    "#...######.........#",
    "#..................#",
    "####################",
];

const SOAK_TICKS: u64 = 3600; // one simulated minute

fn main() {
    env_logger::init();

    let grid = TileGrid::from_rows(MAP);
    let mut world = World::new(grid, Tuning::default(), 0xF1E1D, Vec2::new(32.0, 48.0));
    world.spawn_enemy(Vec2::new(272.0, 48.0));
    world.spawn_enemy(Vec2::new(272.0, 128.0));

    let mut fired = 0u32;
    let mut impacts = 0u32;
    for i in 0..SOAK_TICKS {
        // Scripted input: wander in a slow circle, squeeze the trigger
        // twice a second, aim wherever we walk
        let angle = (i as f32 * SIM_DT * 0.4) % (2.0 * PI);
        let input = TickInput {
            move_angle: Some(angle),
            aim: Some(angle),
            fire: i % 30 == 0,
        };
        tick(&mut world, &GreedyStep, input);

        for event in &world.events {
            match event {
                GameEvent::Fired { .. } => fired += 1,
                GameEvent::BulletImpact { .. } => impacts += 1,
                GameEvent::EnemyDied { id } => log::info!("tick {i}: enemy {id} down"),
                GameEvent::PlayerDied => log::info!("tick {i}: player down"),
                _ => {}
            }
        }
        if !world.player.alive() {
            break;
        }
    }

    log::info!(
        "soak done: tick {}, {} shots, {} impacts, {} enemies left, {} bullets in flight",
        world.tick_count,
        fired,
        impacts,
        world.enemies.len(),
        world.bullets.len()
    );
    println!(
        "ticks={} shots={} impacts={} enemies={} player_hp={}",
        world.tick_count,
        fired,
        impacts,
        world.enemies.len(),
        world.player.health
    );
}
