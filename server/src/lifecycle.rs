//! Entity lifecycle: asteroid spawning and splitting, player respawn and
//! invincibility timers.

use crate::config::GameConfig;
use crate::publisher::GameEvent;
use crate::world::World;
use log::info;
use rand::Rng;
use shared::{Asteroid, AsteroidStage, Point, ASTEROID_RADIUS_JITTER};
use std::f32::consts::TAU;

/// Builds an outline of `stage.vertex_range()` vertices evenly spaced around
/// the center, starting at a random angle, each at the nominal radius
/// jittered by ±20%.
pub fn generate_outline<R: Rng>(rng: &mut R, stage: AsteroidStage) -> Vec<Point> {
    let (min_points, max_points) = stage.vertex_range();
    let count = rng.gen_range(min_points..=max_points);
    let radius = stage.radius();
    let offset = rng.gen_range(0.0..TAU);
    let step = TAU / count as f32;

    (0..count)
        .map(|i| {
            let angle = offset + i as f32 * step;
            let r = radius
                * rng.gen_range((1.0 - ASTEROID_RADIUS_JITTER)..=(1.0 + ASTEROID_RADIUS_JITTER));
            Point {
                x: angle.cos() * r,
                y: angle.sin() * r,
            }
        })
        .collect()
}

fn build_asteroid<R: Rng>(
    rng: &mut R,
    id: u32,
    stage: AsteroidStage,
    (x, y): (f32, f32),
    (vel_x, vel_y): (f32, f32),
) -> Asteroid {
    Asteroid {
        id,
        x,
        y,
        vel_x,
        vel_y,
        points: generate_outline(rng, stage),
        radius: stage.radius(),
        stage,
    }
}

/// Spawns an asteroid just outside a random edge, drifting at a random angle
/// with a speed drawn from the configured range. `None` once the id space is
/// used up.
pub fn spawn_at_edge<R: Rng>(
    world: &mut World,
    rng: &mut R,
    stage: AsteroidStage,
    config: &GameConfig,
) -> Option<u32> {
    let buffer = stage.radius() + config.asteroid_edge_buffer;
    let position = match rng.gen_range(0..4) {
        0 => (-buffer, rng.gen_range(0.0..config.world_height)),
        1 => (
            config.world_width + buffer,
            rng.gen_range(0.0..config.world_height),
        ),
        2 => (rng.gen_range(0.0..config.world_width), -buffer),
        _ => (
            rng.gen_range(0.0..config.world_width),
            config.world_height + buffer,
        ),
    };

    let angle = rng.gen_range(0.0..TAU);
    let speed = rng.gen_range(config.asteroid_speed_min..=config.asteroid_speed_max);
    let velocity = (angle.cos() * speed, angle.sin() * speed);

    world
        .asteroids
        .insert_with(|id| build_asteroid(rng, id, stage, position, velocity))
}

/// Replaces a destroyed asteroid by two children of the next smaller stage at
/// its position. Children keep at least the split minimum speed, head off at
/// random angles and move 1.0–1.5× faster than the (floored) parent speed.
/// Returns the new ids; empty for the smallest stage.
pub fn split<R: Rng>(
    world: &mut World,
    rng: &mut R,
    parent: &Asteroid,
    config: &GameConfig,
) -> Vec<u32> {
    let Some(stage) = parent.stage.smaller() else {
        return Vec::new();
    };

    let base_speed = parent.speed().max(config.split_min_speed());

    let mut children = Vec::with_capacity(2);
    for _ in 0..2 {
        let angle = rng.gen_range(0.0..TAU);
        let speed = base_speed * rng.gen_range(1.0..=1.5);
        let velocity = (angle.cos() * speed, angle.sin() * speed);
        let child = world.asteroids.insert_with(|id| {
            build_asteroid(&mut *rng, id, stage, (parent.x, parent.y), velocity)
        });
        children.extend(child);
    }
    children
}

/// Seeds the world with the configured number of large asteroids.
pub fn populate<R: Rng>(world: &mut World, rng: &mut R, config: &GameConfig) {
    for _ in 0..config.asteroid_start_count {
        spawn_at_edge(world, rng, AsteroidStage::Large, config);
    }
}

/// Spawns one large asteroid when the live count is under both the start
/// target and the hard cap.
pub fn replenish<R: Rng>(world: &mut World, rng: &mut R, config: &GameConfig) -> Option<u32> {
    let live = world.asteroids.len();
    if live < config.asteroid_start_count && live < config.asteroid_max_count {
        spawn_at_edge(world, rng, AsteroidStage::Large, config)
    } else {
        None
    }
}

/// Random position away from the edges, used for respawns.
pub fn respawn_position<R: Rng>(rng: &mut R, config: &GameConfig) -> (f32, f32) {
    (
        rng.gen_range(100.0..(config.world_width - 100.0).max(100.1)),
        rng.gen_range(100.0..(config.world_height - 100.0).max(100.1)),
    )
}

/// Random position for a fresh connection.
pub fn join_position<R: Rng>(rng: &mut R, config: &GameConfig) -> (f32, f32) {
    (
        rng.gen_range(50.0..(config.world_width - 50.0).max(50.1)).floor(),
        rng.gen_range(50.0..(config.world_height - 50.0).max(50.1)).floor(),
    )
}

/// Revives players whose respawn deadline has passed and clears expired
/// invincibility windows.
///
/// A revived player is moved to a random central position, loses its
/// momentum and facing, and becomes invincible for the configured duration.
/// A player that ran out of lives comes back with a full set and no score.
pub fn update_players<R: Rng>(
    world: &mut World,
    rng: &mut R,
    config: &GameConfig,
    now: u64,
    events: &mut Vec<GameEvent>,
) {
    for player in world.players.values_mut() {
        if player.is_dead && now >= player.respawn_time {
            let (x, y) = respawn_position(rng, config);
            player.is_dead = false;
            player.x = x;
            player.y = y;
            player.vel_x = 0.0;
            player.vel_y = 0.0;
            player.rotation = 0.0;
            player.is_invincible = true;
            player.invincible_until = now + config.invincibility_ms;

            if player.lives == 0 {
                info!("Player {} was out of lives, starting over", player.id);
                player.lives = config.player_start_lives;
                player.score = 0;
            }

            info!("Player {} respawned", player.id);
            events.push(GameEvent::PlayerRespawned { id: player.id });
        } else if player.is_invincible && now >= player.invincible_until {
            player.is_invincible = false;
        }
    }
}
