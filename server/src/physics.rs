//! Per-tick motion integration
//!
//! Velocities are expressed in world units per tick, so every step is a plain
//! `position += velocity`. Rotation is never touched here; it only changes in
//! response to input.

use crate::config::GameConfig;
use crate::world::World;
use shared::{Asteroid, Laser, Player};

/// Applies drag and moves a live ship, wrapping at the exact world bounds.
pub fn step_player(player: &mut Player, config: &GameConfig) {
    player.vel_x *= config.player_friction;
    player.vel_y *= config.player_friction;

    player.x += player.vel_x;
    player.y += player.vel_y;

    wrap_player(player, config.world_width, config.world_height);
}

/// Ships leaving one side reappear on the opposite edge, with no margin.
pub fn wrap_player(player: &mut Player, width: f32, height: f32) {
    if player.x < 0.0 {
        player.x = width;
    } else if player.x > width {
        player.x = 0.0;
    }

    if player.y < 0.0 {
        player.y = height;
    } else if player.y > height {
        player.y = 0.0;
    }
}

/// Moves a laser. Returns false once it has left the playfield plus margin.
pub fn step_laser(laser: &mut Laser, config: &GameConfig) -> bool {
    laser.x += laser.vel_x;
    laser.y += laser.vel_y;

    let margin = config.laser_bounds_margin;
    laser.x >= -margin
        && laser.x <= config.world_width + margin
        && laser.y >= -margin
        && laser.y <= config.world_height + margin
}

/// Moves an asteroid and wraps each axis independently.
pub fn step_asteroid(asteroid: &mut Asteroid, config: &GameConfig) {
    asteroid.x += asteroid.vel_x;
    asteroid.y += asteroid.vel_y;

    let radius = asteroid.radius;
    asteroid.x = wrap_with_buffer(asteroid.x, config.world_width, radius);
    asteroid.y = wrap_with_buffer(asteroid.y, config.world_height, radius);
}

/// Wraps a coordinate so that an object is fully off-screen before it jumps:
/// past `-buffer` it reappears at `extent + buffer`, and past
/// `extent + buffer` it reappears at `-buffer`.
pub fn wrap_with_buffer(value: f32, extent: f32, buffer: f32) -> f32 {
    if value < -buffer {
        extent + buffer
    } else if value > extent + buffer {
        -buffer
    } else {
        value
    }
}

/// Advances every movable entity by one tick.
///
/// Dead players are frozen until they respawn. Lasers that leave the
/// playfield are removed here; the number removed is returned.
pub fn integrate(world: &mut World, config: &GameConfig) -> usize {
    for player in world.players.values_mut() {
        if player.is_dead {
            continue;
        }
        step_player(player, config);
    }

    let before = world.lasers.len();
    world.lasers.retain(|_, laser| step_laser(laser, config));
    let expired = before - world.lasers.len();

    for asteroid in world.asteroids.values_mut() {
        step_asteroid(asteroid, config);
    }

    expired
}
