//! Player control intents
//!
//! Intents are applied the moment they arrive, not batched to the next tick,
//! so several steering messages may land between two ticks. Requests from
//! dead players, for unknown players, or inside the fire cooldown are silent
//! no-ops.

use crate::config::GameConfig;
use crate::publisher::GameEvent;
use crate::world::World;
use shared::{Laser, Player};
use std::f32::consts::FRAC_PI_2;

/// Continuous steering/thrust intent from keyboard style input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SteeringIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
}

/// Rotates by one fixed step per pressed direction and accelerates along the
/// current heading when thrusting.
pub fn steer(player: &mut Player, intent: SteeringIntent, config: &GameConfig) {
    if player.is_dead {
        return;
    }

    if intent.left {
        player.rotation -= config.player_rotation_speed;
    }
    if intent.right {
        player.rotation += config.player_rotation_speed;
    }

    if intent.up {
        let heading = player.heading();
        player.vel_x += heading.cos() * config.player_acceleration;
        player.vel_y += heading.sin() * config.player_acceleration;
    }
}

/// Overwrites the facing from a pointer angle (0 rad = east). Non-finite
/// angles are ignored. Returns whether the rotation changed.
pub fn set_facing(player: &mut Player, angle: f32) -> bool {
    if player.is_dead || !angle.is_finite() {
        return false;
    }
    player.rotation = angle + FRAC_PI_2;
    true
}

/// Spawns a laser at the ship's nose if the cooldown has elapsed.
pub fn fire(world: &mut World, player_id: u32, now: u64, config: &GameConfig) -> Option<GameEvent> {
    let player = world.players.get_mut(player_id)?;
    if player.is_dead || now.saturating_sub(player.last_shot_time) <= config.shoot_delay_ms {
        return None;
    }
    player.last_shot_time = now;

    let heading = player.heading();
    let (dir_x, dir_y) = (heading.cos(), heading.sin());
    let x = player.x + dir_x * config.laser_spawn_offset;
    let y = player.y + dir_y * config.laser_spawn_offset;
    let vel_x = dir_x * config.laser_speed + player.vel_x * config.laser_inherit_velocity;
    let vel_y = dir_y * config.laser_speed + player.vel_y * config.laser_inherit_velocity;

    world.lasers.insert_with(|id| Laser {
        id,
        owner_id: player_id,
        x,
        y,
        vel_x,
        vel_y,
    })?;

    Some(GameEvent::LaserFired { x, y })
}
