//! Server and gameplay configuration
//!
//! `GameConfig` carries every gameplay tunable read by the simulation. Its
//! defaults come from the constants in `shared`, so a client built against the
//! same crate agrees with a default server. `ServerConfig` adds the process
//! level settings parsed from the command line in `main.rs`.

use shared::*;
use std::time::Duration;

/// Gameplay tunables. All speeds are in world units per tick, all timers in
/// milliseconds.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub world_width: f32,
    pub world_height: f32,

    pub player_radius: f32,
    pub player_rotation_speed: f32,
    pub player_acceleration: f32,
    pub player_friction: f32,
    pub player_start_lives: u32,
    pub invincibility_ms: u64,
    pub respawn_delay_ms: u64,

    pub laser_speed: f32,
    pub laser_inherit_velocity: f32,
    pub laser_spawn_offset: f32,
    pub laser_bounds_margin: f32,
    pub shoot_delay_ms: u64,

    pub asteroid_speed_min: f32,
    pub asteroid_speed_max: f32,
    /// Replenishment target. Also the size of the initial population.
    pub asteroid_start_count: usize,
    /// Hard cap on live asteroids for replenishment.
    pub asteroid_max_count: usize,
    pub asteroid_edge_buffer: f32,

    pub points_per_asteroid_hit: u32,
    pub points_per_player_hit: u32,
    pub winning_score: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            player_radius: PLAYER_RADIUS,
            player_rotation_speed: PLAYER_ROTATION_SPEED,
            player_acceleration: PLAYER_ACCELERATION,
            player_friction: PLAYER_FRICTION,
            player_start_lives: PLAYER_START_LIVES,
            invincibility_ms: PLAYER_INVINCIBILITY_MS,
            respawn_delay_ms: PLAYER_RESPAWN_DELAY_MS,
            laser_speed: LASER_SPEED,
            laser_inherit_velocity: LASER_INHERIT_VELOCITY,
            laser_spawn_offset: LASER_SPAWN_OFFSET,
            laser_bounds_margin: LASER_BOUNDS_MARGIN,
            shoot_delay_ms: SHOOT_DELAY_MS,
            asteroid_speed_min: ASTEROID_SPEED_MIN,
            asteroid_speed_max: ASTEROID_SPEED_MAX,
            asteroid_start_count: ASTEROID_START_COUNT,
            asteroid_max_count: ASTEROID_MAX_COUNT,
            asteroid_edge_buffer: ASTEROID_EDGE_BUFFER,
            points_per_asteroid_hit: POINTS_PER_ASTEROID_HIT,
            points_per_player_hit: POINTS_PER_PLAYER_HIT,
            winning_score: WINNING_SCORE,
        }
    }
}

impl GameConfig {
    /// Split children never move slower than this.
    pub fn split_min_speed(&self) -> f32 {
        self.asteroid_speed_min * 0.8
    }
}

/// Process level settings for the network server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub tick_rate: u32,
    pub max_clients: usize,
    /// Idle connections are dropped after this long without a packet.
    pub client_timeout: Duration,
    /// Fixed RNG seed for reproducible worlds; random when `None`.
    pub seed: Option<u64>,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            tick_rate: TICK_RATE,
            max_clients: 32,
            client_timeout: Duration::from_secs(5),
            seed: None,
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_config_defaults_match_shared_constants() {
        let config = GameConfig::default();
        assert_eq!(config.world_width, WORLD_WIDTH);
        assert_eq!(config.winning_score, WINNING_SCORE);
        assert_eq!(config.player_start_lives, PLAYER_START_LIVES);
        assert!(config.player_friction < 1.0);
        assert!(config.points_per_player_hit > config.points_per_asteroid_hit);
        assert!(config.asteroid_start_count < config.asteroid_max_count);
    }

    #[test]
    fn test_split_min_speed_is_below_spawn_range() {
        let config = GameConfig::default();
        assert!(config.split_min_speed() > 0.0);
        assert!(config.split_min_speed() < config.asteroid_speed_min);
    }

    #[test]
    fn test_tick_duration() {
        let config = ServerConfig::default();
        let millis = config.tick_duration().as_secs_f64() * 1000.0;
        assert!((millis - 16.666).abs() < 0.01);

        let zero = ServerConfig {
            tick_rate: 0,
            ..ServerConfig::default()
        };
        assert_eq!(zero.tick_duration(), std::time::Duration::from_secs(1));
    }
}
