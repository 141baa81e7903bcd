use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::f32::consts::FRAC_PI_2;

pub const PROTOCOL_VERSION: u32 = 1;

pub const WORLD_WIDTH: f32 = 800.0;
pub const WORLD_HEIGHT: f32 = 600.0;
pub const TICK_RATE: u32 = 60;

pub const PLAYER_RADIUS: f32 = 10.0;
pub const PLAYER_ROTATION_SPEED: f32 = 0.05;
pub const PLAYER_ACCELERATION: f32 = 0.1;
pub const PLAYER_FRICTION: f32 = 0.98;
pub const PLAYER_START_LIVES: u32 = 10;
pub const PLAYER_INVINCIBILITY_MS: u64 = 2000;
pub const PLAYER_RESPAWN_DELAY_MS: u64 = 1000;

pub const LASER_SPEED: f32 = 5.0;
pub const LASER_INHERIT_VELOCITY: f32 = 0.5;
pub const LASER_SPAWN_OFFSET: f32 = 15.0;
pub const LASER_BOUNDS_MARGIN: f32 = 10.0;
pub const SHOOT_DELAY_MS: u64 = 250;

pub const ASTEROID_SPEED_MIN: f32 = 0.5;
pub const ASTEROID_SPEED_MAX: f32 = 1.5;
pub const ASTEROID_START_COUNT: usize = 5;
pub const ASTEROID_MAX_COUNT: usize = 20;
pub const ASTEROID_EDGE_BUFFER: f32 = 10.0;
pub const ASTEROID_RADIUS_JITTER: f32 = 0.2;

pub const POINTS_PER_ASTEROID_HIT: u32 = 10;
pub const POINTS_PER_PLAYER_HIT: u32 = 50;
pub const WINNING_SCORE: u32 = 500;

/// Size rank of an asteroid. Destroying anything above `Small` yields two
/// children of the next rank down.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AsteroidStage {
    Small = 1,
    Medium = 2,
    Large = 3,
}

impl AsteroidStage {
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Nominal radius, also used for broad-phase collision.
    pub fn radius(self) -> f32 {
        match self {
            AsteroidStage::Small => 10.0,
            AsteroidStage::Medium => 15.0,
            AsteroidStage::Large => 20.0,
        }
    }

    /// Inclusive range of outline vertex counts.
    pub fn vertex_range(self) -> (usize, usize) {
        match self {
            AsteroidStage::Small => (5, 9),
            AsteroidStage::Medium | AsteroidStage::Large => (6, 12),
        }
    }

    pub fn smaller(self) -> Option<AsteroidStage> {
        match self {
            AsteroidStage::Large => Some(AsteroidStage::Medium),
            AsteroidStage::Medium => Some(AsteroidStage::Small),
            AsteroidStage::Small => None,
        }
    }
}

/// Outline vertex relative to the owning asteroid's center.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Player {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub last_shot_time: u64,
    pub score: u32,
    pub lives: u32,
    pub is_invincible: bool,
    pub invincible_until: u64,
    pub is_dead: bool,
    pub respawn_time: u64,
}

impl Player {
    pub fn new(id: u32, x: f32, y: f32, lives: u32) -> Self {
        Self {
            id,
            x,
            y,
            rotation: 0.0,
            vel_x: 0.0,
            vel_y: 0.0,
            last_shot_time: 0,
            score: 0,
            lives,
            is_invincible: false,
            invincible_until: 0,
            is_dead: false,
            respawn_time: 0,
        }
    }

    /// Direction the nose points in, in radians. A rotation of zero faces up.
    pub fn heading(&self) -> f32 {
        self.rotation - FRAC_PI_2
    }

    /// Alive and outside of any invincibility window.
    pub fn is_vulnerable(&self) -> bool {
        !self.is_dead && !self.is_invincible
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Laser {
    pub id: u32,
    pub owner_id: u32,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Asteroid {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub points: Vec<Point>,
    pub radius: f32,
    pub stage: AsteroidStage,
}

impl Asteroid {
    pub fn speed(&self) -> f32 {
        (self.vel_x * self.vel_x + self.vel_y * self.vel_y).sqrt()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect {
        client_version: u32,
    },
    Input {
        left: bool,
        right: bool,
        up: bool,
    },
    SetAngle {
        angle: f32,
    },
    Shoot,
    Disconnect,

    Connected {
        client_id: u32,
    },
    CurrentPlayers {
        players: BTreeMap<u32, Player>,
    },
    NewPlayer {
        player: Player,
    },
    PlayerDisconnected {
        id: u32,
    },
    GameStateUpdate {
        tick: u32,
        players: BTreeMap<u32, Player>,
        lasers: BTreeMap<u32, Laser>,
        asteroids: BTreeMap<u32, Asteroid>,
    },
    LaserFired {
        x: f32,
        y: f32,
    },
    AsteroidDestroyed {
        x: f32,
        y: f32,
        stage: AsteroidStage,
    },
    PlayerHit {
        id: u32,
        lives: u32,
        x: f32,
        y: f32,
        attacker_id: Option<u32>,
    },
    PlayerRespawned {
        id: u32,
    },
    GameOver {
        winner_id: u32,
    },
    Disconnected {
        reason: String,
    },
}

impl Packet {
    /// True for packets a client is allowed to send.
    pub fn is_client_bound(&self) -> bool {
        !matches!(
            self,
            Packet::Connect { .. }
                | Packet::Input { .. }
                | Packet::SetAngle { .. }
                | Packet::Shoot
                | Packet::Disconnect
        )
    }
}

/// Euclidean distance between two centers.
pub fn distance(x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    let dx = x1 - x2;
    let dy = y1 - y2;
    (dx * dx + dy * dy).sqrt()
}
