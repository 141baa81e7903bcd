//! Outbound messages built from simulation state
//!
//! The simulation records discrete `GameEvent`s while it mutates the world;
//! the network layer drains them and turns them into packets with the
//! helpers below. Snapshots always carry the complete world, never a delta.

use crate::game::GameState;
use shared::{AsteroidStage, Packet};

/// Point events worth telling every client about.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
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
}

impl From<&GameEvent> for Packet {
    fn from(event: &GameEvent) -> Self {
        match *event {
            GameEvent::LaserFired { x, y } => Packet::LaserFired { x, y },
            GameEvent::AsteroidDestroyed { x, y, stage } => {
                Packet::AsteroidDestroyed { x, y, stage }
            }
            GameEvent::PlayerHit {
                id,
                lives,
                x,
                y,
                attacker_id,
            } => Packet::PlayerHit {
                id,
                lives,
                x,
                y,
                attacker_id,
            },
            GameEvent::PlayerRespawned { id } => Packet::PlayerRespawned { id },
            GameEvent::GameOver { winner_id } => Packet::GameOver { winner_id },
        }
    }
}

/// Full-world snapshot broadcast once per tick.
pub fn snapshot_packet(state: &GameState) -> Packet {
    let world = state.world();
    Packet::GameStateUpdate {
        tick: state.tick,
        players: world.players.as_map().clone(),
        lasers: world.lasers.as_map().clone(),
        asteroids: world.asteroids.as_map().clone(),
    }
}

/// Roster sent once to a newly connected client.
pub fn current_players_packet(state: &GameState) -> Packet {
    Packet::CurrentPlayers {
        players: state.world().players.as_map().clone(),
    }
}

/// Announces a join to everyone else. `None` if the player is already gone.
pub fn new_player_packet(state: &GameState, id: u32) -> Option<Packet> {
    state
        .world()
        .players
        .get(id)
        .map(|player| Packet::NewPlayer {
            player: player.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn empty_state() -> GameState {
        let config = GameConfig {
            asteroid_start_count: 0,
            ..GameConfig::default()
        };
        GameState::with_seed(config, 7)
    }

    #[test]
    fn test_event_to_packet() {
        let event = GameEvent::PlayerHit {
            id: 4,
            lives: 2,
            x: 1.0,
            y: 2.0,
            attacker_id: Some(9),
        };
        match Packet::from(&event) {
            Packet::PlayerHit {
                id,
                lives,
                attacker_id,
                ..
            } => {
                assert_eq!(id, 4);
                assert_eq!(lives, 2);
                assert_eq!(attacker_id, Some(9));
            }
            other => panic!("Unexpected packet {:?}", other),
        }

        match Packet::from(&GameEvent::GameOver { winner_id: 3 }) {
            Packet::GameOver { winner_id } => assert_eq!(winner_id, 3),
            other => panic!("Unexpected packet {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_contains_every_entity() {
        let mut state = empty_state();
        state.add_player(1);
        state.add_player(2);
        state.shoot(1, 1_000);

        match snapshot_packet(&state) {
            Packet::GameStateUpdate {
                tick,
                players,
                lasers,
                asteroids,
            } => {
                assert_eq!(tick, 0);
                assert_eq!(players.len(), 2);
                assert_eq!(lasers.len(), 1);
                assert!(asteroids.is_empty());
            }
            other => panic!("Unexpected packet {:?}", other),
        }
    }

    #[test]
    fn test_new_player_packet_for_missing_player() {
        let mut state = empty_state();
        state.add_player(5);
        assert!(new_player_packet(&state, 5).is_some());
        assert!(new_player_packet(&state, 6).is_none());
        match current_players_packet(&state) {
            Packet::CurrentPlayers { players } => assert!(players.contains_key(&5)),
            other => panic!("Unexpected packet {:?}", other),
        }
    }
}
