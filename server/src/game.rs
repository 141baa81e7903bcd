//! Authoritative simulation
//!
//! `GameState` owns the world, the RNG and the pending event queue. Input
//! handlers mutate it as messages arrive; `tick` runs the fixed pipeline
//! physics → lifecycle → collisions → rules. Both are called from the single
//! server loop, so there is never more than one mutation in flight.

use crate::collision;
use crate::config::GameConfig;
use crate::input::{self, SteeringIntent};
use crate::lifecycle;
use crate::physics;
use crate::publisher::GameEvent;
use crate::rules;
use crate::world::World;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::Player;

/// What a single tick did, for monitoring.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub expired_lasers: usize,
    pub spawned_asteroids: usize,
    pub players_hit: usize,
    pub winner: Option<u32>,
}

pub struct GameState {
    pub tick: u32,
    config: GameConfig,
    world: World,
    rng: StdRng,
    events: Vec<GameEvent>,
    round_over: bool,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// Deterministic world for a given seed.
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: GameConfig, mut rng: StdRng) -> Self {
        let mut world = World::new();
        lifecycle::populate(&mut world, &mut rng, &config);

        Self {
            tick: 0,
            config,
            world,
            rng,
            events: Vec::new(),
            round_over: false,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn player(&self, id: u32) -> Option<&Player> {
        self.world.players.get(id)
    }

    /// Adds a ship for a new connection at a random position.
    pub fn add_player(&mut self, client_id: u32) {
        let (x, y) = lifecycle::join_position(&mut self.rng, &self.config);
        let player = Player::new(client_id, x, y, self.config.player_start_lives);

        info!("Added player {} at ({}, {})", client_id, player.x, player.y);
        self.world.players.insert(client_id, player);
    }

    pub fn remove_player(&mut self, client_id: u32) -> bool {
        let removed = self.world.players.remove(client_id).is_some();
        if removed {
            info!("Removed player {}", client_id);
        }
        removed
    }

    pub fn apply_input(&mut self, client_id: u32, intent: SteeringIntent) {
        if let Some(player) = self.world.players.get_mut(client_id) {
            input::steer(player, intent, &self.config);
        }
    }

    pub fn set_player_angle(&mut self, client_id: u32, angle: f32) {
        if let Some(player) = self.world.players.get_mut(client_id) {
            input::set_facing(player, angle);
        }
    }

    /// Fire request. Returns whether a laser was created.
    pub fn shoot(&mut self, client_id: u32, now: u64) -> bool {
        match input::fire(&mut self.world, client_id, now, &self.config) {
            Some(event) => {
                self.events.push(event);
                true
            }
            None => false,
        }
    }

    /// Advances the world by one tick. `now` is the wall clock in
    /// milliseconds and drives respawn, invincibility and cooldown timers.
    pub fn tick(&mut self, now: u64) -> TickReport {
        if self.round_over {
            rules::reset_round(&mut self.world, &self.config);
            self.round_over = false;
        }
        self.tick = self.tick.wrapping_add(1);

        let expired_lasers = physics::integrate(&mut self.world, &self.config);

        lifecycle::update_players(
            &mut self.world,
            &mut self.rng,
            &self.config,
            now,
            &mut self.events,
        );
        let replenished =
            lifecycle::replenish(&mut self.world, &mut self.rng, &self.config).is_some();

        let outcome = collision::detect(&mut self.world, &self.config, now, &mut self.events);
        let spawned = collision::apply(&mut self.world, &mut self.rng, &self.config, &outcome);

        if let Some(winner_id) = outcome.winner {
            info!("Game over! Winner: {}", winner_id);
            self.events.push(GameEvent::GameOver { winner_id });
            self.round_over = true;
        }

        TickReport {
            expired_lasers,
            spawned_asteroids: spawned + usize::from(replenished),
            players_hit: outcome.players_hit.len(),
            winner: outcome.winner,
        }
    }

    /// Takes every event recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Asteroid, AsteroidStage, Point};

    const START: u64 = 1_000_000;

    fn quiet_config() -> GameConfig {
        GameConfig {
            asteroid_start_count: 0,
            ..GameConfig::default()
        }
    }

    fn place_asteroid(state: &mut GameState, stage: AsteroidStage, x: f32, y: f32) -> u32 {
        state.world_mut().asteroids.insert_with(|id| Asteroid {
            id,
            x,
            y,
            vel_x: 0.0,
            vel_y: 0.0,
            points: vec![Point { x: 0.0, y: 1.0 }],
            radius: stage.radius(),
            stage,
        })
        .unwrap()
    }

    fn place_player(state: &mut GameState, id: u32, x: f32, y: f32) {
        state.add_player(id);
        let player = state.world_mut().players.get_mut(id).unwrap();
        player.x = x;
        player.y = y;
    }

    #[test]
    fn test_initial_population() {
        let state = GameState::with_seed(GameConfig::default(), 1);
        assert_eq!(
            state.world().asteroids.len(),
            GameConfig::default().asteroid_start_count
        );
        assert!(state
            .world()
            .asteroids
            .values()
            .all(|a| a.stage == AsteroidStage::Large));
    }

    #[test]
    fn test_same_seed_same_world() {
        let a = GameState::with_seed(GameConfig::default(), 99);
        let b = GameState::with_seed(GameConfig::default(), 99);
        assert_eq!(a.world().asteroids.as_map(), b.world().asteroids.as_map());
    }

    #[test]
    fn test_add_and_remove_player() {
        let mut state = GameState::with_seed(quiet_config(), 1);
        state.add_player(4);
        let player = state.player(4).unwrap();
        assert_eq!(player.lives, state.config().player_start_lives);
        assert!(player.x >= 50.0 && player.x < state.config().world_width - 50.0);

        assert!(state.remove_player(4));
        assert!(!state.remove_player(4));
        assert!(state.player(4).is_none());
    }

    #[test]
    fn test_inputs_for_unknown_players_are_ignored() {
        let mut state = GameState::with_seed(quiet_config(), 1);
        state.apply_input(
            8,
            SteeringIntent {
                left: true,
                right: false,
                up: true,
            },
        );
        state.set_player_angle(8, 1.0);
        assert!(!state.shoot(8, START));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_shoot_queues_laser_fired_event() {
        let mut state = GameState::with_seed(quiet_config(), 1);
        state.add_player(1);

        assert!(state.shoot(1, START));
        assert!(!state.shoot(1, START + 100));

        let events = state.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::LaserFired { .. }));
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_replenishment_spawns_one_per_tick() {
        let config = GameConfig {
            asteroid_start_count: 3,
            ..GameConfig::default()
        };
        let mut state = GameState::with_seed(config, 3);
        for id in state.world().asteroids.ids() {
            state.world_mut().asteroids.remove(id);
        }

        state.tick(START);
        assert_eq!(state.world().asteroids.len(), 1);
        state.tick(START + 16);
        state.tick(START + 32);
        state.tick(START + 48);
        assert_eq!(state.world().asteroids.len(), 3);
    }

    #[test]
    fn test_dead_player_respawns_invincible_and_is_protected() {
        let mut state = GameState::with_seed(quiet_config(), 5);
        place_player(&mut state, 1, 400.0, 300.0);
        place_asteroid(&mut state, AsteroidStage::Large, 400.0, 300.0);

        state.tick(START);
        assert!(state.player(1).unwrap().is_dead);
        let respawn_at = state.player(1).unwrap().respawn_time;

        state.tick(respawn_at);
        let player = state.player(1).unwrap().clone();
        assert!(!player.is_dead);
        assert!(player.is_invincible);

        // Park a hazard on top of the invincible ship.
        place_asteroid(&mut state, AsteroidStage::Large, player.x, player.y);
        state.tick(respawn_at + 16);
        assert!(!state.player(1).unwrap().is_dead);
        assert_eq!(state.player(1).unwrap().lives, player.lives);

        // Once the window closes the same hazard is lethal.
        state.tick(player.invincible_until);
        let player = state.player(1).unwrap();
        assert!(!player.is_invincible);
        assert!(player.is_dead);
    }

    #[test]
    fn test_game_over_once_and_round_resets_next_tick() {
        let config = GameConfig {
            winning_score: 20,
            ..quiet_config()
        };
        let mut state = GameState::with_seed(config, 8);
        place_player(&mut state, 1, 100.0, 100.0);
        state.world_mut().players.get_mut(1).unwrap().score = 10;

        // Two asteroid hits in the same tick, both past the threshold.
        for x in [300.0, 500.0] {
            place_asteroid(&mut state, AsteroidStage::Small, x, 300.0);
            state.world_mut().lasers.insert_with(|id| shared::Laser {
                id,
                owner_id: 1,
                x,
                y: 305.0,
                vel_x: 0.0,
                vel_y: 0.0,
            });
        }

        let report = state.tick(START);
        assert_eq!(report.winner, Some(1));
        let game_overs: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .collect();
        assert_eq!(game_overs, vec![GameEvent::GameOver { winner_id: 1 }]);
        assert_eq!(state.player(1).unwrap().score, 30);

        state.tick(START + 16);
        assert_eq!(state.player(1).unwrap().score, 0);
        assert_eq!(
            state.player(1).unwrap().lives,
            state.config().player_start_lives
        );
    }
}
