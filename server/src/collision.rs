//! Collision detection and resolution
//!
//! Runs once per tick on the already-integrated positions, in four ordered
//! passes: laser × asteroid, laser × player, player × asteroid and
//! player × player. Every test is a circle test on centers; lasers are points.
//!
//! Removals are deferred. Passes only mark lasers and asteroids, later checks
//! skip anything marked, and `apply` removes them (and spawns split children)
//! once all four passes are done. Player damage and score are applied
//! immediately, since players are never removed here.
//!
//! Each laser is consumed by its first hit. A laser touching two overlapping
//! asteroids destroys only the first one found in id order.

use crate::config::GameConfig;
use crate::lifecycle;
use crate::publisher::GameEvent;
use crate::rules::WinTracker;
use crate::world::World;
use log::info;
use rand::Rng;
use shared::distance;
use std::collections::BTreeSet;

/// Everything the four passes decided during one tick.
#[derive(Debug, Default, Clone)]
pub struct CollisionOutcome {
    pub consumed_lasers: BTreeSet<u32>,
    pub destroyed_asteroids: BTreeSet<u32>,
    /// Players that took a hit this tick. Nobody is hit twice per tick.
    pub players_hit: BTreeSet<u32>,
    /// First player to reach the winning score this tick.
    pub winner: Option<u32>,
}

/// Runs all four passes. Leaves lasers and asteroids in place.
pub fn detect(
    world: &mut World,
    config: &GameConfig,
    now: u64,
    events: &mut Vec<GameEvent>,
) -> CollisionOutcome {
    let mut outcome = CollisionOutcome::default();
    let mut tracker = WinTracker::new();

    lasers_vs_asteroids(world, config, &mut outcome, &mut tracker, events);
    lasers_vs_players(world, config, now, &mut outcome, &mut tracker, events);
    players_vs_asteroids(world, config, now, &mut outcome, events);
    players_vs_players(world, config, now, &mut outcome, events);

    outcome.winner = tracker.winner();
    outcome
}

/// Removes everything marked by `detect` and splits destroyed asteroids.
/// Returns the number of children spawned.
pub fn apply<R: Rng>(
    world: &mut World,
    rng: &mut R,
    config: &GameConfig,
    outcome: &CollisionOutcome,
) -> usize {
    for id in &outcome.consumed_lasers {
        world.lasers.remove(*id);
    }

    let mut spawned = 0;
    for id in &outcome.destroyed_asteroids {
        if let Some(parent) = world.asteroids.remove(*id) {
            spawned += lifecycle::split(world, rng, &parent, config).len();
        }
    }
    spawned
}

fn lasers_vs_asteroids(
    world: &mut World,
    config: &GameConfig,
    outcome: &mut CollisionOutcome,
    tracker: &mut WinTracker,
    events: &mut Vec<GameEvent>,
) {
    for laser_id in world.lasers.ids() {
        let Some(laser) = world.lasers.get(laser_id) else {
            continue;
        };
        let (lx, ly, owner_id) = (laser.x, laser.y, laser.owner_id);

        let hit = world
            .asteroids
            .iter()
            .filter(|(id, _)| !outcome.destroyed_asteroids.contains(id))
            .find(|(_, asteroid)| distance(lx, ly, asteroid.x, asteroid.y) < asteroid.radius)
            .map(|(id, asteroid)| (id, asteroid.x, asteroid.y, asteroid.stage));

        if let Some((asteroid_id, x, y, stage)) = hit {
            outcome.consumed_lasers.insert(laser_id);
            outcome.destroyed_asteroids.insert(asteroid_id);
            events.push(GameEvent::AsteroidDestroyed { x, y, stage });
            tracker.award_by_id(
                world,
                owner_id,
                config.points_per_asteroid_hit,
                config.winning_score,
            );
        }
    }
}

fn lasers_vs_players(
    world: &mut World,
    config: &GameConfig,
    now: u64,
    outcome: &mut CollisionOutcome,
    tracker: &mut WinTracker,
    events: &mut Vec<GameEvent>,
) {
    for laser_id in world.lasers.ids() {
        if outcome.consumed_lasers.contains(&laser_id) {
            continue;
        }
        let Some(laser) = world.lasers.get(laser_id) else {
            continue;
        };
        let (lx, ly, owner_id) = (laser.x, laser.y, laser.owner_id);

        let victim = world
            .players
            .iter()
            .filter(|(id, player)| {
                *id != owner_id && player.is_vulnerable() && !outcome.players_hit.contains(id)
            })
            .find(|(_, player)| distance(lx, ly, player.x, player.y) < config.player_radius)
            .map(|(id, _)| id);

        if let Some(victim_id) = victim {
            info!(
                "Player {} hit by laser {} from player {}",
                victim_id, laser_id, owner_id
            );
            outcome.consumed_lasers.insert(laser_id);
            outcome.players_hit.insert(victim_id);
            kill_player(world, victim_id, Some(owner_id), config, now, events);
            tracker.award_by_id(
                world,
                owner_id,
                config.points_per_player_hit,
                config.winning_score,
            );
        }
    }
}

fn players_vs_asteroids(
    world: &mut World,
    config: &GameConfig,
    now: u64,
    outcome: &mut CollisionOutcome,
    events: &mut Vec<GameEvent>,
) {
    for player_id in world.players.ids() {
        if outcome.players_hit.contains(&player_id) {
            continue;
        }
        let Some(player) = world.players.get(player_id) else {
            continue;
        };
        if !player.is_vulnerable() {
            continue;
        }
        let (px, py) = (player.x, player.y);

        let hit = world
            .asteroids
            .iter()
            .filter(|(id, _)| !outcome.destroyed_asteroids.contains(id))
            .find(|(_, asteroid)| {
                distance(px, py, asteroid.x, asteroid.y) < config.player_radius + asteroid.radius
            })
            .map(|(id, asteroid)| (id, asteroid.x, asteroid.y, asteroid.stage));

        if let Some((asteroid_id, x, y, stage)) = hit {
            info!("Player {} hit by asteroid {}", player_id, asteroid_id);
            outcome.destroyed_asteroids.insert(asteroid_id);
            outcome.players_hit.insert(player_id);
            kill_player(world, player_id, None, config, now, events);
            events.push(GameEvent::AsteroidDestroyed { x, y, stage });
        }
    }
}

fn players_vs_players(
    world: &mut World,
    config: &GameConfig,
    now: u64,
    outcome: &mut CollisionOutcome,
    events: &mut Vec<GameEvent>,
) {
    let candidates: Vec<(u32, f32, f32)> = world
        .players
        .iter()
        .filter(|(id, player)| player.is_vulnerable() && !outcome.players_hit.contains(id))
        .map(|(id, player)| (id, player.x, player.y))
        .collect();

    let contact = config.player_radius * 2.0;

    for (i, &(id1, x1, y1)) in candidates.iter().enumerate() {
        if outcome.players_hit.contains(&id1) {
            continue;
        }
        for &(id2, x2, y2) in &candidates[i + 1..] {
            if outcome.players_hit.contains(&id2) {
                continue;
            }
            if distance(x1, y1, x2, y2) < contact {
                info!("Player {} collided with player {}", id1, id2);
                outcome.players_hit.insert(id1);
                outcome.players_hit.insert(id2);
                kill_player(world, id1, None, config, now, events);
                kill_player(world, id2, None, config, now, events);
                break;
            }
        }
    }
}

/// Takes a life and schedules the respawn. Missing players are ignored.
fn kill_player(
    world: &mut World,
    id: u32,
    attacker_id: Option<u32>,
    config: &GameConfig,
    now: u64,
    events: &mut Vec<GameEvent>,
) {
    let Some(player) = world.players.get_mut(id) else {
        return;
    };

    player.lives = player.lives.saturating_sub(1);
    player.is_dead = true;
    player.respawn_time = now + config.respawn_delay_ms;

    events.push(GameEvent::PlayerHit {
        id,
        lives: player.lives,
        x: player.x,
        y: player.y,
        attacker_id,
    });
}
