//! Canonical storage for every live entity
//!
//! A plain container: one ordered map per entity kind, keyed by identifier.
//! No game rules live here. Lookups for missing ids return `None` so callers
//! can treat a stale identifier (a player that disconnected mid-tick, a laser
//! already consumed) as a no-op.

use log::error;
use shared::{Asteroid, Laser, Player};
use std::collections::BTreeMap;

/// Map of entities of a single kind with monotonically increasing ids.
///
/// Iteration is in ascending id order, which keeps collision passes and
/// replays with a fixed seed deterministic.
#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    items: BTreeMap<u32, T>,
    /// Wider than the id type so that running past `u32::MAX` is detectable
    /// instead of wrapping back onto old ids.
    next_id: u64,
}

impl<T> Default for EntityStore<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T> EntityStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts under an externally assigned id (players use their connection
    /// id). Later allocations never hand out this id.
    pub fn insert(&mut self, id: u32, item: T) -> Option<T> {
        self.next_id = self.next_id.max(u64::from(id) + 1);
        self.items.insert(id, item)
    }

    /// Allocates the next id and inserts the entity built from it.
    ///
    /// Returns `None` without inserting once every `u32` id has been handed
    /// out; ids are never recycled.
    pub fn insert_with(&mut self, build: impl FnOnce(u32) -> T) -> Option<u32> {
        let Ok(id) = u32::try_from(self.next_id) else {
            error!("Entity id space exhausted, dropping allocation");
            return None;
        };
        self.next_id += 1;
        self.items.insert(id, build(id));
        Some(id)
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    pub fn remove(&mut self, id: u32) -> Option<T> {
        self.items.remove(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.values()
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.values_mut()
    }

    /// Snapshot of the current ids, safe to hold while mutating the store.
    pub fn ids(&self) -> Vec<u32> {
        self.items.keys().copied().collect()
    }

    pub fn retain(&mut self, keep: impl FnMut(&u32, &mut T) -> bool) {
        self.items.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<u32, T> {
        &self.items
    }
}

/// The World State Store: every player, laser and asteroid.
#[derive(Debug, Clone, Default)]
pub struct World {
    pub players: EntityStore<Player>,
    pub lasers: EntityStore<Laser>,
    pub asteroids: EntityStore<Asteroid>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }
}
