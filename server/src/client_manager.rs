//! Connection tracking for the UDP transport
//!
//! This module handles the server-side bookkeeping of connected clients:
//! - Connection lifecycle (connect, disconnect, idle timeout)
//! - Mapping socket addresses to stable connection ids
//! - Capacity limits
//!
//! Connection ids double as player ids and are never reused while the
//! server runs.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// A connected client
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this client
    pub last_seen: Instant,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    /// Returns true if nothing has arrived from this client within `timeout`.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// Manages all connected clients
///
/// Shared between the main loop (which connects and disconnects clients), the
/// sender task (which needs every address for broadcasts) and the timeout
/// sweeper.
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<u32, Client>,
    /// Next available client ID for new connections
    next_client_id: u32,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    /// Client IDs start from 1 and increment for each new connection.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Attempts to add a new client connection
    ///
    /// Returns Some(client_id) if successful, None if server is at capacity.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients.insert(client_id, Client::new(client_id, addr));

        Some(client_id)
    }

    /// Removes a client. Returns false if they were already gone.
    pub fn remove_client(&mut self, client_id: u32) -> bool {
        if let Some(client) = self.clients.remove(&client_id) {
            info!("Client {} disconnected", client.id);
            true
        } else {
            false
        }
    }

    /// Finds a client ID by their network address
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.clients
            .iter()
            .find(|(_, client)| client.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Looks up the sender of a packet and refreshes its activity timestamp.
    pub fn touch(&mut self, addr: SocketAddr) -> Option<u32> {
        let client = self.clients.values_mut().find(|client| client.addr == addr)?;
        client.last_seen = Instant::now();
        Some(client.id)
    }

    /// Removes clients that have been silent for longer than `timeout` and
    /// returns their IDs so the game can drop their players.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<u32> {
        let timed_out: Vec<u32> = self
            .clients
            .iter()
            .filter(|(_, client)| client.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        for client_id in &timed_out {
            info!("Client {} timed out", client_id);
            self.remove_client(*client_id);
        }

        timed_out
    }

    /// Gets all client IDs and their network addresses
    pub fn get_client_addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.clients
            .iter()
            .map(|(id, client)| (*id, client.addr))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn test_addr2() -> SocketAddr {
        "127.0.0.1:8081".parse().unwrap()
    }

    #[test]
    fn test_client_creation() {
        let addr = test_addr();
        let client = Client::new(1, addr);

        assert_eq!(client.id, 1);
        assert_eq!(client.addr, addr);
    }

    #[test]
    fn test_client_timeout() {
        let mut client = Client::new(1, test_addr());

        assert!(!client.is_timed_out(Duration::from_secs(1)));

        client.last_seen = Instant::now() - Duration::from_secs(2);

        assert!(client.is_timed_out(Duration::from_secs(1)));
    }

    #[test]
    fn test_client_manager_creation() {
        let manager = ClientManager::new(5);
        assert_eq!(manager.max_clients, 5);
        assert!(manager.is_empty());
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn test_add_multiple_clients() {
        let mut manager = ClientManager::new(3);

        let client_id1 = manager.add_client(test_addr()).unwrap();
        let client_id2 = manager.add_client(test_addr2()).unwrap();

        assert_eq!(client_id1, 1);
        assert_eq!(client_id2, 2);
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_add_client_max_capacity() {
        let mut manager = ClientManager::new(1);

        assert!(manager.add_client(test_addr()).is_some());
        assert!(manager.add_client(test_addr2()).is_none());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut manager = ClientManager::new(2);
        let first = manager.add_client(test_addr()).unwrap();
        assert!(manager.remove_client(first));
        let second = manager.add_client(test_addr()).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_remove_nonexistent_client() {
        let mut manager = ClientManager::new(2);

        assert!(!manager.remove_client(999));
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn test_find_client_by_addr() {
        let mut manager = ClientManager::new(2);
        let client_id1 = manager.add_client(test_addr()).unwrap();
        let _client_id2 = manager.add_client(test_addr2()).unwrap();

        assert_eq!(manager.find_client_by_addr(test_addr()), Some(client_id1));

        let unknown_addr: SocketAddr = "192.168.1.1:9999".parse().unwrap();
        assert_eq!(manager.find_client_by_addr(unknown_addr), None);
    }

    #[test]
    fn test_touch_refreshes_activity() {
        let mut manager = ClientManager::new(2);
        let id = manager.add_client(test_addr()).unwrap();
        manager.clients.get_mut(&id).unwrap().last_seen =
            Instant::now() - Duration::from_secs(10);

        assert_eq!(manager.touch(test_addr()), Some(id));
        assert!(manager.check_timeouts(Duration::from_secs(5)).is_empty());
        assert_eq!(manager.touch(test_addr2()), None);
    }

    #[test]
    fn test_check_timeouts_removes_idle_clients() {
        let mut manager = ClientManager::new(3);
        let idle = manager.add_client(test_addr()).unwrap();
        let active = manager.add_client(test_addr2()).unwrap();
        manager.clients.get_mut(&idle).unwrap().last_seen =
            Instant::now() - Duration::from_secs(10);

        let removed = manager.check_timeouts(Duration::from_secs(5));

        assert_eq!(removed, vec![idle]);
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.find_client_by_addr(test_addr2()), Some(active));
    }
}
