//! # Asteroids Arena Server Library
//!
//! Authoritative server for a shared-arena space shooter. Ships, lasers and
//! asteroids live only here; clients send control intents and render the
//! full-world snapshots the server broadcasts every tick.
//!
//! ## Architecture
//!
//! ### Single-Consumer Event Loop
//! Network tasks decode datagrams and forward them over a channel to one loop
//! that owns the [`game::GameState`]. Packet handling and ticks are serialized
//! through `tokio::select!`, so the simulation never sees concurrent mutation.
//!
//! ### Tick Pipeline
//! Each tick runs, in order: physics integration, player lifecycle
//! (respawn, invincibility expiry, asteroid replenishment), collision
//! detection and resolution, then the win check. A round that ends on one
//! tick is reset at the start of the next.
//!
//! ### UDP Transport
//! Packets are `bincode`-encoded [`shared::Packet`] values, one per datagram.
//! Malformed datagrams are logged and dropped.
//!
//! ## Module Organization
//!
//! - `world`: id-keyed entity stores
//! - `physics`: per-tick motion, wrapping and laser expiry
//! - `input`: steering, facing and firing
//! - `lifecycle`: asteroid spawning and splitting, player respawn
//! - `collision`: the four collision passes and their resolution
//! - `rules`: scoring and win detection
//! - `publisher`: events and snapshots as packets
//! - `client_manager`, `network`: connections and the server loop
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut server = Server::new(ServerConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod collision;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod lifecycle;
pub mod network;
pub mod physics;
pub mod publisher;
pub mod rules;
pub mod utils;
pub mod world;
