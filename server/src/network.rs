//! Server network layer handling UDP communications and game loop coordination

use crate::client_manager::ClientManager;
use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::game::GameState;
use crate::input::SteeringIntent;
use crate::publisher;
use crate::utils::get_timestamp;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{Packet, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Full snapshots with many asteroids outgrow a small MTU sized buffer.
const RECV_BUFFER_SIZE: usize = 65536;

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    ClientTimeout { client_id: u32 },
}

/// Messages sent from game loop to network tasks
#[derive(Debug)]
pub enum GameMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
    BroadcastPacket { packet: Packet, exclude: Option<u32> },
}

/// Background tasks started by `run`. Dropping this aborts all of them, so
/// none outlive the loop that consumes their messages.
struct NetworkTasks {
    receiver: JoinHandle<()>,
    sender: JoinHandle<()>,
    timeout: JoinHandle<()>,
}

impl Drop for NetworkTasks {
    fn drop(&mut self) {
        self.receiver.abort();
        self.sender.abort();
        self.timeout.abort();
    }
}

/// Main server coordinating networking and game simulation
pub struct Server {
    socket: Arc<UdpSocket>,
    clients: Arc<RwLock<ClientManager>>,
    game_state: GameState,
    tick_duration: Duration,
    tick_rate: u32,
    client_timeout: Duration,

    // Communication channels. `server_tx` is handed to the network tasks by
    // `run`, so the inbound channel closes once they are gone.
    server_tx: Option<mpsc::UnboundedSender<ServerMessage>>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
    shutdown_tx: mpsc::UnboundedSender<()>,
    shutdown_rx: mpsc::UnboundedReceiver<()>,
}

impl Server {
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let socket = UdpSocket::bind(&config.bind_address)
            .await
            .map_err(|source| ServerError::Bind {
                addr: config.bind_address.clone(),
                source,
            })?;
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel();

        let game_state = match config.seed {
            Some(seed) => {
                info!("Using world seed {}", seed);
                GameState::with_seed(config.game.clone(), seed)
            }
            None => GameState::new(config.game.clone()),
        };

        Ok(Server {
            socket: Arc::new(socket),
            clients: Arc::new(RwLock::new(ClientManager::new(config.max_clients))),
            game_state,
            tick_duration: config.tick_duration(),
            tick_rate: config.tick_rate.max(1),
            client_timeout: config.client_timeout,
            server_tx: Some(server_tx),
            server_rx,
            game_tx,
            game_rx,
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Address actually bound, useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Handle for stopping `run` from outside, e.g. on Ctrl-C.
    pub fn shutdown_sender(&self) -> mpsc::UnboundedSender<()> {
        self.shutdown_tx.clone()
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    /// Spawns task that continuously listens for incoming packets
    fn spawn_network_receiver(
        &self,
        server_tx: mpsc::UnboundedSender<ServerMessage>,
    ) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);

        tokio::spawn(async move {
            let mut buffer = vec![0u8; RECV_BUFFER_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => match deserialize::<Packet>(&buffer[..len]) {
                        Ok(packet) => {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Dropping malformed packet from {}: {}", addr, e);
                        }
                    },
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        })
    }

    /// Spawns task that processes outgoing packet queue
    fn spawn_network_sender(&mut self) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);
        let clients = Arc::clone(&self.clients);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = send_packet_to(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    GameMessage::BroadcastPacket { packet, exclude } => {
                        let client_addrs = {
                            let clients_guard = clients.read().await;
                            clients_guard.get_client_addrs()
                        };

                        // Encode once for every recipient.
                        let data = match serialize(&packet) {
                            Ok(data) => data,
                            Err(e) => {
                                error!("Failed to encode broadcast packet: {}", e);
                                continue;
                            }
                        };

                        for (client_id, addr) in client_addrs {
                            if Some(client_id) == exclude {
                                continue;
                            }

                            if let Err(e) = socket.send_to(&data, addr).await {
                                error!("Failed to send to client {}: {}", client_id, e);
                            }
                        }
                    }
                }
            }
        })
    }

    /// Spawns task that monitors client timeouts
    fn spawn_timeout_checker(
        &self,
        server_tx: mpsc::UnboundedSender<ServerMessage>,
    ) -> JoinHandle<()> {
        let clients = Arc::clone(&self.clients);
        let timeout = self.client_timeout;

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut clients_guard = clients.write().await;
                    clients_guard.check_timeouts(timeout)
                };

                for client_id in timed_out {
                    if server_tx
                        .send(ServerMessage::ClientTimeout { client_id })
                        .is_err()
                    {
                        return;
                    }
                }
            }
        })
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    fn broadcast_packet(&self, packet: Packet, exclude: Option<u32>) {
        if let Err(e) = self
            .game_tx
            .send(GameMessage::BroadcastPacket { packet, exclude })
        {
            error!("Failed to queue broadcast packet: {}", e);
        }
    }

    /// Forwards everything the simulation recorded since the last call.
    fn publish_events(&mut self) {
        for event in self.game_state.drain_events() {
            self.broadcast_packet(Packet::from(&event), None);
        }
    }

    fn drop_player(&mut self, client_id: u32) {
        if self.game_state.remove_player(client_id) {
            self.broadcast_packet(Packet::PlayerDisconnected { id: client_id }, None);
        }
    }

    async fn handle_connect(&mut self, client_version: u32, addr: SocketAddr) {
        info!(
            "Client connecting from {} (version: {})",
            addr, client_version
        );

        if client_version != PROTOCOL_VERSION {
            warn!(
                "Rejecting {}: protocol {} != {}",
                addr, client_version, PROTOCOL_VERSION
            );
            self.send_packet(
                Packet::Disconnected {
                    reason: "Protocol version mismatch".to_string(),
                },
                addr,
            );
            return;
        }

        // A second Connect from the same address replaces the old session.
        let existing_client_id = {
            let clients = self.clients.read().await;
            clients.find_client_by_addr(addr)
        };
        if let Some(existing_id) = existing_client_id {
            info!("Removing existing client {} from {}", existing_id, addr);
            self.clients.write().await.remove_client(existing_id);
            self.drop_player(existing_id);
        }

        let client_id = self.clients.write().await.add_client(addr);
        let Some(client_id) = client_id else {
            warn!("Server full, rejecting {}", addr);
            self.send_packet(
                Packet::Disconnected {
                    reason: "Server full".to_string(),
                },
                addr,
            );
            return;
        };

        self.game_state.add_player(client_id);
        self.send_packet(Packet::Connected { client_id }, addr);
        self.send_packet(publisher::current_players_packet(&self.game_state), addr);
        if let Some(packet) = publisher::new_player_packet(&self.game_state, client_id) {
            self.broadcast_packet(packet, Some(client_id));
        }
    }

    /// Processes incoming packets and updates game state
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        if let Packet::Connect { client_version } = packet {
            self.handle_connect(client_version, addr).await;
            return;
        }
        if packet.is_client_bound() {
            warn!("Unexpected packet type from client at {}", addr);
            return;
        }

        let client_id = self.clients.write().await.touch(addr);
        let Some(client_id) = client_id else {
            debug!("Ignoring packet from unknown address {}", addr);
            return;
        };

        match packet {
            Packet::Input { left, right, up } => {
                self.game_state
                    .apply_input(client_id, SteeringIntent { left, right, up });
            }

            Packet::SetAngle { angle } => {
                self.game_state.set_player_angle(client_id, angle);
            }

            Packet::Shoot => {
                self.game_state.shoot(client_id, get_timestamp());
                self.publish_events();
            }

            Packet::Disconnect => {
                self.clients.write().await.remove_client(client_id);
                self.drop_player(client_id);
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    /// Advances the simulation one step and broadcasts the result.
    async fn run_tick(&mut self) {
        let report = self.game_state.tick(get_timestamp());

        let client_count = self.clients.read().await.len();
        if client_count == 0 {
            // Nobody to tell; keep the queue from growing.
            self.game_state.drain_events();
            return;
        }

        self.broadcast_packet(publisher::snapshot_packet(&self.game_state), None);
        self.publish_events();

        // Periodic performance monitoring
        if self.game_state.tick % self.tick_rate == 0 {
            let world = self.game_state.world();
            debug!(
                "Tick {}: {} clients, {} players, {} lasers, {} asteroids, last tick {:?}",
                self.game_state.tick,
                client_count,
                world.players.len(),
                world.lasers.len(),
                world.asteroids.len(),
                report
            );
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<()> {
        let Some(server_tx) = self.server_tx.take() else {
            return Err(ServerError::SchedulerLost(
                "server loop already ran".to_string(),
            ));
        };

        // Initialize concurrent tasks
        let tasks = NetworkTasks {
            receiver: self.spawn_network_receiver(server_tx.clone()),
            sender: self.spawn_network_sender(),
            timeout: self.spawn_timeout_checker(server_tx),
        };

        info!("Server started successfully");
        self.event_loop(tasks).await
    }

    async fn event_loop(&mut self, mut tasks: NetworkTasks) -> Result<()> {
        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = self.shutdown_rx.recv() => {
                    info!("Server shutting down");
                    return Ok(());
                },

                // The receiver only exits when it can no longer deliver.
                result = &mut tasks.receiver => {
                    if let Err(e) = result {
                        error!("Network receiver failed: {}", e);
                    }
                    return Err(ServerError::SchedulerLost(
                        "network receiver stopped".to_string(),
                    ));
                },

                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::ClientTimeout { client_id }) => {
                            self.drop_player(client_id);
                        },
                        None => {
                            return Err(ServerError::SchedulerLost(
                                "inbound message channel closed".to_string(),
                            ));
                        }
                    }
                },

                // Handle server tick events
                _ = tick_interval.tick() => {
                    self.run_tick().await;
                },
            }
        }
    }
}

async fn send_packet_to(socket: &UdpSocket, packet: &Packet, addr: SocketAddr) -> Result<()> {
    let data = serialize(packet)?;
    socket.send_to(&data, addr).await?;
    Ok(())
}
