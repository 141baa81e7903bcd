//! Headless bot for exercising a running server.
//!
//! Connects, then steers, aims and fires at random while logging the events
//! the server broadcasts. Run several at once for a quick load test.

use bincode::{deserialize, serialize};
use clap::Parser;
use log::{debug, info, warn};
use rand::Rng;
use shared::{Packet, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{interval, sleep, timeout, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Random-input bot for the arena server")]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// How long to play before disconnecting, in seconds
    #[arg(short = 'd', long, default_value = "10")]
    duration: u64,

    /// Input messages sent per second
    #[arg(short = 'r', long, default_value = "20")]
    rate: u32,
}

async fn send(socket: &UdpSocket, packet: &Packet, addr: SocketAddr) -> std::io::Result<()> {
    let data = serialize(packet)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    socket.send_to(&data, addr).await?;
    Ok(())
}

fn random_intent(rng: &mut impl Rng) -> Packet {
    match rng.gen_range(0..4) {
        0 => Packet::SetAngle {
            angle: rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI),
        },
        1 => Packet::Shoot,
        _ => Packet::Input {
            left: rng.gen_bool(0.3),
            right: rng.gen_bool(0.3),
            up: rng.gen_bool(0.5),
        },
    }
}

fn log_event(packet: &Packet, client_id: u32) {
    match packet {
        Packet::GameStateUpdate {
            tick,
            players,
            asteroids,
            ..
        } => {
            if let Some(me) = players.get(&client_id) {
                debug!(
                    "Tick {}: at ({:.0}, {:.0}) score {} lives {}, {} asteroids",
                    tick,
                    me.x,
                    me.y,
                    me.score,
                    me.lives,
                    asteroids.len()
                );
            }
        }
        Packet::PlayerHit {
            id,
            lives,
            attacker_id,
            ..
        } => info!("Player {} hit by {:?}, {} lives left", id, attacker_id, lives),
        Packet::AsteroidDestroyed { stage, .. } => debug!("{:?} asteroid destroyed", stage),
        Packet::PlayerRespawned { id } => info!("Player {} respawned", id),
        Packet::NewPlayer { player } => info!("Player {} joined", player.id),
        Packet::PlayerDisconnected { id } => info!("Player {} left", id),
        Packet::GameOver { winner_id } => info!("Game over, winner {}", winner_id),
        Packet::Disconnected { reason } => warn!("Server disconnected us: {}", reason),
        _ => {}
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    let server_addr: SocketAddr = args.server.parse()?;
    info!("Bot bound to {}, connecting to {}", socket.local_addr()?, server_addr);

    send(
        &socket,
        &Packet::Connect {
            client_version: PROTOCOL_VERSION,
        },
        server_addr,
    )
    .await?;

    let mut buf = vec![0u8; 65536];
    let client_id = loop {
        let (len, _) = timeout(Duration::from_secs(5), socket.recv_from(&mut buf)).await??;
        match deserialize::<Packet>(&buf[..len]) {
            Ok(Packet::Connected { client_id }) => break client_id,
            Ok(Packet::Disconnected { reason }) => {
                return Err(format!("connection refused: {}", reason).into());
            }
            Ok(other) => debug!("Ignoring {:?} before handshake", other),
            Err(e) => warn!("Malformed packet from server: {}", e),
        }
    };
    info!("Connected as client {}", client_id);

    let mut rng = rand::thread_rng();
    let mut input_timer = interval(Duration::from_secs_f64(1.0 / args.rate.max(1) as f64));
    let deadline = Instant::now() + Duration::from_secs(args.duration);

    loop {
        tokio::select! {
            _ = sleep(deadline.saturating_duration_since(Instant::now())) => break,
            _ = input_timer.tick() => {
                let packet = random_intent(&mut rng);
                send(&socket, &packet, server_addr).await?;
            }
            received = socket.recv_from(&mut buf) => {
                let (len, _) = received?;
                match deserialize::<Packet>(&buf[..len]) {
                    Ok(packet) => log_event(&packet, client_id),
                    Err(e) => warn!("Malformed packet from server: {}", e),
                }
            }
        }
    }

    send(&socket, &Packet::Disconnect, server_addr).await?;
    info!("Bot finished");
    Ok(())
}
