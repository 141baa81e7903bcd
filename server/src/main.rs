use clap::Parser;
use log::{error, info};
use server::config::{GameConfig, ServerConfig};
use server::network::Server;
use std::time::Duration;

/// Command line arguments for the arena server
#[derive(Parser, Debug)]
#[command(author, version, about = "Authoritative asteroids arena server")]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Simulation ticks per second
    #[arg(short, long, default_value_t = shared::TICK_RATE)]
    tick_rate: u32,

    /// Maximum concurrent clients
    #[arg(short, long, default_value = "32")]
    max_clients: usize,

    /// Seconds of silence before a client is dropped
    #[arg(long, default_value = "5")]
    timeout_secs: u64,

    /// Fixed RNG seed for a reproducible world
    #[arg(long)]
    seed: Option<u64>,

    /// Score that ends a round
    #[arg(long, default_value_t = shared::WINNING_SCORE)]
    win_score: u32,

    /// Lives each ship starts with
    #[arg(long, default_value_t = shared::PLAYER_START_LIVES)]
    lives: u32,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            bind_address: format!("{}:{}", args.host, args.port),
            tick_rate: args.tick_rate,
            max_clients: args.max_clients,
            client_timeout: Duration::from_secs(args.timeout_secs),
            seed: args.seed,
            game: GameConfig {
                winning_score: args.win_score,
                player_start_lives: args.lives,
                ..GameConfig::default()
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    info!(
        "Starting server on {}:{} at {}Hz",
        args.host, args.port, args.tick_rate
    );

    let mut server = Server::new(ServerConfig::from(args)).await?;

    let shutdown = server.shutdown_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
            let _ = shutdown.send(());
        }
    });

    if let Err(e) = server.run().await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
