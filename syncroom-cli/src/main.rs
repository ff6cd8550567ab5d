mod counter;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::net::SocketAddr;
use syncroom_client::ClientConfig;
use syncroom_relay::RelayConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "syncroom", version, about = "Peer-to-peer rooms with host-authoritative state")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling relay
    Relay {
        #[arg(long, env = "SYNCROOM_RELAY_ADDR")]
        addr: Option<SocketAddr>,
    },
    /// Join a room and drive a shared counter
    Counter {
        #[arg(long, env = "SYNCROOM_SIGNALING_URL")]
        url: Option<String>,

        #[arg(short, long, env = "SYNCROOM_ROOM")]
        room: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Relay { addr } => {
            init_tracing("info");
            let mut config = RelayConfig::from_env()?;
            if let Some(addr) = addr {
                config.addr = addr;
            }
            println!(
                "{} {}",
                "Starting syncroom relay on".green().bold(),
                config.addr.to_string().cyan()
            );
            syncroom_relay::serve(config).await?;
        }
        Commands::Counter { url, room } => {
            init_tracing("warn");
            let mut config = ClientConfig::from_env()?;
            if let Some(url) = url {
                config.signaling_url = url;
            }
            if let Some(room) = room {
                config.orchestrator.room_name = room;
            }
            counter::run(config).await?;
        }
    }

    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
