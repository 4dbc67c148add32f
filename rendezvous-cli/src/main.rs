use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rendezvous_server::{ServerConfig, serve};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rendezvous")]
#[command(about = "WebRTC signaling server: rooms, offer/answer and ICE relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server. Flags override RENDEZVOUS_BIND, PORT and STUN_URLS.
    Serve {
        #[arg(long)]
        bind: Option<SocketAddr>,

        #[arg(short, long)]
        port: Option<u16>,

        /// STUN server announced to clients; repeat for several.
        #[arg(long = "stun")]
        stun: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Serve { bind, port, stun } => {
            let mut config = ServerConfig::from_env();
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(port) = port {
                config.bind.set_port(port);
            }
            if !stun.is_empty() {
                config.set_stun_urls(stun);
            }

            println!("{}", "📡 Starting rendezvous signaling server...".green().bold());
            println!("   🔌 WebSocket: ws://{}/ws", config.bind);
            for server in &config.ice_servers {
                println!("   🧊 ICE:       {}", server.urls.join(", "));
            }

            serve(config).await.context("Signaling server failed")?;
        }
    }

    Ok(())
}
