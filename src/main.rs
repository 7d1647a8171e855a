//! # Range-Proof Server Binary
//!
//! Loads the server keypair and client registry, then accepts TCP
//! connections and runs one session per client.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use secure_range_proof::{ProtocolError, ServerConfig, Session, TransportListener};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Server verifying Pedersen-commitment range proofs from authenticated clients
#[derive(Parser)]
#[command(name = "srp-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// TCP port to listen on
    #[arg(long, default_value_t = 9000)]
    port: u16,

    /// Path to the key=value configuration file
    #[arg(long, default_value = "server/config/server.conf")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let config = ServerConfig::load(&cli.config);
    info!(clients = config.registry.len(), "configuration loaded");

    let keys = Arc::new(config.keys);
    let registry = Arc::new(config.registry);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    let listener = TransportListener::bind(addr).await?;
    info!("srp-server listening on {}", listener.local_addr());

    loop {
        match listener.accept().await {
            Ok((transport, peer)) => {
                info!(%peer, "client connected");
                let keys = Arc::clone(&keys);
                let registry = Arc::clone(&registry);

                tokio::spawn(async move {
                    let session = Session::new(transport, keys, registry);
                    match session.run().await {
                        Ok(()) => info!(%peer, "session ended"),
                        Err(ProtocolError::Auth(serial)) => {
                            warn!(%peer, %serial, "session ended: authentication failed")
                        }
                        Err(e) => warn!(%peer, error = %e, "session ended with error"),
                    }
                });
            }
            Err(e) => error!("accept error: {e}"),
        }
    }
}
