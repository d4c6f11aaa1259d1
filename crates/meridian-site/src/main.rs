//! Meridian site server binary.

use std::net::{IpAddr, SocketAddr};

use anyhow::Result;
use clap::Parser;
use meridian_site::state::SiteState;

/// Meridian marketing site server.
#[derive(Parser)]
#[command(name = "meridian-site")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    address: IpAddr,

    /// Port to listen on.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let addr = SocketAddr::from((cli.address, cli.port));

    meridian_site::serve(addr, SiteState::new()).await?;
    Ok(())
}
