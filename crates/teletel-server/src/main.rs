//! Teletel server binary.
//!
//! # Usage
//!
//! ```bash
//! # Serve the pages tree next to the binary
//! teletel-server
//!
//! # Explicit tree, paced like a real 1200 baud line
//! teletel-server --pages-dir /srv/pages --simulate-baud
//! ```

use clap::Parser;
use teletel_server::{Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Videotex page server for Minitel terminals
#[derive(Parser, Debug)]
#[command(name = "teletel-server")]
#[command(about = "Videotex page server for Minitel terminals")]
#[command(version)]
struct Args {
    /// Address to listen on; each service opens its own port there
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "teletel.toml")]
    config: std::path::PathBuf,

    /// Directory holding one subdirectory per service number
    #[arg(long)]
    pages_dir: Option<std::path::PathBuf>,

    /// Pace output at 1200 baud like a real phone line
    #[arg(long)]
    simulate_baud: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Teletel server starting");

    let mut config = ServerConfig::load(&args.config)?;
    if let Some(pages_dir) = args.pages_dir {
        config.pages_dir = pages_dir;
    }
    if args.simulate_baud {
        config.simulate_baud = true;
    }

    let server = Server::bind(&args.host, &config).await?;

    server.run().await?;

    Ok(())
}
