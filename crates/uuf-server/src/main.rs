//! UUF server binary - serves every app found under an apps directory

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uuf_server::{ServerConfig, server};

#[derive(Parser, Debug)]
#[command(name = "uuf-server")]
#[command(about = "Serve UUF applications over HTTP")]
struct Args {
    /// Directory whose subdirectories (each holding an app.json) are apps
    #[arg(short, long, default_value = "apps")]
    apps: PathBuf,

    /// Port to listen on
    #[arg(short = 'P', long, default_value = "9090")]
    port: u16,

    /// Host to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uuf_server=info,uuf_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!(apps_dir = %args.apps.display(), "Starting UUF server");

    let config = ServerConfig {
        port: args.port,
        host: args.host,
        apps_dir: args.apps,
    };

    server::run_server(config).await?;

    Ok(())
}
