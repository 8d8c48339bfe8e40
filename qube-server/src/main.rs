use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use qube::{backend::EmulatedBackend, config::QubeConfig, QubeController};
use qube_server::QubeServer;

#[derive(Parser, Debug)]
#[command(version, about = "QuBE acquisition server on emulated chassis")]
struct Arg {
    /// Configuration file
    #[arg(short, long)]
    config: PathBuf,
    /// Port to listen on
    #[arg(short, long, default_value = "5000")]
    port: u16,
    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: tracing::Level,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let arg = Arg::parse();

    tracing_subscriber::fmt()
        .with_max_level(arg.log_level)
        .init();

    let config = Arc::new(QubeConfig::load(&arg.config)?);
    let qube = QubeController::open(config, &EmulatedBackend::new()).with_skew_source(&arg.config);

    QubeServer::new(arg.port, Arc::new(qube))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
            }
        })
        .run()
        .await?;

    Ok(())
}
