use face_attendance::{config::Config, service};

use clap::{Parser, Subcommand};
use anyhow::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "attendance")]
#[command(about = "Face descriptor enrollment and attendance matching service")]
struct Cli {
    /// Enable development mode (verbose logging)
    #[arg(long, global = true)]
    dev: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP/WebSocket service
    Serve {
        /// Address to bind, overrides the config file
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on, overrides the config file
        #[arg(short, long)]
        port: Option<u16>,
        /// Match distance threshold, overrides the config file
        #[arg(short, long)]
        threshold: Option<f32>,
    },
    /// Print the effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.dev);

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { host, port, threshold } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(threshold) = threshold {
                config.matching.distance_threshold = threshold;
            }
            config.validate()?;

            service::serve(&config).await?;
        }
        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn setup_logging(dev_mode: bool) {
    if dev_mode {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }
}
