//! Data availability committee node.

mod config;
mod node;

use std::path::PathBuf;

use clap::Parser;
use config::Config;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "danode", about = "Data availability committee node", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Runs the node until interrupted.
    Run {
        /// Path to the TOML configuration file.
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run { config } => {
            if let Err(err) = run(config) {
                eprintln!("Error: {err:?}");
                std::process::exit(1);
            }
        }
    }
}

#[tokio::main]
async fn run(config_path: PathBuf) -> Result<(), node::NodeError> {
    let config = Config::load(&config_path)?;
    node::run(config).await
}
