//! Viewfinder CLI — camera discovery and preview from the terminal.
//!
//! Usage:
//!   viewfinder list       List discoverable cameras
//!   viewfinder check      Check authorization and system capabilities
//!   viewfinder preview    Open preview sessions for selected cameras

use clap::{Parser, Subcommand};

mod commands;
mod platform;

#[derive(Parser)]
#[command(
    name = "viewfinder",
    about = "Multi-camera preview from the terminal",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run against the in-memory simulator instead of the OS capture stack
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List discoverable cameras
    List {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Check authorization status and system capabilities
    Check,

    /// Open preview sessions for selected cameras
    Preview {
        /// Device unique ids to toggle into the selection
        #[arg(short, long = "device")]
        devices: Vec<String>,

        /// Select every discovered camera
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    viewfinder_common::logging::init_logging(&viewfinder_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    let config = viewfinder_common::config::AppConfig::load();
    let platform = platform::select_platform(cli.simulate)?;

    match cli.command {
        Commands::List { json } => commands::list::run(platform.as_ref(), json).await,
        Commands::Check => commands::check::run(platform.as_ref()),
        Commands::Preview { devices, all } => {
            commands::preview::run(platform.as_ref(), &config, devices, all).await
        }
    }
}
