//! ---
//! keel_section: "01-core-functionality"
//! keel_subsection: "binary"
//! keel_type: "source"
//! keel_scope: "code"
//! keel_description: "Binary entrypoint for the keeld daemon."
//! keel_version: "v0.1.0"
//! keel_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use keel_common::config::AppConfig;
use keel_common::logging::init_tracing;
use keel_common::version::VersionInfo;
use keel_core::Runtime;
use tokio::signal;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    version = concat!("Keel ", env!("CARGO_PKG_VERSION")),
    about = "Keel daemon",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print extended version information and exit"
    )]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run the daemon")]
    Run,
    #[command(about = "Validate the effective configuration and exit")]
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let version = VersionInfo::current();
    if cli.version {
        println!("{}", version.extended());
        return Ok(());
    }

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/example.prod.toml"));
    candidates.push(PathBuf::from("configs/example.dev.toml"));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let config = loaded.config;
    let config_path = loaded.source;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            init_tracing("keeld", &config.logging)?;
            info!(config_path = %config_path.display(), "configuration loaded");
            run_daemon(config).await?;
        }
        Commands::CheckConfig => {
            config.validate()?;
            println!(
                "{}: ok (server {}, database {})",
                config_path.display(),
                if config.server.enabled {
                    config.server.listen.to_string()
                } else {
                    "disabled".to_string()
                },
                config.database.url
            );
        }
    }

    Ok(())
}

async fn run_daemon(config: AppConfig) -> Result<()> {
    let runtime = Runtime::new(config);
    let handle = runtime.start().await?;

    // A shared query factory can be built from the handle's context and
    // passed to components at wiring time:
    //
    // let queries = keel_persistence::QueryFactory::new(handle.persistence().clone());
    //
    // Left unwired: call sites construct their own factory from an explicit
    // context handle instead.

    info!("daemon running; waiting for termination signal");
    signal::ctrl_c().await?;
    info!("ctrl-c received; shutting down");
    handle.shutdown().await?;

    Ok(())
}
