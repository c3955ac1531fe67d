use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use transcritor::api::ApiServer;
use transcritor::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Transcritor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Transcribe audio/video uploads with the OpenAI Whisper API")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to a TOML configuration file")
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Interface to bind (overrides configuration)")
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to listen on (overrides configuration)")
                .value_parser(clap::value_parser!(u16))
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue)
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let default_filter = if verbose {
        "transcritor=debug,tower_http=debug,warn"
    } else {
        "transcritor=info,tower_http=info,warn"
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    // Load configuration
    let config = match matches.get_one::<String>("config") {
        Some(path) => Config::from_file(PathBuf::from(path))?,
        None => Config::load().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {}", e);
            Config::default()
        }),
    };
    let mut config = config.apply_env()?;

    if let Some(host) = matches.get_one::<String>("host") {
        config.server.host = host.clone();
    }
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    config.validate()?;

    info!("🚀 Transcritor starting...");
    for line in config.summary().lines() {
        info!("{}", line);
    }

    ApiServer::new(Arc::new(config)).start().await
}
