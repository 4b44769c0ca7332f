//! sdpcache - Cached SDP relaxations of lattice models
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use sdpcache::cli::{Cli, Commands};
use sdpcache::config::ConfigManager;
use sdpcache::error::SdpResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> SdpResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load()?;

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("sdpcache=warn"),
        1 => EnvFilter::new("sdpcache=info"),
        _ => EnvFilter::new("sdpcache=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();
    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
    debug!("Loaded configuration from {}", config_manager.path().display());

    match cli.command {
        Commands::Fingerprint(args) => sdpcache::cli::commands::fingerprint(args, &config),
        Commands::Build(args) => sdpcache::cli::commands::build(args, &config),
        Commands::Run(args) => sdpcache::cli::commands::run(args, &config),
        Commands::Store(args) => sdpcache::cli::commands::store(args, &config),
        Commands::Config(args) => sdpcache::cli::commands::config(args, &config_manager, &config),
    }
}
