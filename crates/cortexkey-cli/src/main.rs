//! cortexkey CLI - derive brain keys from recorded or live EEG feeds.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cortexkey")]
#[command(author, version, about = "EEG brain key derivation", long_about = None)]
struct Cli {
    /// Log filter (e.g. "debug", "cortexkey_io=trace"); overrides RUST_LOG
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive keys from a recorded feed
    Derive(commands::derive::DeriveArgs),

    /// Derive keys continuously from a live feed on stdin
    Stream(commands::stream::StreamArgs),

    /// Write a synthetic recording in feed format
    Generate(commands::generate::GenerateArgs),

    /// Show how each frequency band is handled at a sample rate
    Bands(commands::bands::BandsArgs),

    /// Show, locate or initialize the configuration file
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Derive(args) => commands::derive::run(args),
        Commands::Stream(args) => commands::stream::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Bands(args) => commands::bands::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}

/// Logs go to stderr; stdout carries JSON and tables only.
fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
