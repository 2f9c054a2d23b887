//! Key derivation from a recorded feed.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use cortexkey_io::{Ingestor, KeyEngine, KeyResponse, pump_lines, spawn_ingestor};
use crossbeam_channel::bounded;

use super::common;

/// Derive keys from a recording.
#[derive(Args)]
pub struct DeriveArgs {
    /// Recording with one feed message per line ("-" for stdin)
    #[arg(value_name = "RECORDING")]
    recording: PathBuf,

    /// Number of keys to derive from the final window
    #[arg(short = 'n', long, default_value = "1")]
    count: usize,

    /// Quantization tolerance percentage (overrides the configuration)
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Run the derive command.
///
/// Prints one `KeyResponse` JSON line per requested key, then the engine
/// status. Fails when no key could be derived.
pub fn run(args: DeriveArgs) -> anyhow::Result<()> {
    let settings = common::load_settings(args.config.as_deref(), args.tolerance)?;
    let engine = Arc::new(KeyEngine::from_settings(&settings)?);

    let (tx, rx) = bounded(settings.feed.queue_capacity);
    let ingestor = Ingestor::new(Arc::clone(&engine), settings.feed.log_every);
    let handle = spawn_ingestor(ingestor, rx)?;

    let reader = common::open_input(&args.recording)?;
    let sent = pump_lines(reader, &tx)?;
    drop(tx);
    let stats = handle
        .join()
        .map_err(|_| anyhow::anyhow!("ingest thread panicked"))?;

    tracing::info!(
        lines = sent,
        accepted = stats.accepted,
        rejected = stats.rejected,
        substituted = stats.substituted,
        "recording ingested"
    );

    let mut last_error = None;
    let mut derived = 0;
    for _ in 0..args.count {
        let response = engine.generate_key();
        common::print_json(&response)?;
        match response {
            KeyResponse::Success { .. } => derived += 1,
            KeyResponse::Error { message } => last_error = Some(message),
        }
    }
    common::print_json(&engine.status())?;

    match last_error {
        Some(message) if derived == 0 => anyhow::bail!("no key derived: {message}"),
        _ => Ok(()),
    }
}
