//! Continuous key derivation from a live feed.
//!
//! A reader thread turns input lines into feed events. This thread applies
//! them to the engine, prints link and rejection events as they happen, and
//! derives a key every `--every` accepted ticks once the buffer is full.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use cortexkey_io::{EngineEvent, Ingestor, KeyEngine, pump_lines};
use crossbeam_channel::{Receiver, bounded};

use super::common;

/// Stream a live feed.
#[derive(Args)]
pub struct StreamArgs {
    /// Feed source ("-" for stdin)
    #[arg(short, long, default_value = common::STDIO)]
    input: PathBuf,

    /// Derive a key every N accepted ticks once the buffer is full
    #[arg(long, default_value = "40", value_parser = clap::value_parser!(u64).range(1..))]
    every: u64,

    /// Also print an event for every accepted tick
    #[arg(long)]
    samples: bool,

    /// Quantization tolerance percentage (overrides the configuration)
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Run the stream command.
pub fn run(args: StreamArgs) -> anyhow::Result<()> {
    let settings = common::load_settings(args.config.as_deref(), args.tolerance)?;
    let engine = Arc::new(KeyEngine::from_settings(&settings)?);

    let (feed_tx, feed_rx) = bounded(settings.feed.queue_capacity);
    let (event_tx, event_rx) = bounded(settings.feed.queue_capacity);
    let mut ingestor =
        Ingestor::new(Arc::clone(&engine), settings.feed.log_every).with_events(event_tx);

    let reader = common::open_input(&args.input)?;
    let pump = std::thread::Builder::new()
        .name("cortexkey-feed".to_string())
        .spawn(move || pump_lines(reader, &feed_tx))?;

    let mut derived = 0u64;
    for event in &feed_rx {
        let accepted = matches!(ingestor.handle(event), Ok(Some(_)));
        print_events(&event_rx, args.samples)?;

        if accepted && ingestor.stats().accepted % args.every == 0 && engine.is_ready() {
            common::print_json(&engine.generate_key())?;
            derived += 1;
        }
    }

    let lines = pump
        .join()
        .map_err(|_| anyhow::anyhow!("feed thread panicked"))??;
    print_events(&event_rx, args.samples)?;

    let stats = ingestor.stats();
    tracing::info!(
        lines,
        accepted = stats.accepted,
        rejected = stats.rejected,
        keys = derived,
        "feed closed"
    );
    common::print_json(&engine.status())
}

fn print_events(events: &Receiver<EngineEvent>, samples: bool) -> anyhow::Result<()> {
    for event in events.try_iter() {
        if samples || !matches!(event, EngineEvent::Sample { .. }) {
            common::print_json(&event)?;
        }
    }
    Ok(())
}
