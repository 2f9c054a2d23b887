//! Synthetic recording generation.
//!
//! Writes feed messages, one JSON object per line, that `derive` and
//! `stream` accept.

use std::f64::consts::PI;
use std::io::Write;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde_json::json;

use super::common;

/// Signal shapes for synthetic recordings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SignalMode {
    /// The same values on every tick
    #[default]
    Constant,
    /// Band rhythms plus noise, different on every channel
    Eeg,
}

/// Write a synthetic recording.
#[derive(Args)]
pub struct GenerateArgs {
    /// Output file ("-" for stdout)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Number of ticks to write
    #[arg(long, default_value = "40")]
    ticks: usize,

    /// Signal shape
    #[arg(long, value_enum, default_value = "constant")]
    mode: SignalMode,

    /// Channel values for constant mode (comma-separated)
    #[arg(long, value_delimiter = ',', default_value = "1,2,3,4,5,6,7,8")]
    values: Vec<f64>,

    /// Channel count for eeg mode
    #[arg(long, default_value = "8")]
    channels: usize,

    /// Sample rate in Hz, used for rhythms and timestamps
    #[arg(long, default_value = "20.0")]
    sample_rate: f64,

    /// Noise seed for eeg mode
    #[arg(long, default_value = "1")]
    seed: u32,

    /// Add a timestamp field to each message
    #[arg(long)]
    timestamps: bool,
}

/// Run the generate command.
pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    if args.sample_rate <= 0.0 || !args.sample_rate.is_finite() {
        anyhow::bail!("sample rate must be positive, got {}", args.sample_rate);
    }

    let mut signal = Signal::new(&args);
    let mut out = common::open_output(&args.output)?;
    for i in 0..args.ticks {
        let values = signal.tick(i);
        let timestamp = args.timestamps.then(|| i as f64 / args.sample_rate);
        writeln!(out, "{}", message(&values, timestamp))?;
    }
    out.flush()?;

    tracing::info!(
        ticks = args.ticks,
        mode = ?args.mode,
        output = %args.output.display(),
        "recording written"
    );
    Ok(())
}

/// Centre frequencies of the rhythms mixed into eeg mode, one per band.
const RHYTHMS_HZ: [f64; 5] = [2.0, 6.0, 10.0, 20.0, 35.0];

struct Signal {
    mode: SignalMode,
    values: Vec<f64>,
    channels: usize,
    sample_rate: f64,
    state: u32,
}

impl Signal {
    fn new(args: &GenerateArgs) -> Self {
        Self {
            mode: args.mode,
            values: args.values.clone(),
            channels: args.channels,
            sample_rate: args.sample_rate,
            // xorshift has a fixed point at zero
            state: args.seed.max(1),
        }
    }

    fn tick(&mut self, i: usize) -> Vec<f64> {
        match self.mode {
            SignalMode::Constant => self.values.clone(),
            SignalMode::Eeg => {
                let t = i as f64 / self.sample_rate;
                (0..self.channels)
                    .map(|ch| {
                        let ch = ch as f64;
                        let rhythm: f64 = RHYTHMS_HZ
                            .iter()
                            .enumerate()
                            .map(|(k, hz)| {
                                let amplitude = 20.0 / (k as f64 + 1.0);
                                let phase = 0.4 * ch * (k as f64 + 1.0);
                                amplitude * (2.0 * PI * hz * t + phase).sin()
                            })
                            .sum();
                        rhythm + 2.0 * self.noise()
                    })
                    .collect()
            }
        }
    }

    fn noise(&mut self) -> f64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        f64::from(self.state as i32) / f64::from(i32::MAX)
    }
}

fn message(values: &[f64], timestamp: Option<f64>) -> String {
    let channels: Vec<_> = values.iter().map(|v| json!({ "value": v })).collect();
    let mut msg = json!({ "channels": channels });
    if let Some(ts) = timestamp {
        msg["timestamp"] = json!(ts);
    }
    msg.to_string()
}
