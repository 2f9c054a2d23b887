//! Band table display.

use std::path::PathBuf;

use clap::Args;
use cortexkey_config::{BandCoverage, Settings, Validation};

/// Show the band table.
#[derive(Args)]
pub struct BandsArgs {
    /// Sample rate in Hz (overrides the configuration)
    #[arg(long)]
    sample_rate: Option<f64>,

    /// Configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Run the bands command.
pub fn run(args: BandsArgs) -> anyhow::Result<()> {
    let (mut settings, _) = Settings::load_or_default(args.config.as_deref())?;
    if let Some(rate) = args.sample_rate {
        settings.processor.sample_rate = rate;
    }
    let validation = settings.validate()?;

    print!("{}", render(&validation));
    Ok(())
}

fn render(validation: &Validation) -> String {
    let params = &validation.params;
    let mut out = format!(
        "Sample rate: {} Hz (Nyquist {} Hz), order {}, window {} samples\n\n",
        params.sample_rate(),
        params.sample_rate() / 2.0,
        params.filter_order(),
        params.capacity()
    );
    out.push_str(&format!(
        "{:<8} {:>14} {:>18}  {}\n",
        "Band", "Range (Hz)", "Normalized", "Handling"
    ));
    out.push_str(&format!("{}\n", "-".repeat(56)));
    for coverage in &validation.coverage {
        out.push_str(&row(coverage));
    }
    out
}

fn row(coverage: &BandCoverage) -> String {
    let band = coverage.band;
    let (low, high) = coverage.normalized;
    let handling = match coverage.fallback {
        None => "bandpass".to_string(),
        Some(reason) => format!("raw signal ({reason})"),
    };
    format!(
        "{:<8} {:>14} {:>18}  {}\n",
        band.name,
        format!("{}-{}", band.low_hz, band.high_hz),
        format!("{low:.3}-{high:.3}"),
        handling
    )
}
