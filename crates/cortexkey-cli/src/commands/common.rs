//! Shared CLI helpers used across multiple commands.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;
use cortexkey_config::Settings;
use serde::Serialize;

/// Path argument meaning stdin or stdout.
pub const STDIO: &str = "-";

/// Load settings from `config` (or the usual search path), apply a
/// tolerance override and validate the result.
///
/// Bands that cannot be filtered at the configured rate are logged once
/// here, before any key is derived.
pub fn load_settings(config: Option<&Path>, tolerance: Option<f64>) -> anyhow::Result<Settings> {
    let (mut settings, source) = Settings::load_or_default(config)?;
    match &source {
        Some(path) => tracing::info!(path = %path.display(), "loaded configuration"),
        None => tracing::debug!("using built-in configuration"),
    }

    if let Some(tolerance) = tolerance {
        settings.processor.tolerance_percent = tolerance;
    }

    let validation = settings.validate()?;
    let fallbacks = validation.fallback_bands();
    if !fallbacks.is_empty() {
        tracing::warn!(
            sample_rate = settings.processor.sample_rate,
            window = validation.params.capacity(),
            bands = ?fallbacks,
            "bands that cannot be filtered will use the raw signal"
        );
    }
    Ok(settings)
}

/// Open a line-oriented input; `-` reads stdin.
pub fn open_input(path: &Path) -> anyhow::Result<Box<dyn BufRead + Send>> {
    if path == Path::new(STDIO) {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Open an output; `-` writes to stdout.
pub fn open_output(path: &Path) -> anyhow::Result<Box<dyn Write>> {
    if path == Path::new(STDIO) {
        return Ok(Box::new(std::io::stdout().lock()));
    }
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(Box::new(std::io::BufWriter::new(file)))
}

/// Print `value` as one JSON line on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let line = serde_json::to_string(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_load_settings_applies_tolerance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Settings::default().save(&path).unwrap();

        let settings = load_settings(Some(path.as_path()), Some(40.0)).unwrap();
        assert_eq!(settings.processor.tolerance_percent, 40.0);
    }

    #[test]
    fn test_load_settings_rejects_bad_tolerance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        Settings::default().save(&path).unwrap();

        assert!(load_settings(Some(path.as_path()), Some(0.0)).is_err());
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");
        assert!(load_settings(Some(absent.as_path()), None).is_err());
    }

    #[test]
    fn test_open_input_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.jsonl");
        std::fs::write(&path, "one\ntwo\n").unwrap();

        let mut text = String::new();
        open_input(&path).unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "one\ntwo\n");
        assert!(open_input(&dir.path().join("missing")).is_err());
    }
}
