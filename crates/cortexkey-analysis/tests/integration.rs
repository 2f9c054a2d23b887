//! Integration tests for cortexkey-analysis.
//!
//! Exercises filter design, zero-phase filtering, decomposition and feature
//! assembly through the public API with synthetic signals.

use std::f64::consts::PI;

use cortexkey_analysis::{
    BandDecomposer, FeatureAssembler, FilterError, SpectralAnalyzer, bandpass, filtfilt,
};
use cortexkey_core::{
    BAND_COUNT, ChannelBuffer, DerivationParams, FEATURES_PER_BAND, Snapshot, eeg_bands,
};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a sine wave at a given frequency and amplitude.
fn sine(freq_hz: f64, sample_rate: f64, num_samples: usize, amplitude: f64) -> Vec<f64> {
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / sample_rate).sin())
        .collect()
}

/// RMS of a signal slice.
fn rms(signal: &[f64]) -> f64 {
    (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
}

/// A full default buffer where channel `c` holds the constant `c + 1`.
fn constant_snapshot() -> Snapshot {
    let params = DerivationParams::default();
    let mut buffer = ChannelBuffer::new(params.num_channels(), params.capacity());
    let tick: Vec<f64> = (1..=8).map(f64::from).collect();
    for _ in 0..params.capacity() {
        buffer.push(&tick);
    }
    buffer.snapshot()
}

// ===========================================================================
// 1. Filtering
// ===========================================================================

#[test]
fn zero_phase_output_is_time_aligned() {
    let sample_rate = 256.0;
    let signal = sine(6.0, sample_rate, 1024, 1.0);
    let tf = bandpass(4, 4.0 / 128.0, 8.0 / 128.0).unwrap();
    let filtered = filtfilt(&tf, &signal).unwrap();

    // Zero-phase: the filtered sine crosses zero where the input does
    let mid = &filtered[256..768];
    let reference = &signal[256..768];
    let dot: f64 = mid.iter().zip(reference).map(|(a, b)| a * b).sum();
    let norm = rms(mid) * rms(reference) * mid.len() as f64;
    assert!(dot / norm > 0.99, "correlation {}", dot / norm);
}

#[test]
fn stopband_tone_is_attenuated() {
    let sample_rate = 256.0;
    let signal = sine(40.0, sample_rate, 1024, 1.0);
    let tf = bandpass(4, 4.0 / 128.0, 8.0 / 128.0).unwrap();
    let filtered = filtfilt(&tf, &signal).unwrap();
    assert!(rms(&filtered[256..768]) < 1e-3);
}

#[test]
fn undesignable_bands_report_cutoffs() {
    let err = bandpass(4, 1.6, 2.4).unwrap_err();
    assert_eq!(err, FilterError::CutoffOutOfRange { low: 1.6, high: 2.4 });
}

// ===========================================================================
// 2. Decomposition
// ===========================================================================

#[test]
fn decomposer_at_default_rate_filters_two_bands() {
    let decomposer = BandDecomposer::eeg(20.0, 4);
    let designed: Vec<&str> = decomposer
        .coverage()
        .into_iter()
        .filter(|(_, err)| err.is_none())
        .map(|(band, _)| band.name)
        .collect();
    assert_eq!(designed, ["delta", "theta"]);
}

#[test]
fn decomposer_filters_every_band_at_eeg_rates() {
    let decomposer = BandDecomposer::eeg(250.0, 4);
    assert!(decomposer.coverage().iter().all(|(_, err)| err.is_none()));
    let bands = decomposer.decompose(&sine(20.0, 250.0, 500, 1.0));
    assert_eq!(bands.len(), BAND_COUNT);
    assert!(bands.iter().all(|b| !b.is_fallback()));
}

#[test]
fn short_windows_fall_back_where_params_predict() {
    // (rate, seconds): every band sits below Nyquist, windows of 25, 27 and 28
    for (rate, secs) in [(64.0, 0.4), (67.5, 0.4), (70.0, 0.4)] {
        let params = DerivationParams::new(rate, secs, 1, 15.0, 4).unwrap();
        let decomposer = BandDecomposer::eeg(rate, params.filter_order());
        for (band, design) in decomposer.coverage() {
            assert!(design.is_none(), "{} should be designable", band.name);
        }

        let signal = sine(10.0, rate, params.capacity(), 1.0);
        let bands = decomposer.decompose(&signal);
        for band in &bands {
            assert_eq!(
                band.is_fallback(),
                !params.window_fits_filter(),
                "{} at {} samples",
                band.band.name,
                params.capacity()
            );
        }
    }
}

#[test]
fn edge_padding_matches_filter_extension() {
    for order in 1..=6 {
        let params = DerivationParams::new(256.0, 2.0, 1, 15.0, order).unwrap();
        let tf = bandpass(order, 0.1, 0.3).unwrap();
        assert_eq!(
            cortexkey_analysis::zero_phase::default_padlen(&tf),
            params.edge_padding(),
            "order {order}"
        );
    }
}

// ===========================================================================
// 3. Feature assembly
// ===========================================================================

#[test]
fn constant_channels_produce_finite_features() {
    let assembler = FeatureAssembler::from_params(&DerivationParams::default());
    let assembly = assembler.assemble(&constant_snapshot()).unwrap();
    assert_eq!(assembly.features.len(), 8 * BAND_COUNT * FEATURES_PER_BAND);
    assert!(assembly.features.as_slice().iter().all(|v| v.is_finite()));
}

#[test]
fn raw_fallback_features_scale_with_channel_value() {
    let assembler = FeatureAssembler::from_params(&DerivationParams::default());
    let assembly = assembler.assemble(&constant_snapshot()).unwrap();
    let features = assembly.features.as_slice();

    // Alpha of channel c is the raw constant c + 1: DC magnitude 40 * (c + 1)
    let per_channel = BAND_COUNT * FEATURES_PER_BAND;
    let alpha = eeg_bands::ALL
        .iter()
        .position(|b| b.name == "alpha")
        .unwrap();
    for c in 0..8 {
        let peak_power = features[c * per_channel + alpha * FEATURES_PER_BAND + 2];
        let expected = 40.0 * (c + 1) as f64;
        assert!((peak_power - expected).abs() < 1e-9, "channel {c}: {peak_power}");
    }
}

#[test]
fn spectral_analyzer_matches_assembler_for_raw_bands() {
    let snap = constant_snapshot();
    let analyzer = SpectralAnalyzer::new(40, 20.0);
    let raw = analyzer.analyze(snap.channel(3).unwrap()).unwrap();
    let assembly = FeatureAssembler::from_params(&DerivationParams::default())
        .assemble(&snap)
        .unwrap();
    let per_channel = BAND_COUNT * FEATURES_PER_BAND;
    let gamma = 4 * FEATURES_PER_BAND;
    let start = 3 * per_channel + gamma;
    assert_eq!(
        &assembly.features.as_slice()[start..start + FEATURES_PER_BAND],
        &raw.to_array()
    );
}

// ===========================================================================
// 4. Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Filtering preserves length and stays finite for bounded input.
    #[test]
    fn filtfilt_preserves_length(
        signal in prop::collection::vec(-1000.0f64..1000.0, 28..200),
    ) {
        let tf = bandpass(4, 0.05, 0.4).unwrap();
        let out = filtfilt(&tf, &signal).unwrap();
        prop_assert_eq!(out.len(), signal.len());
        prop_assert!(out.iter().all(|v| v.is_finite()));
    }

    /// Any full-length snapshot yields exactly the configured feature count.
    #[test]
    fn assembly_length_is_fixed(
        values in prop::collection::vec(-100.0f64..100.0, 320),
    ) {
        let channels: Vec<Vec<f64>> = values.chunks(40).map(<[f64]>::to_vec).collect();
        let assembler = FeatureAssembler::from_params(&DerivationParams::default());
        let assembly = assembler.assemble(&Snapshot::from_channels(channels)).unwrap();
        prop_assert_eq!(assembly.features.len(), 280);
    }
}
