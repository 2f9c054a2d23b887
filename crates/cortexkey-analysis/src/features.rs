//! Feature vector assembly.
//!
//! Layout: for each channel in index order, for each band in table order,
//! the seven [`SpectralFeatures`] in field order. Eight channels and five
//! bands give 280 values.

use cortexkey_core::{
    DerivationParams, FEATURES_PER_BAND, FeatureVector, FrequencyBand, Snapshot,
};

use crate::error::{AnalysisError, FilterError};
use crate::filterbank::{BandDecomposer, BandSignal};
use crate::spectral::{SpectralAnalyzer, SpectralFeatures};

/// A band that used the raw signal instead of a filtered one.
#[derive(Debug, Clone, PartialEq)]
pub struct Fallback {
    /// Channel index.
    pub channel: usize,
    /// Band name.
    pub band: &'static str,
    /// Why filtering was skipped.
    pub reason: FilterError,
}

/// Band signals for every channel of a snapshot.
#[derive(Debug, Clone)]
pub struct Decomposition {
    channels: Vec<Vec<BandSignal>>,
}

impl Decomposition {
    /// Per-channel band signals.
    pub fn channels(&self) -> &[Vec<BandSignal>] {
        &self.channels
    }

    /// Every band that fell back to the raw signal.
    pub fn fallbacks(&self) -> Vec<Fallback> {
        self.channels
            .iter()
            .enumerate()
            .flat_map(|(channel, bands)| {
                bands.iter().filter_map(move |b| {
                    b.fallback.clone().map(|reason| Fallback {
                        channel,
                        band: b.band.name,
                        reason,
                    })
                })
            })
            .collect()
    }
}

/// Output of [`FeatureAssembler::assemble`].
#[derive(Debug, Clone)]
pub struct Assembly {
    /// The flat feature vector.
    pub features: FeatureVector,
    /// Bands that used the raw signal.
    pub fallbacks: Vec<Fallback>,
}

/// Turns a buffer snapshot into a feature vector.
#[derive(Debug)]
pub struct FeatureAssembler {
    decomposer: BandDecomposer,
    analyzer: SpectralAnalyzer,
    num_channels: usize,
}

impl FeatureAssembler {
    /// Assembler for `num_channels` channels of `window_len` samples.
    pub fn new(
        sample_rate: f64,
        bands: &[FrequencyBand],
        order: usize,
        num_channels: usize,
        window_len: usize,
    ) -> Self {
        Self {
            decomposer: BandDecomposer::new(sample_rate, bands, order),
            analyzer: SpectralAnalyzer::new(window_len, sample_rate),
            num_channels,
        }
    }

    /// Assembler over the standard EEG bands, sized from `params`.
    pub fn from_params(params: &DerivationParams) -> Self {
        Self {
            decomposer: BandDecomposer::eeg(params.sample_rate(), params.filter_order()),
            analyzer: SpectralAnalyzer::new(params.capacity(), params.sample_rate()),
            num_channels: params.num_channels(),
        }
    }

    /// The band decomposer.
    pub fn decomposer(&self) -> &BandDecomposer {
        &self.decomposer
    }

    /// Length of the vector produced for a full snapshot.
    pub fn feature_len(&self) -> usize {
        self.num_channels * self.decomposer.num_bands() * FEATURES_PER_BAND
    }

    /// Split every channel of `snapshot` into bands.
    pub fn decompose(&self, snapshot: &Snapshot) -> Result<Decomposition, AnalysisError> {
        if snapshot.num_channels() != self.num_channels {
            return Err(AnalysisError::ChannelMismatch {
                expected: self.num_channels,
                got: snapshot.num_channels(),
            });
        }
        let channels = snapshot
            .channels()
            .iter()
            .map(|signal| self.decomposer.decompose(signal))
            .collect();
        Ok(Decomposition { channels })
    }

    /// Extract features from every band signal, in layout order.
    pub fn extract(&self, decomposition: &Decomposition) -> Result<FeatureVector, AnalysisError> {
        let mut features = FeatureVector::with_capacity(self.feature_len());
        for bands in &decomposition.channels {
            for band in bands {
                let spectral: SpectralFeatures = self.analyzer.analyze(&band.samples)?;
                features.extend_from_slice(&spectral.to_array());
            }
        }
        Ok(features)
    }

    /// Decompose and extract in one step.
    pub fn assemble(&self, snapshot: &Snapshot) -> Result<Assembly, AnalysisError> {
        let decomposition = self.decompose(snapshot)?;
        let features = self.extract(&decomposition)?;
        Ok(Assembly {
            features,
            fallbacks: decomposition.fallbacks(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortexkey_core::eeg_bands;

    fn ramp_snapshot(channels: usize, len: usize) -> Snapshot {
        Snapshot::from_channels(
            (0..channels)
                .map(|c| (0..len).map(|i| ((i * (c + 3)) % 7) as f64).collect())
                .collect(),
        )
    }

    #[test]
    fn test_default_layout_is_280() {
        let assembler = FeatureAssembler::from_params(&DerivationParams::default());
        assert_eq!(assembler.feature_len(), 280);
        let out = assembler.assemble(&ramp_snapshot(8, 40)).unwrap();
        assert_eq!(out.features.len(), 280);
    }

    #[test]
    fn test_fallbacks_reported_per_channel() {
        let assembler = FeatureAssembler::from_params(&DerivationParams::default());
        let out = assembler.assemble(&ramp_snapshot(8, 40)).unwrap();
        // alpha, beta, gamma on each of 8 channels
        assert_eq!(out.fallbacks.len(), 24);
        assert!(out.fallbacks.iter().all(|f| f.band != "delta" && f.band != "theta"));
        assert_eq!(out.fallbacks[0].channel, 0);
        assert_eq!(out.fallbacks[23].channel, 7);
    }

    #[test]
    fn test_channel_mismatch() {
        let assembler = FeatureAssembler::from_params(&DerivationParams::default());
        assert_eq!(
            assembler.assemble(&ramp_snapshot(7, 40)).err(),
            Some(AnalysisError::ChannelMismatch {
                expected: 8,
                got: 7
            })
        );
    }

    #[test]
    fn test_fallback_band_features_match_raw() {
        let assembler = FeatureAssembler::from_params(&DerivationParams::default());
        let snap = ramp_snapshot(8, 40);
        let out = assembler.assemble(&snap).unwrap();

        let raw = SpectralAnalyzer::new(40, 20.0)
            .analyze(snap.channel(0).unwrap())
            .unwrap()
            .to_array();
        // channel 0, alpha = band index 2
        let start = 2 * FEATURES_PER_BAND;
        assert_eq!(&out.features.as_slice()[start..start + FEATURES_PER_BAND], &raw);
    }

    #[test]
    fn test_deterministic() {
        let assembler = FeatureAssembler::from_params(&DerivationParams::default());
        let snap = ramp_snapshot(8, 40);
        let a = assembler.assemble(&snap).unwrap();
        let b = assembler.assemble(&snap).unwrap();
        assert_eq!(a.features, b.features);
    }

    #[test]
    fn test_custom_band_table() {
        let bands = [eeg_bands::DELTA, eeg_bands::THETA];
        let assembler = FeatureAssembler::new(20.0, &bands, 4, 2, 40);
        assert_eq!(assembler.feature_len(), 28);
        let out = assembler.assemble(&ramp_snapshot(2, 40)).unwrap();
        assert_eq!(out.features.len(), 28);
        assert!(out.fallbacks.is_empty());
    }
}
