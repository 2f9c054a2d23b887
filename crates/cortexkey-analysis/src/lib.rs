//! Cortexkey Analysis - band decomposition and spectral features
//!
//! This crate turns a buffer snapshot into the feature vector that keys are
//! derived from:
//!
//! - [`butterworth`] - band-pass Butterworth design
//! - [`iir`] - transfer functions, filtering and steady-state conditions
//! - [`zero_phase`] - forward-backward filtering with odd edge extension
//! - [`fft`] - FFT wrapper for real signals
//! - [`spectral`] - the seven per-band spectral features
//! - [`filterbank`] - per-band decomposition with raw-signal fallback
//! - [`features`] - channel x band x feature assembly
//!
//! ## Example
//!
//! ```rust
//! use cortexkey_analysis::FeatureAssembler;
//! use cortexkey_core::{ChannelBuffer, DerivationParams};
//!
//! let params = DerivationParams::default();
//! let mut buffer = ChannelBuffer::new(params.num_channels(), params.capacity());
//! for i in 0..params.capacity() {
//!     let tick: Vec<f64> = (0..8).map(|c| ((i + c) % 5) as f64).collect();
//!     buffer.push(&tick);
//! }
//!
//! let assembler = FeatureAssembler::from_params(&params);
//! let assembly = assembler.assemble(&buffer.snapshot()).unwrap();
//! assert_eq!(assembly.features.len(), 280);
//! ```

pub mod butterworth;
pub mod error;
pub mod features;
pub mod fft;
pub mod filterbank;
pub mod iir;
pub mod spectral;
pub mod zero_phase;

pub use butterworth::{bandpass, bandpass_for};
pub use error::{AnalysisError, FilterError};
pub use features::{Assembly, Decomposition, Fallback, FeatureAssembler};
pub use fft::Fft;
pub use filterbank::{BandDecomposer, BandSignal};
pub use iir::TransferFunction;
pub use spectral::{SpectralAnalyzer, SpectralFeatures};
pub use zero_phase::{filtfilt, odd_extend};
