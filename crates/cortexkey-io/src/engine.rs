//! Shared key derivation engine.
//!
//! One [`KeyEngine`] is built per running instance and shared by handle
//! (`Arc<KeyEngine>`) between the ingestion thread and request handlers.
//!
//! Locking:
//! - the sample buffer has its own mutex, held only to push a tick or to
//!   copy a snapshot, so ingestion never waits on a derivation;
//! - derivations are serialized by a dedicated mutex;
//! - the history has its own mutex, taken once per successful derivation.
//!
//! The in-progress flag is a status indicator only. It is set and cleared
//! by a guard, so every exit path clears it.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use cortexkey_analysis::{AnalysisError, Fallback, FeatureAssembler};
use cortexkey_config::{ConfigError, Settings};
use cortexkey_core::{
    BrainKey, ChannelBuffer, DerivationParams, KeyHistory, normalize_and_quantize,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::link::ConnectionState;

/// Message attached to every successful [`KeyResponse`].
pub const SUCCESS_MESSAGE: &str = "Success";

/// Current position of the derivation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationStage {
    /// No derivation has run yet.
    Idle,
    /// Copying the buffer.
    Snapshotting,
    /// Band-pass filtering every channel.
    Decomposing,
    /// Computing spectral features.
    Extracting,
    /// Normalizing and snapping to the tolerance grid.
    Quantizing,
    /// Expanding into key bytes.
    Hashing,
    /// The last derivation produced a key.
    Done,
    /// The last derivation failed after its snapshot.
    Error,
}

impl fmt::Display for DerivationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Snapshotting => "snapshotting",
            Self::Decomposing => "decomposing",
            Self::Extracting => "extracting",
            Self::Quantizing => "quantizing",
            Self::Hashing => "hashing",
            Self::Done => "done",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// A successfully derived key and its context.
#[derive(Debug, Clone)]
pub struct DerivedKey {
    /// The key.
    pub key: BrainKey,
    /// History consistency right after this key was recorded.
    pub consistency: f64,
    /// Bands that used the raw signal.
    pub fallbacks: Vec<Fallback>,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

/// Outcome of a key-generation request, as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum KeyResponse {
    /// A key was derived.
    Success {
        /// Base64 text of the key.
        brain_key: String,
        /// Length of `brain_key` in characters.
        key_length: usize,
        /// History consistency in percent.
        consistency: f64,
        /// Human-readable outcome.
        message: String,
        /// Seconds since the Unix epoch.
        timestamp: f64,
    },
    /// No key was derived.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl KeyResponse {
    /// True for [`KeyResponse::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The key text, if any.
    pub fn brain_key(&self) -> Option<&str> {
        match self {
            Self::Success { brain_key, .. } => Some(brain_key),
            Self::Error { .. } => None,
        }
    }
}

/// Snapshot of engine state for status queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Every channel is full.
    pub buffer_ready: bool,
    /// A derivation is running.
    pub is_processing: bool,
    /// The feed link is connected.
    pub feed_connected: bool,
    /// Keys in history.
    pub key_history_count: usize,
    /// First characters of the last key's text, if any.
    pub last_key_preview: Option<String>,
    /// Fill level of the least-filled channel, 0 to 1.
    pub buffer_fill: f64,
    /// Pipeline stage.
    pub stage: DerivationStage,
    /// Feed link state, when a feed is attached.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub feed: Option<ConnectionState>,
}

/// Counts a derivation as running until dropped, and raises `peak` to the
/// highest count seen.
struct InProgress<'a>(&'a AtomicUsize);

impl<'a> InProgress<'a> {
    fn enter(running: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(running)
    }
}

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The processing context: buffer, pipeline and history.
#[derive(Debug)]
pub struct KeyEngine {
    params: DerivationParams,
    assembler: FeatureAssembler,
    buffer: Mutex<ChannelBuffer>,
    history: Mutex<KeyHistory>,
    derivation: Mutex<()>,
    running: AtomicUsize,
    peak_running: AtomicUsize,
    stage: Mutex<DerivationStage>,
    feed: Mutex<Option<ConnectionState>>,
}

impl KeyEngine {
    /// Create an engine with an empty buffer and the given history.
    pub fn new(params: DerivationParams, history: KeyHistory) -> Self {
        let assembler = FeatureAssembler::from_params(&params);
        tracing::info!(
            capacity = params.capacity(),
            channels = params.num_channels(),
            sample_rate = params.sample_rate(),
            tolerance = params.tolerance().percent(),
            "key engine initialized"
        );
        Self {
            buffer: Mutex::new(ChannelBuffer::new(params.num_channels(), params.capacity())),
            params,
            assembler,
            history: Mutex::new(history),
            derivation: Mutex::new(()),
            running: AtomicUsize::new(0),
            peak_running: AtomicUsize::new(0),
            stage: Mutex::new(DerivationStage::Idle),
            feed: Mutex::new(None),
        }
    }

    /// Create an engine from validated settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(settings.to_params()?, settings.new_history()?))
    }

    /// Pipeline parameters.
    pub fn params(&self) -> &DerivationParams {
        &self.params
    }

    /// Append one tick. Channel `i` takes `values[i]`; extra values are
    /// ignored and missing ones leave their channel untouched.
    pub fn add_sample(&self, values: &[f64]) {
        self.buffer.lock().push(values);
    }

    /// Every channel holds a full window.
    pub fn is_ready(&self) -> bool {
        self.buffer.lock().is_ready()
    }

    /// Samples on the least-filled channel.
    pub fn buffered(&self) -> usize {
        self.buffer.lock().min_len()
    }

    /// A derivation is running.
    pub fn is_processing(&self) -> bool {
        self.running.load(Ordering::SeqCst) > 0
    }

    /// Most derivations ever seen inside the pipeline at the same time.
    ///
    /// Zero before the first call, one afterwards.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_running.load(Ordering::SeqCst)
    }

    /// Current pipeline stage.
    pub fn stage(&self) -> DerivationStage {
        *self.stage.lock()
    }

    /// Keys in history.
    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// Consistency over the recent history window.
    pub fn consistency(&self) -> f64 {
        self.history.lock().consistency()
    }

    /// The most recent key.
    pub fn last_key(&self) -> Option<BrainKey> {
        self.history.lock().last().cloned()
    }

    /// Record the state of an attached feed.
    pub fn set_feed_state(&self, state: ConnectionState) {
        *self.feed.lock() = Some(state);
    }

    /// Feed state, or `None` when no feed is attached.
    pub fn feed_state(&self) -> Option<ConnectionState> {
        *self.feed.lock()
    }

    fn set_stage(&self, stage: DerivationStage) {
        tracing::debug!(%stage, "derivation stage");
        *self.stage.lock() = stage;
    }

    fn failed(&self, stage: DerivationStage, source: AnalysisError) -> EngineError {
        self.set_stage(DerivationStage::Error);
        let err = EngineError::Derivation { stage, source };
        tracing::error!(error = %err, "key derivation failed");
        err
    }

    /// Derive a key from the current buffer and record it in history.
    ///
    /// Concurrent calls run one at a time. Refuses without side effects
    /// while the buffer is not full.
    pub fn derive(&self) -> Result<DerivedKey, EngineError> {
        let _serial = self.derivation.lock();
        let _running = InProgress::enter(&self.running, &self.peak_running);

        let snapshot = {
            let buffer = self.buffer.lock();
            if !buffer.is_ready() {
                return Err(EngineError::InsufficientData {
                    buffered: buffer.min_len(),
                    required: buffer.capacity(),
                });
            }
            self.set_stage(DerivationStage::Snapshotting);
            buffer.snapshot()
        };

        self.set_stage(DerivationStage::Decomposing);
        let decomposition = self
            .assembler
            .decompose(&snapshot)
            .map_err(|e| self.failed(DerivationStage::Decomposing, e))?;
        let fallbacks = decomposition.fallbacks();

        self.set_stage(DerivationStage::Extracting);
        let features = self
            .assembler
            .extract(&decomposition)
            .map_err(|e| self.failed(DerivationStage::Extracting, e))?;

        self.set_stage(DerivationStage::Quantizing);
        let quantized = normalize_and_quantize(&features, self.params.tolerance());

        self.set_stage(DerivationStage::Hashing);
        let key = BrainKey::derive(&quantized);

        let consistency = {
            let mut history = self.history.lock();
            history.push(key.clone());
            history.consistency()
        };
        self.set_stage(DerivationStage::Done);

        tracing::info!(
            preview = %key.preview(),
            length = key.to_base64().len(),
            consistency,
            fallbacks = fallbacks.len(),
            "generated brain key"
        );

        Ok(DerivedKey {
            key,
            consistency,
            fallbacks,
            timestamp: unix_now(),
        })
    }

    /// Derive a key and package the outcome for a caller.
    pub fn generate_key(&self) -> KeyResponse {
        match self.derive() {
            Ok(derived) => {
                let brain_key = derived.key.to_base64();
                KeyResponse::Success {
                    key_length: brain_key.len(),
                    brain_key,
                    consistency: derived.consistency,
                    message: SUCCESS_MESSAGE.to_string(),
                    timestamp: derived.timestamp,
                }
            }
            Err(EngineError::InsufficientData { .. }) => KeyResponse::Error {
                message: self.insufficient_data_message(),
            },
            Err(err) => KeyResponse::Error {
                message: err.to_string(),
            },
        }
    }

    fn insufficient_data_message(&self) -> String {
        format!(
            "Insufficient data. Need {} seconds of EEG data.",
            self.params.buffer_duration_secs()
        )
    }

    /// Current status.
    pub fn status(&self) -> StatusReport {
        let (buffer_ready, buffer_fill) = {
            let buffer = self.buffer.lock();
            (buffer.is_ready(), buffer.fill_ratio())
        };
        let (key_history_count, last_key_preview) = {
            let history = self.history.lock();
            (history.len(), history.last().map(BrainKey::preview))
        };
        let feed = self.feed_state();
        StatusReport {
            buffer_ready,
            is_processing: self.is_processing(),
            feed_connected: feed == Some(ConnectionState::Connected),
            key_history_count,
            last_key_preview,
            buffer_fill,
            stage: self.stage(),
            feed,
        }
    }
}

pub(crate) fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
