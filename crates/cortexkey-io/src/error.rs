//! Error types for the engine and the feed.

use cortexkey_analysis::AnalysisError;
use thiserror::Error;

use crate::engine::DerivationStage;

/// Why a derivation produced no key.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// The buffer is not full on every channel yet.
    #[error("insufficient data: {buffered} of {required} samples buffered")]
    InsufficientData {
        /// Samples on the least-filled channel.
        buffered: usize,
        /// Samples needed per channel.
        required: usize,
    },

    /// A pipeline stage failed after the snapshot was taken.
    #[error("derivation failed while {stage}: {source}")]
    Derivation {
        /// Stage that failed.
        stage: DerivationStage,
        /// Underlying error.
        #[source]
        source: AnalysisError,
    },
}

/// Why a feed message was rejected. Rejected ticks never reach the buffer.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The message is not valid JSON.
    #[error("malformed feed message: {0}")]
    Json(#[from] serde_json::Error),

    /// The message is JSON but not an object.
    #[error("feed message is not a JSON object")]
    NotAnObject,

    /// The object has no `channels` key.
    #[error("feed message has no 'channels' key (keys: {})", keys.join(", "))]
    MissingChannels {
        /// Keys that were present.
        keys: Vec<String>,
    },

    /// `channels` is not an array.
    #[error("'channels' must be an array")]
    ChannelsNotArray,

    /// Wrong number of channel entries; the tick is dropped.
    #[error("channel count mismatch: expected {expected}, got {got}")]
    ChannelCountMismatch {
        /// Configured channel count.
        expected: usize,
        /// Entries in the message.
        got: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_display() {
        let err = EngineError::InsufficientData {
            buffered: 12,
            required: 40,
        };
        assert_eq!(err.to_string(), "insufficient data: 12 of 40 samples buffered");
    }

    #[test]
    fn derivation_display_names_stage() {
        let err = EngineError::Derivation {
            stage: DerivationStage::Extracting,
            source: AnalysisError::SignalTooShort { len: 1 },
        };
        assert!(err.to_string().starts_with("derivation failed while extracting"));
    }

    #[test]
    fn missing_channels_lists_keys() {
        let err = FeedError::MissingChannels {
            keys: vec!["timestamp".to_string(), "data".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "feed message has no 'channels' key (keys: timestamp, data)"
        );
    }

    #[test]
    fn count_mismatch_display() {
        let err = FeedError::ChannelCountMismatch {
            expected: 8,
            got: 7,
        };
        assert_eq!(err.to_string(), "channel count mismatch: expected 8, got 7");
    }
}
