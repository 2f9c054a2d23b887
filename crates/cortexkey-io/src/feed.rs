//! Feed message decoding.
//!
//! One JSON object per tick:
//!
//! ```json
//! {"channels": [{"value": 12.5}, {"value": "13.1"}, ...], "timestamp": 1712.5}
//! ```
//!
//! A channel entry that is not an object with a usable `value` decodes to
//! 0.0 and is reported in [`Tick::substituted`]. Numbers, numeric strings
//! and booleans are usable. A tick whose entry count differs from the
//! configured channel count is rejected as a whole.

use serde_json::Value;

use crate::error::FeedError;

/// A decoded tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// One value per channel.
    pub values: Vec<f64>,
    /// Sender timestamp, if the message carried a numeric one.
    pub timestamp: Option<f64>,
    /// Indices of entries replaced by 0.0.
    pub substituted: Vec<usize>,
}

/// Decodes feed messages for a fixed channel count.
#[derive(Debug, Clone, Copy)]
pub struct TickDecoder {
    expected_channels: usize,
}

impl TickDecoder {
    /// Decoder for ticks of `expected_channels` entries.
    pub fn new(expected_channels: usize) -> Self {
        Self { expected_channels }
    }

    /// Configured channel count.
    pub fn expected_channels(&self) -> usize {
        self.expected_channels
    }

    /// Decode one message.
    pub fn decode(&self, text: &str) -> Result<Tick, FeedError> {
        let message: Value = serde_json::from_str(text)?;
        let Value::Object(fields) = message else {
            return Err(FeedError::NotAnObject);
        };
        let Some(channels) = fields.get("channels") else {
            return Err(FeedError::MissingChannels {
                keys: fields.keys().cloned().collect(),
            });
        };
        let Value::Array(entries) = channels else {
            return Err(FeedError::ChannelsNotArray);
        };

        let mut values = Vec::with_capacity(entries.len());
        let mut substituted = Vec::new();
        for (i, entry) in entries.iter().enumerate() {
            match channel_value(entry) {
                Some(v) => values.push(v),
                None => {
                    tracing::warn!(channel = i, entry = %entry, "invalid channel value, using 0.0");
                    substituted.push(i);
                    values.push(0.0);
                }
            }
        }

        if values.len() != self.expected_channels {
            return Err(FeedError::ChannelCountMismatch {
                expected: self.expected_channels,
                got: values.len(),
            });
        }

        Ok(Tick {
            values,
            timestamp: fields.get("timestamp").and_then(Value::as_f64),
            substituted,
        })
    }
}

/// Numeric reading of one channel entry.
fn channel_value(entry: &Value) -> Option<f64> {
    match entry.as_object()?.get("value")? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
