//! Bounded per-channel sample store.
//!
//! Each channel is a ring of at most `capacity` samples. Pushing into a
//! full ring evicts the oldest sample, so the buffer always holds the most
//! recent window of the feed.

use std::collections::VecDeque;

/// Fixed-capacity ring buffers, one per channel.
///
/// The buffer itself is not synchronized; the engine wraps it in a mutex and
/// only hands out [`Snapshot`]s.
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    channels: Vec<VecDeque<f64>>,
    capacity: usize,
}

impl ChannelBuffer {
    /// Create empty buffers for `num_channels` channels.
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        Self {
            channels: (0..num_channels)
                .map(|_| VecDeque::with_capacity(capacity))
                .collect(),
            capacity,
        }
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Samples each channel holds when full.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one tick: value `i` goes to channel `i`.
    ///
    /// Values past the channel count are ignored. A short tick only touches
    /// the channels it has values for. A zero-capacity buffer stays empty.
    pub fn push(&mut self, values: &[f64]) {
        if self.capacity == 0 {
            return;
        }
        for (ring, &value) in self.channels.iter_mut().zip(values) {
            while ring.len() >= self.capacity {
                ring.pop_front();
            }
            ring.push_back(value);
        }
    }

    /// Samples currently held by `channel`, or `None` if out of range.
    pub fn len(&self, channel: usize) -> Option<usize> {
        self.channels.get(channel).map(VecDeque::len)
    }

    /// Samples held by the emptiest channel.
    pub fn min_len(&self) -> usize {
        self.channels.iter().map(VecDeque::len).min().unwrap_or(0)
    }

    /// True when every channel holds a full window.
    pub fn is_ready(&self) -> bool {
        self.channels.iter().all(|ring| ring.len() >= self.capacity)
    }

    /// Fill level of the emptiest channel in `[0, 1]`.
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity == 0 {
            return 1.0;
        }
        self.min_len() as f64 / self.capacity as f64
    }

    /// Copy the current contents, oldest sample first.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            channels: self
                .channels
                .iter()
                .map(|ring| ring.iter().copied().collect())
                .collect(),
        }
    }

    /// Drop all samples.
    pub fn clear(&mut self) {
        for ring in &mut self.channels {
            ring.clear();
        }
    }
}

/// Immutable copy of a [`ChannelBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    channels: Vec<Vec<f64>>,
}

impl Snapshot {
    /// Build a snapshot directly from per-channel samples.
    pub fn from_channels(channels: Vec<Vec<f64>>) -> Self {
        Self { channels }
    }

    /// Per-channel samples in channel order.
    pub fn channels(&self) -> &[Vec<f64>] {
        &self.channels
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> Option<&[f64]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
}
