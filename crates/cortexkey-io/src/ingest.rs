//! Feed ingestion.
//!
//! Transport code pushes [`FeedEvent`]s into a bounded `crossbeam` queue.
//! An [`Ingestor`] drains it: link events update the connection state,
//! messages are decoded and accepted ticks go into the engine. Observers
//! get [`EngineEvent`]s on a second queue; when that queue is full the
//! event is dropped rather than stalling ingestion.

use std::io::BufRead;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;

use crate::engine::KeyEngine;
use crate::error::FeedError;
use crate::feed::{Tick, TickDecoder};
use crate::link::{ConnectionState, FeedEvent, FeedLink};

/// Something observers may want to display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A tick was accepted into the buffer.
    Sample {
        /// Channel values.
        channels: Vec<f64>,
        /// Sender timestamp, or arrival time when absent.
        timestamp: f64,
        /// Buffer readiness after the tick.
        buffer_ready: bool,
    },
    /// The feed link changed state.
    Link {
        /// New state.
        state: ConnectionState,
        /// Transport error message, for `Failed`.
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    /// A message was dropped.
    Rejected {
        /// Why.
        reason: String,
    },
}

/// Counters kept by an [`Ingestor`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Ticks that reached the buffer.
    pub accepted: u64,
    /// Messages that were dropped.
    pub rejected: u64,
    /// Channel entries replaced by 0.0 in accepted ticks.
    pub substituted: u64,
}

/// Moves feed messages into a [`KeyEngine`].
#[derive(Debug)]
pub struct Ingestor {
    engine: Arc<KeyEngine>,
    decoder: TickDecoder,
    link: FeedLink,
    events: Option<Sender<EngineEvent>>,
    stats: IngestStats,
    log_every: u64,
}

impl Ingestor {
    /// Ingestor for `engine`, logging progress every `log_every` accepted
    /// ticks (0 disables progress logging).
    pub fn new(engine: Arc<KeyEngine>, log_every: usize) -> Self {
        let decoder = TickDecoder::new(engine.params().num_channels());
        engine.set_feed_state(ConnectionState::Disconnected);
        Self {
            engine,
            decoder,
            link: FeedLink::new(),
            events: None,
            stats: IngestStats::default(),
            log_every: log_every as u64,
        }
    }

    /// Publish [`EngineEvent`]s to `sender`.
    pub fn with_events(mut self, sender: Sender<EngineEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Counters so far.
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Feed link state.
    pub fn link(&self) -> &FeedLink {
        &self.link
    }

    /// The engine being fed.
    pub fn engine(&self) -> &Arc<KeyEngine> {
        &self.engine
    }

    fn publish(&self, event: EngineEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.try_send(event);
        }
    }

    /// Handle one transport event.
    ///
    /// Returns the accepted tick for messages, `None` for link events.
    pub fn handle(&mut self, event: FeedEvent) -> Result<Option<Tick>, FeedError> {
        match event {
            FeedEvent::Message(text) => self.handle_message(&text).map(Some),
            other => {
                if let Some(state) = self.link.apply(&other) {
                    self.engine.set_feed_state(state);
                    let message = match other {
                        FeedEvent::Error(msg) => {
                            tracing::error!(error = %msg, "feed transport error");
                            Some(msg)
                        }
                        _ => None,
                    };
                    self.publish(EngineEvent::Link { state, message });
                }
                Ok(None)
            }
        }
    }

    /// Decode one message and, if accepted, append it to the buffer.
    pub fn handle_message(&mut self, text: &str) -> Result<Tick, FeedError> {
        let tick = match self.decoder.decode(text) {
            Ok(tick) => tick,
            Err(err) => {
                self.stats.rejected += 1;
                tracing::warn!(error = %err, message = %preview(text), "feed message dropped");
                self.publish(EngineEvent::Rejected {
                    reason: err.to_string(),
                });
                return Err(err);
            }
        };

        self.engine.add_sample(&tick.values);
        self.stats.accepted += 1;
        self.stats.substituted += tick.substituted.len() as u64;

        if self.log_every > 0 && self.stats.accepted % self.log_every == 0 {
            tracing::info!(
                accepted = self.stats.accepted,
                rejected = self.stats.rejected,
                "successfully processed {} messages",
                self.stats.accepted
            );
        }

        if self.events.is_some() {
            self.publish(EngineEvent::Sample {
                channels: tick.values.clone(),
                timestamp: tick.timestamp.unwrap_or_else(crate::engine::unix_now),
                buffer_ready: self.engine.is_ready(),
            });
        }
        Ok(tick)
    }

    /// Drain `events` until every sender is dropped.
    pub fn run(&mut self, events: &Receiver<FeedEvent>) -> IngestStats {
        for event in events {
            // Rejections are already logged and counted.
            let _ = self.handle(event);
        }
        self.stats
    }
}

/// First 100 characters of a message, for logs.
fn preview(text: &str) -> &str {
    match text.char_indices().nth(100) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Run `ingestor` on its own thread until the feed queue closes.
pub fn spawn_ingestor(
    mut ingestor: Ingestor,
    events: Receiver<FeedEvent>,
) -> std::io::Result<JoinHandle<IngestStats>> {
    std::thread::Builder::new()
        .name("cortexkey-ingest".to_string())
        .spawn(move || ingestor.run(&events))
}

/// Send every non-blank line of `reader` as a message, bracketed by
/// `Opened` and `Closed`. Returns the number of messages sent.
///
/// Stops early, without error, if the receiving side has gone away.
pub fn pump_lines<R: BufRead>(reader: R, tx: &Sender<FeedEvent>) -> std::io::Result<usize> {
    if tx.send(FeedEvent::Opened).is_err() {
        return Ok(0);
    }
    let mut sent = 0;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if tx.send(FeedEvent::Message(line.to_string())).is_err() {
            return Ok(sent);
        }
        sent += 1;
    }
    let _ = tx.send(FeedEvent::Closed);
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cortexkey_core::{DerivationParams, KeyHistory};
    use crossbeam_channel::bounded;

    fn engine() -> Arc<KeyEngine> {
        Arc::new(KeyEngine::new(
            DerivationParams::default(),
            KeyHistory::default(),
        ))
    }

    fn tick_json(values: &[f64]) -> String {
        let entries: Vec<String> = values
            .iter()
            .map(|v| format!(r#"{{"value": {v}}}"#))
            .collect();
        format!(r#"{{"channels": [{}]}}"#, entries.join(","))
    }

    #[test]
    fn test_accepts_and_counts() {
        let engine = engine();
        let mut ingestor = Ingestor::new(Arc::clone(&engine), 50);
        let tick = ingestor.handle_message(&tick_json(&[1.0; 8])).unwrap();
        assert_eq!(tick.values, vec![1.0; 8]);
        assert_eq!(engine.buffered(), 1);
        assert_eq!(ingestor.stats().accepted, 1);
    }

    #[test]
    fn test_rejected_tick_never_reaches_buffer() {
        let engine = engine();
        let mut ingestor = Ingestor::new(Arc::clone(&engine), 50);
        assert!(ingestor.handle_message(&tick_json(&[1.0; 7])).is_err());
        assert!(ingestor.handle_message("garbage").is_err());
        assert_eq!(engine.buffered(), 0);
        assert_eq!(
            ingestor.stats(),
            IngestStats {
                accepted: 0,
                rejected: 2,
                substituted: 0
            }
        );
    }

    #[test]
    fn test_link_events_update_engine() {
        let engine = engine();
        let (tx, rx) = bounded(16);
        let mut ingestor = Ingestor::new(Arc::clone(&engine), 50).with_events(tx);
        assert_eq!(engine.feed_state(), Some(ConnectionState::Disconnected));

        ingestor.handle(FeedEvent::Opened).unwrap();
        assert_eq!(engine.feed_state(), Some(ConnectionState::Connected));
        ingestor
            .handle(FeedEvent::Error("boom".to_string()))
            .unwrap();
        assert_eq!(engine.feed_state(), Some(ConnectionState::Failed));

        let events: Vec<EngineEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                EngineEvent::Link {
                    state: ConnectionState::Connected,
                    message: None
                },
                EngineEvent::Link {
                    state: ConnectionState::Failed,
                    message: Some("boom".to_string())
                },
            ]
        );
    }

    #[test]
    fn test_sample_event_uses_message_timestamp() {
        let engine = engine();
        let (tx, rx) = bounded(4);
        let mut ingestor = Ingestor::new(engine, 50).with_events(tx);
        let text = r#"{"channels": [{"value":1},{"value":2},{"value":3},{"value":4},{"value":5},{"value":6},{"value":7},{"value":8}], "timestamp": 42.0}"#;
        ingestor.handle_message(text).unwrap();
        match rx.try_recv().unwrap() {
            EngineEvent::Sample {
                timestamp,
                buffer_ready,
                channels,
            } => {
                assert_eq!(timestamp, 42.0);
                assert!(!buffer_ready);
                assert_eq!(channels.len(), 8);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_full_event_queue_does_not_block() {
        let engine = engine();
        let (tx, _rx) = bounded(1);
        let mut ingestor = Ingestor::new(Arc::clone(&engine), 50).with_events(tx);
        for _ in 0..5 {
            ingestor.handle_message(&tick_json(&[0.5; 8])).unwrap();
        }
        assert_eq!(engine.buffered(), 5);
    }

    #[test]
    fn test_pump_lines_brackets_messages() {
        let (tx, rx) = bounded(16);
        let input = "a\n\n  b  \nc\n";
        let sent = pump_lines(input.as_bytes(), &tx).unwrap();
        assert_eq!(sent, 3);
        let events: Vec<FeedEvent> = rx.try_iter().collect();
        assert_eq!(events.first(), Some(&FeedEvent::Opened));
        assert_eq!(events[2], FeedEvent::Message("b".to_string()));
        assert_eq!(events.last(), Some(&FeedEvent::Closed));
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = "é".repeat(150);
        assert_eq!(preview(&long).chars().count(), 100);
        assert_eq!(preview("short"), "short");
    }
}
