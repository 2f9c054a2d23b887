//! Shared engine and feed ingestion for cortexkey.
//!
//! This crate provides:
//!
//! - **Key engine**: [`KeyEngine`] owns the sample buffer, the derivation
//!   pipeline and the key history, and is shared by `Arc` between threads
//! - **Feed decoding**: [`TickDecoder`] turns JSON feed messages into ticks
//! - **Link state**: [`FeedLink`] tracks the feed connection from
//!   [`FeedEvent`]s
//! - **Ingestion**: [`Ingestor`], [`spawn_ingestor`] and [`pump_lines`] move
//!   feed messages into the engine over `crossbeam` queues
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use cortexkey_config::Settings;
//! use cortexkey_io::{Ingestor, KeyEngine};
//!
//! let engine = Arc::new(KeyEngine::from_settings(&Settings::default()).unwrap());
//! let mut ingestor = Ingestor::new(Arc::clone(&engine), 50);
//!
//! let tick = r#"{"channels": [{"value":1},{"value":2},{"value":3},{"value":4},
//!                             {"value":5},{"value":6},{"value":7},{"value":8}]}"#;
//! for _ in 0..40 {
//!     ingestor.handle_message(tick).unwrap();
//! }
//!
//! let response = engine.generate_key();
//! assert!(response.is_success());
//! assert_eq!(engine.status().key_history_count, 1);
//! ```

mod engine;
mod error;
mod feed;
mod ingest;
mod link;

pub use engine::{
    DerivationStage, DerivedKey, KeyEngine, KeyResponse, SUCCESS_MESSAGE, StatusReport,
};
pub use error::{EngineError, FeedError};
pub use feed::{Tick, TickDecoder};
pub use ingest::{EngineEvent, IngestStats, Ingestor, pump_lines, spawn_ingestor};
pub use link::{ConnectionState, FeedEvent, FeedLink};
