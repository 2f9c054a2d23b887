//! Feed connection state machine.
//!
//! Transport callbacks are reduced to [`FeedEvent`]s delivered over a
//! queue; [`FeedLink`] folds them into a [`ConnectionState`].
//!
//! | event        | new state      |
//! |--------------|----------------|
//! | `Connecting` | `Connecting`   |
//! | `Opened`     | `Connected`    |
//! | `Message`    | unchanged      |
//! | `Error`      | `Failed`       |
//! | `Closed`     | `Disconnected` |

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection state of the acquisition feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Not connected.
    #[default]
    Disconnected,
    /// Connection attempt in progress.
    Connecting,
    /// Receiving messages.
    Connected,
    /// The transport reported an error.
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Failed => "failed",
        })
    }
}

/// Something the transport observed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A connection attempt to `url` started.
    Connecting {
        /// Feed endpoint.
        url: String,
    },
    /// The connection is open.
    Opened,
    /// One text message.
    Message(String),
    /// The transport failed.
    Error(String),
    /// The connection closed.
    Closed,
}

/// Tracks the feed connection.
#[derive(Debug, Clone, Default)]
pub struct FeedLink {
    state: ConnectionState,
    url: Option<String>,
    last_error: Option<String>,
}

impl FeedLink {
    /// A link in the `Disconnected` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// True while `Connected`.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Endpoint of the latest connection attempt.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Message of the latest transport error.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply `event`. Returns the new state if it changed.
    pub fn apply(&mut self, event: &FeedEvent) -> Option<ConnectionState> {
        let next = match event {
            FeedEvent::Connecting { url } => {
                self.url = Some(url.clone());
                ConnectionState::Connecting
            }
            FeedEvent::Opened => ConnectionState::Connected,
            FeedEvent::Message(_) => return None,
            FeedEvent::Error(message) => {
                self.last_error = Some(message.clone());
                ConnectionState::Failed
            }
            FeedEvent::Closed => ConnectionState::Disconnected,
        };

        if next == self.state {
            return None;
        }
        tracing::info!(from = %self.state, to = %next, "feed link state changed");
        self.state = next;
        Some(next)
    }
}
