//! Connection status tracking for the broker session.

use std::fmt;

/// Connection status of the broker session as seen by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
        };
        f.write_str(name)
    }
}

/// Holds the current [`ConnectionState`] and reports real changes only.
///
/// The tracker is owned by the handler task, which makes it the single writer
/// of the connection status.
#[derive(Debug, Default)]
pub struct StatusTracker {
    current: ConnectionState,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> ConnectionState {
        self.current
    }

    /// Stores `next` and returns it if it differs from the previous value.
    ///
    /// Returns `None` when the state is unchanged, so callers only emit a
    /// notification on an actual transition.
    pub fn set(&mut self, next: ConnectionState) -> Option<ConnectionState> {
        if self.current == next {
            return None;
        }
        self.current = next;
        Some(next)
    }
}
