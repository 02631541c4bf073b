//! Statistics for chat sessions

use std::time::Duration;

/// Session-level statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Lines read from the client, handshake included
    pub lines_received: u64,
    /// Lines written to the client
    pub lines_sent: u64,
    /// Chat messages relayed to other clients
    pub messages_relayed: u64,
    /// Typing signals relayed to other clients
    pub typing_signals: u64,
    /// Commands received
    pub commands: u64,
    /// Sends refused because the user was muted
    pub refused_while_muted: u64,
    /// Connection duration
    pub duration: Duration,
}

impl SessionStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Relayed messages per minute over the session
    pub fn messages_per_minute(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            self.messages_relayed as f64 * 60.0 / secs
        } else {
            0.0
        }
    }
}
