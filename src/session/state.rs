//! Session state machine
//!
//! Tracks one client connection from accept to disconnect.

use std::net::SocketAddr;
use std::time::Instant;

use crate::registry::ConnectionId;
use crate::stats::SessionStats;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Transport accepted, waiting for the username line
    AwaitingUsername,
    /// Username bound and connection registered
    Active,
    /// Read loop ended
    Closed,
}

/// Complete session state
#[derive(Debug)]
pub struct SessionState {
    /// Connection id
    pub id: ConnectionId,

    /// Remote peer address
    pub peer_addr: SocketAddr,

    /// Current phase
    pub phase: SessionPhase,

    /// Connection start time
    pub connected_at: Instant,

    /// Username, set once by the handshake
    username: Option<String>,

    /// Running counters
    pub stats: SessionStats,
}

impl SessionState {
    /// Create a new session state
    pub fn new(id: ConnectionId, peer_addr: SocketAddr) -> Self {
        Self {
            id,
            peer_addr,
            phase: SessionPhase::AwaitingUsername,
            connected_at: Instant::now(),
            username: None,
            stats: SessionStats::new(),
        }
    }

    /// Bind the username from the handshake line
    ///
    /// Has no effect once a username is bound.
    pub fn bind_username(&mut self, username: impl Into<String>) {
        if self.phase == SessionPhase::AwaitingUsername {
            self.username = Some(username.into());
            self.phase = SessionPhase::Active;
        }
    }

    /// Bound username, empty before the handshake
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    /// Check if session is active
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Mark the session closed and freeze its duration
    pub fn close(&mut self) {
        self.phase = SessionPhase::Closed;
        self.stats.duration = self.connected_at.elapsed();
    }
}
