//! Per-connection registry entry

use bytes::Bytes;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Identity of one accepted connection
///
/// Usernames are not unique, so the registry keys connections by this id.
pub type ConnectionId = u64;

/// Entry for one registered connection
#[derive(Debug)]
pub struct ClientEntry {
    /// Connection id assigned at accept
    pub id: ConnectionId,

    /// Username bound by the handshake line
    pub username: String,

    /// Outbound queue drained by the connection's writer task
    tx: mpsc::Sender<Bytes>,
}

impl ClientEntry {
    /// Create a new entry
    pub fn new(id: ConnectionId, username: impl Into<String>, tx: mpsc::Sender<Bytes>) -> Self {
        Self {
            id,
            username: username.into(),
            tx,
        }
    }

    /// Enqueue an encoded line without waiting
    ///
    /// Returns false if the line was dropped for this peer.
    pub(super) fn deliver(&self, line: Bytes) -> bool {
        match self.tx.try_send(line) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    session_id = self.id,
                    username = %self.username,
                    "Outbound queue full, dropping line"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(
                    session_id = self.id,
                    username = %self.username,
                    "Outbound queue closed, dropping line"
                );
                false
            }
        }
    }
}
