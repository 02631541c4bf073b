//! Registry implementation
//!
//! Owns the connection set, leader and muted usernames behind one `RwLock`.
//! Call sites only use the operations below and never touch the containers.

use std::collections::{HashMap, HashSet};

use bytes::{Bytes, BytesMut};
use tokio::sync::{mpsc, RwLock};

use crate::protocol::codec::LineCodec;
use crate::protocol::message::OutboundEvent;

use super::config::RegistryConfig;
use super::entry::{ClientEntry, ConnectionId};

#[derive(Debug, Default)]
struct RegistryState {
    connections: HashMap<ConnectionId, ClientEntry>,
    /// Always `None` or a key of `connections`
    leader: Option<ConnectionId>,
    /// Muted names, independent of who is connected
    muted: HashSet<String>,
}

impl RegistryState {
    /// Deliver `line` to every connection except `exclude`
    fn fan_out(&self, line: &Bytes, exclude: Option<ConnectionId>) -> usize {
        self.connections
            .values()
            .filter(|entry| Some(entry.id) != exclude)
            .filter(|entry| entry.deliver(line.clone()))
            .count()
    }
}

/// Snapshot of registry counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    /// Number of registered connections
    pub connection_count: usize,
    /// Username of the current leader
    pub leader: Option<String>,
    /// Number of muted usernames
    pub muted_count: usize,
}

/// Central registry shared by every connection task
pub struct ChatRegistry {
    state: RwLock<RegistryState>,

    /// Configuration
    config: RegistryConfig,
}

impl ChatRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            config,
        }
    }

    /// Create an outbound queue sized for this registry
    pub fn outbound_channel(&self) -> (mpsc::Sender<Bytes>, mpsc::Receiver<Bytes>) {
        mpsc::channel(self.config.outbound_capacity)
    }

    /// Register a connection under `username`
    ///
    /// If the room has no leader, the connection becomes leader and every
    /// connection, itself included, is told. Returns true in that case.
    pub async fn register(
        &self,
        id: ConnectionId,
        username: &str,
        tx: mpsc::Sender<Bytes>,
    ) -> bool {
        let mut state = self.state.write().await;

        state
            .connections
            .insert(id, ClientEntry::new(id, username, tx));

        tracing::info!(
            session_id = id,
            username = %username,
            connections = state.connections.len(),
            "Client registered"
        );

        if state.leader.is_some() {
            return false;
        }

        state.leader = Some(id);
        tracing::info!(session_id = id, username = %username, "New leader assigned");

        state.fan_out(&encode(&OutboundEvent::new_leader(username)), None);
        true
    }

    /// Remove a connection and tell the remaining ones
    ///
    /// If the connection was leader the room stays leaderless. Unregistering
    /// an unknown id is a no-op. Returns the removed username.
    pub async fn unregister(&self, id: ConnectionId) -> Option<String> {
        let mut state = self.state.write().await;

        let entry = state.connections.remove(&id)?;

        if state.leader == Some(id) {
            state.leader = None;
            tracing::info!(
                session_id = id,
                username = %entry.username,
                "Leader left, room is leaderless"
            );
        }

        tracing::info!(
            session_id = id,
            username = %entry.username,
            connections = state.connections.len(),
            "Client unregistered"
        );

        state.fan_out(&encode(&OutboundEvent::left(&entry.username)), None);
        Some(entry.username)
    }

    /// Check whether `username` is muted
    pub async fn is_muted(&self, username: &str) -> bool {
        self.state.read().await.muted.contains(username)
    }

    /// Mute `username` and announce it to everyone
    ///
    /// Muting an already muted name leaves the set unchanged but is announced
    /// again. Returns true if the name was newly added.
    pub async fn mute(&self, username: &str) -> bool {
        let mut state = self.state.write().await;

        let added = state.muted.insert(username.to_string());
        tracing::info!(username = %username, newly_muted = added, "User muted");

        state.fan_out(&encode(&OutboundEvent::muted(username)), None);
        added
    }

    /// Unmute `username`
    ///
    /// Announced only if the name was muted. Returns whether it was.
    pub async fn unmute(&self, username: &str) -> bool {
        let mut state = self.state.write().await;

        if !state.muted.remove(username) {
            tracing::debug!(username = %username, "Unmute ignored, user not muted");
            return false;
        }

        tracing::info!(username = %username, "User unmuted");
        state.fan_out(&encode(&OutboundEvent::unmuted(username)), None);
        true
    }

    /// Current leader's connection id
    pub async fn current_leader(&self) -> Option<ConnectionId> {
        self.state.read().await.leader
    }

    /// Check whether `id` is the current leader
    pub async fn is_leader(&self, id: ConnectionId) -> bool {
        self.state.read().await.leader == Some(id)
    }

    /// Deliver an event to every registered connection except `exclude`
    ///
    /// A slow or closed peer never blocks or aborts delivery to the others.
    /// Returns the number of queues the line was placed in.
    pub async fn broadcast(&self, event: &OutboundEvent, exclude: Option<ConnectionId>) -> usize {
        let line = encode(event);
        self.state.read().await.fan_out(&line, exclude)
    }

    /// Whether `id` is currently registered
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.state.read().await.connections.contains_key(&id)
    }

    /// Number of registered connections
    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }

    /// Usernames of registered connections, sorted
    pub async fn usernames(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut names: Vec<String> = state
            .connections
            .values()
            .map(|entry| entry.username.clone())
            .collect();
        names.sort();
        names
    }

    /// Get registry statistics
    pub async fn stats(&self) -> RegistryStats {
        let state = self.state.read().await;
        RegistryStats {
            connection_count: state.connections.len(),
            leader: state
                .leader
                .and_then(|id| state.connections.get(&id))
                .map(|entry| entry.username.clone()),
            muted_count: state.muted.len(),
        }
    }
}

impl Default for ChatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(event: &OutboundEvent) -> Bytes {
    let mut buf = BytesMut::new();
    LineCodec::encode(&event.to_line(), &mut buf);
    buf.freeze()
}
