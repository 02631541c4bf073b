//! Per-client connection task
//!
//! The first line read is the username. After registration every line is
//! decoded and dispatched: typing signals are relayed, commands go to the
//! coordinator, chat messages pass the mute gate and are broadcast.
//! Outbound lines are written by a separate task draining the connection's
//! queue, so a slow peer never stalls the read loop of another connection.

use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::protocol::codec::{LineCodec, LineReader};
use crate::protocol::message::{InboundEvent, MessageMode, OutboundEvent};
use crate::registry::{ChatRegistry, ConnectionId};
use crate::session::SessionState;
use crate::stats::SessionStats;

use super::config::ServerConfig;
use super::coordinator::Coordinator;

/// One client connection
pub struct Connection<S> {
    session: SessionState,
    stream: Option<S>,
    config: ServerConfig,
    registry: Arc<ChatRegistry>,
    coordinator: Coordinator,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Create a connection over an accepted stream
    pub fn new(
        session_id: ConnectionId,
        stream: S,
        peer_addr: SocketAddr,
        config: ServerConfig,
        registry: Arc<ChatRegistry>,
    ) -> Self {
        let coordinator = Coordinator::new(Arc::clone(&registry));
        Self {
            session: SessionState::new(session_id, peer_addr),
            stream: Some(stream),
            config,
            registry,
            coordinator,
        }
    }

    /// Session statistics so far
    pub fn stats(&self) -> &SessionStats {
        &self.session.stats
    }

    /// Run the connection until the peer disconnects or an I/O error occurs
    ///
    /// The connection is unregistered on every exit path after registration.
    pub async fn run(&mut self) -> Result<()> {
        let stream = self.stream.take().ok_or(Error::ConnectionClosed)?;
        let (read_half, write_half) = tokio::io::split(stream);

        let codec = LineCodec::with_max_length(self.config.max_line_length);
        let mut reader = LineReader::new(read_half, codec, self.config.read_buffer_size);

        let username = match reader.next_line().await {
            Ok(Some(username)) => username,
            Ok(None) => {
                tracing::debug!(
                    session_id = self.session.id,
                    "Connection closed before username"
                );
                self.session.close();
                return Ok(());
            }
            Err(e) => {
                self.session.close();
                return Err(e);
            }
        };

        self.session.stats.lines_received += 1;
        self.session.bind_username(username);
        let id = self.session.id;
        let username = self.session.username().to_string();

        tracing::debug!(
            session_id = id,
            peer = %self.session.peer_addr,
            username = %username,
            "Username bound"
        );

        let (tx, rx) = self.registry.outbound_channel();
        let mut writer = spawn_writer(id, write_half, rx);

        self.registry.register(id, &username, tx.clone()).await;
        self.registry
            .broadcast(&OutboundEvent::joined(&username), Some(id))
            .await;

        let result = self.read_loop(&mut reader, &username, &tx).await;

        self.registry.unregister(id).await;
        drop(tx);

        match tokio::time::timeout(self.config.drain_timeout, &mut writer).await {
            Ok(Ok(sent)) => self.session.stats.lines_sent = sent,
            Ok(Err(e)) => tracing::debug!(session_id = id, error = %e, "Writer task failed"),
            Err(_) => {
                writer.abort();
                tracing::debug!(session_id = id, "Writer did not drain in time");
            }
        }

        self.session.close();
        let stats = &self.session.stats;
        tracing::info!(
            session_id = id,
            username = %username,
            lines_received = stats.lines_received,
            lines_sent = stats.lines_sent,
            messages_relayed = stats.messages_relayed,
            messages_per_minute = stats.messages_per_minute(),
            duration_secs = stats.duration.as_secs(),
            "Session ended"
        );

        result
    }

    async fn read_loop<R: AsyncRead + Unpin>(
        &mut self,
        reader: &mut LineReader<R>,
        username: &str,
        tx: &mpsc::Sender<Bytes>,
    ) -> Result<()> {
        while let Some(line) = reader.next_line().await? {
            self.session.stats.lines_received += 1;
            tracing::debug!(
                session_id = self.session.id,
                username = %username,
                line = %line,
                "Line received"
            );

            self.dispatch(InboundEvent::decode(&line), username, tx).await?;
        }

        Ok(())
    }

    async fn dispatch(
        &mut self,
        event: InboundEvent,
        username: &str,
        tx: &mpsc::Sender<Bytes>,
    ) -> Result<()> {
        let id = self.session.id;

        if event.is_gated_by_mute() && self.registry.is_muted(username).await {
            self.session.stats.refused_while_muted += 1;
            return reply(tx, &OutboundEvent::mute_refusal()).await;
        }

        match event {
            InboundEvent::Typing(state) => {
                self.session.stats.typing_signals += 1;
                let info = OutboundEvent::TypingInfo {
                    username: username.to_string(),
                    state,
                };
                self.registry.broadcast(&info, Some(id)).await;
            }
            InboundEvent::Command(command) => {
                self.session.stats.commands += 1;
                let outcome = self.coordinator.handle_command(id, &command).await;
                if let Some(notice) = outcome.reply() {
                    reply(tx, &notice).await?;
                }
            }
            InboundEvent::Chat { mode, payload } => {
                self.session.stats.messages_relayed += 1;
                let message = OutboundEvent::chat(mode, username, &payload);
                self.registry.broadcast(&message, Some(id)).await;

                if mode == MessageMode::Sync {
                    reply(tx, &OutboundEvent::Ack).await?;
                }
            }
            InboundEvent::Unrecognized(line) => {
                tracing::debug!(session_id = id, line = %line, "Ignoring untagged line");
            }
        }

        Ok(())
    }
}

/// Queue a line for this connection's own peer
async fn reply(tx: &mpsc::Sender<Bytes>, event: &OutboundEvent) -> Result<()> {
    let mut buf = BytesMut::new();
    LineCodec::encode(&event.to_line(), &mut buf);
    tx.send(buf.freeze())
        .await
        .map_err(|_| Error::ConnectionClosed)
}

/// Drain the outbound queue into the socket; returns the number of lines written
fn spawn_writer<W>(
    id: ConnectionId,
    mut writer: W,
    mut rx: mpsc::Receiver<Bytes>,
) -> JoinHandle<u64>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut sent = 0;

        while let Some(line) = rx.recv().await {
            if let Err(e) = writer.write_all(&line).await {
                tracing::debug!(session_id = id, error = %e, "Write failed");
                break;
            }
            sent += 1;
        }

        let _ = writer.shutdown().await;
        sent
    })
}
