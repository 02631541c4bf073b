//! Chat client connection
//!
//! Wraps one stream to the server. In sync mode the client withholds further
//! messages until the server's `ACK` arrives; the server itself does not
//! police this.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::TcpStream;

use crate::error::{Error, ProtocolError, Result};
use crate::protocol::codec::{write_line, LineCodec, LineReader};
use crate::protocol::constants::{CMD_MUTE, CMD_UNMUTE, COMMAND_PREFIX};
use crate::protocol::message::{MessageMode, TypingState};

use super::config::ClientConfig;
use super::event::ServerEvent;
use super::typing::TypingRoster;

/// Connected chat client
///
/// # Example
/// ```no_run
/// use chat_relay::{ChatClient, ClientConfig, MessageMode};
///
/// # async fn example() -> chat_relay::Result<()> {
/// let config = ClientConfig::new("ana").mode(MessageMode::Sync);
/// let mut client = ChatClient::connect(&config).await?;
///
/// // Lines relayed from others may arrive before the ACK
/// let interleaved = client.send_sync_and_wait("hello").await?;
/// println!("{} events before ACK", interleaved.len());
/// # Ok(())
/// # }
/// ```
pub struct ChatClient<S = TcpStream> {
    username: String,
    mode: MessageMode,
    reader: LineReader<ReadHalf<S>>,
    writer: WriteHalf<S>,
    awaiting_ack: bool,
    typing: TypingRoster,
}

impl ChatClient<TcpStream> {
    /// Connect to the server and send the username
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let stream = TcpStream::connect(config.server_addr).await?;
        if config.tcp_nodelay {
            stream.set_nodelay(true)?;
        }

        tracing::debug!(
            server = %config.server_addr,
            username = %config.username,
            "Connected to chat server"
        );

        Self::handshake(stream, config).await
    }
}

impl<S: AsyncRead + AsyncWrite> ChatClient<S> {
    /// Send the username over an established stream
    pub async fn handshake(stream: S, config: &ClientConfig) -> Result<Self> {
        let (read_half, mut write_half) = tokio::io::split(stream);
        write_line(&mut write_half, &config.username).await?;

        let codec = LineCodec::with_max_length(config.max_line_length);

        Ok(Self {
            username: config.username.clone(),
            mode: config.mode,
            reader: LineReader::new(read_half, codec, 4096),
            writer: write_half,
            awaiting_ack: false,
            typing: TypingRoster::new(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn mode(&self) -> MessageMode {
        self.mode
    }

    /// Whether a sync message is still waiting for its ACK
    pub fn is_awaiting_ack(&self) -> bool {
        self.awaiting_ack
    }

    /// Remote users currently typing
    pub fn typing(&self) -> &TypingRoster {
        &self.typing
    }

    /// Send user input
    ///
    /// Input is trimmed and empty input ignored. Lines starting with `/` are
    /// sent as commands, anything else as a message in the configured mode.
    pub async fn send(&mut self, input: &str) -> Result<()> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(());
        }

        if input.starts_with(COMMAND_PREFIX) {
            self.ensure_not_awaiting_ack()?;
            write_line(&mut self.writer, input).await?;
            return Ok(());
        }

        self.send_message(self.mode, input).await
    }

    /// Send a chat message in an explicit mode
    pub async fn send_message(&mut self, mode: MessageMode, text: &str) -> Result<()> {
        self.ensure_not_awaiting_ack()?;

        write_line(&mut self.writer, &format!("{}{}", mode.prefix(), text)).await?;
        if mode == MessageMode::Sync {
            self.awaiting_ack = true;
        }
        Ok(())
    }

    /// Send a sync message and read until its ACK
    ///
    /// Returns the events that arrived before the ACK.
    pub async fn send_sync_and_wait(&mut self, text: &str) -> Result<Vec<ServerEvent>> {
        self.send_message(MessageMode::Sync, text).await?;

        let mut interleaved = Vec::new();
        loop {
            match self.next_event().await? {
                Some(ServerEvent::Ack) => return Ok(interleaved),
                Some(event) => interleaved.push(event),
                None => return Err(Error::ConnectionClosed),
            }
        }
    }

    /// Ask the server to mute `username` (leader only)
    pub async fn mute(&mut self, username: &str) -> Result<()> {
        self.send_command(CMD_MUTE, username).await
    }

    /// Ask the server to unmute `username` (leader only)
    pub async fn unmute(&mut self, username: &str) -> Result<()> {
        self.send_command(CMD_UNMUTE, username).await
    }

    async fn send_command(&mut self, name: &str, arg: &str) -> Result<()> {
        self.ensure_not_awaiting_ack()?;
        write_line(&mut self.writer, &format!("{} {}", name, arg)).await?;
        Ok(())
    }

    /// Signal that the local user started typing
    pub async fn typing_started(&mut self) -> Result<()> {
        self.send_typing(TypingState::Start).await
    }

    /// Signal that the local user stopped typing
    pub async fn typing_stopped(&mut self) -> Result<()> {
        self.send_typing(TypingState::Stop).await
    }

    async fn send_typing(&mut self, state: TypingState) -> Result<()> {
        write_line(&mut self.writer, state.signal()).await?;
        Ok(())
    }

    /// Read the next event from the server
    ///
    /// Returns `Ok(None)` when the server closes the connection.
    pub async fn next_event(&mut self) -> Result<Option<ServerEvent>> {
        let Some(line) = self.reader.next_line().await? else {
            return Ok(None);
        };

        let event = ServerEvent::parse(&line);
        match &event {
            ServerEvent::Ack => self.awaiting_ack = false,
            ServerEvent::Typing { username, state } => self.typing.apply(username, *state),
            _ => {}
        }

        Ok(Some(event))
    }

    /// Close the sending side
    pub async fn close(mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }

    fn ensure_not_awaiting_ack(&self) -> Result<()> {
        if self.awaiting_ack {
            return Err(ProtocolError::AckPending.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;

    #[tokio::test]
    async fn test_handshake_sends_username() {
        let stream = Builder::new().write(b"ana\n").build();
        let client = ChatClient::handshake(stream, &ClientConfig::new("ana"))
            .await
            .unwrap();

        assert_eq!(client.username(), "ana");
        assert!(!client.is_awaiting_ack());
    }

    #[tokio::test]
    async fn test_sync_send_waits_for_ack() {
        let stream = Builder::new()
            .write(b"ana\n")
            .write(b"SYNC:oi\n")
            .read(b"bia: hey\nTYPING_INFO:bia:START\nACK\n")
            .build();
        let config = ClientConfig::new("ana").mode(MessageMode::Sync);
        let mut client = ChatClient::handshake(stream, &config).await.unwrap();

        let interleaved = client.send_sync_and_wait("oi").await.unwrap();

        assert_eq!(
            interleaved[0],
            ServerEvent::Async {
                username: "bia".into(),
                text: "hey".into()
            }
        );
        assert_eq!(interleaved.len(), 2);
        assert!(client.typing().is_typing("bia"));
        assert!(!client.is_awaiting_ack());
    }

    #[tokio::test]
    async fn test_second_sync_send_refused_until_ack() {
        let stream = Builder::new()
            .write(b"ana\n")
            .write(b"SYNC:one\n")
            .read(b"ACK\n")
            .write(b"SYNC:two\n")
            .build();
        let config = ClientConfig::new("ana").mode(MessageMode::Sync);
        let mut client = ChatClient::handshake(stream, &config).await.unwrap();

        client.send("  one ").await.unwrap();
        assert!(client.is_awaiting_ack());

        let result = client.send("two").await;
        assert!(matches!(
            result,
            Err(Error::Protocol(ProtocolError::AckPending))
        ));

        assert_eq!(client.next_event().await.unwrap(), Some(ServerEvent::Ack));
        client.send("two").await.unwrap();
    }

    #[tokio::test]
    async fn test_commands_and_typing_sent_raw() {
        let stream = Builder::new()
            .write(b"ana\n")
            .write(b"/mute bia\n")
            .write(b"/unmute bia\n")
            .write(b"TYPING_START\n")
            .write(b"ASYNC:oi\n")
            .write(b"TYPING_STOP\n")
            .build();
        let mut client = ChatClient::handshake(stream, &ClientConfig::new("ana"))
            .await
            .unwrap();

        client.send("/mute bia").await.unwrap();
        client.unmute("bia").await.unwrap();
        client.typing_started().await.unwrap();
        client.send("oi").await.unwrap();
        client.send("   ").await.unwrap();
        client.typing_stopped().await.unwrap();

        assert!(!client.is_awaiting_ack());
    }

    #[tokio::test]
    async fn test_server_close_while_waiting() {
        let stream = Builder::new()
            .write(b"ana\n")
            .write(b"SYNC:oi\n")
            .read(b"[SISTEMA] bia saiu do chat.\n")
            .build();
        let mut client = ChatClient::handshake(stream, &ClientConfig::new("ana"))
            .await
            .unwrap();

        let result = client.send_sync_and_wait("oi").await;
        assert!(matches!(result, Err(Error::ConnectionClosed)));
    }
}
