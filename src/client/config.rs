//! Client configuration

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::protocol::constants::DEFAULT_PORT;
use crate::protocol::message::MessageMode;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address
    pub server_addr: SocketAddr,

    /// Username sent as the handshake line
    pub username: String,

    /// Mode applied to non-command messages sent with `send`
    pub mode: MessageMode,

    /// Enable TCP_NODELAY
    pub tcp_nodelay: bool,

    /// Longest accepted line from the server
    pub max_line_length: usize,
}

impl ClientConfig {
    /// Create a config for `username` against the default local server
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            server_addr: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            username: username.into(),
            mode: MessageMode::Async,
            tcp_nodelay: true,
            max_line_length: crate::protocol::constants::DEFAULT_MAX_LINE_LENGTH,
        }
    }

    /// Set the server address
    pub fn server(mut self, addr: SocketAddr) -> Self {
        self.server_addr = addr;
        self
    }

    /// Set the message mode
    pub fn mode(mut self, mode: MessageMode) -> Self {
        self.mode = mode;
        self
    }
}
