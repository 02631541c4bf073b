//! Line-oriented chat relay
//!
//! A TCP chat server that relays newline-delimited text between connected
//! clients. The first client to join a leaderless room becomes its leader and
//! may mute or unmute other usernames.
//!
//! # Architecture
//!
//! ```text
//!                     Arc<ChatRegistry>
//!                ┌──────────────────────────┐
//!                │ connections: id -> entry │
//!                │ leader: Option<id>       │
//!                │ muted: {username}        │
//!                └────────────┬─────────────┘
//!                             │ broadcast() / try_send
//!         ┌───────────────────┼───────────────────┐
//!         ▼                   ▼                   ▼
//!   [Connection A]      [Connection B]      [Connection C]
//!   read loop ──► decode ──► dispatch ──► registry / coordinator
//!   writer task ◄── mpsc outbound queue ◄── broadcast
//! ```
//!
//! # Example
//! ```no_run
//! use chat_relay::{ChatServer, ServerConfig};
//!
//! # async fn example() -> chat_relay::Result<()> {
//! let server = ChatServer::new(ServerConfig::default());
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stats;

pub use client::{ChatClient, ClientConfig, ServerEvent, TypingRoster};
pub use error::{Error, ProtocolError, Result};
pub use protocol::message::{Command, InboundEvent, MessageMode, OutboundEvent, TypingState};
pub use registry::{ChatRegistry, ConnectionId, RegistryConfig};
pub use server::{ChatServer, ServerConfig};
