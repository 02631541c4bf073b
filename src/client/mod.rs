//! Chat client implementation
//!
//! Provides the client side of the line protocol:
//! - Username handshake on connect
//! - Sync/async message modes, with the sync-mode ACK convention enforced locally
//! - Typing signals and a roster of remote users currently typing

pub mod config;
pub mod connector;
pub mod event;
pub mod typing;

pub use config::ClientConfig;
pub use connector::ChatClient;
pub use event::ServerEvent;
pub use typing::TypingRoster;
