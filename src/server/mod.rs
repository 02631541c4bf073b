//! Chat server
//!
//! The listener accepts TCP connections and spawns one [`Connection`] task per
//! client. Leader-only commands are interpreted by the [`Coordinator`].

pub mod config;
pub mod connection;
pub mod coordinator;
pub mod listener;

pub use config::ServerConfig;
pub use connection::Connection;
pub use coordinator::{CommandOutcome, Coordinator};
pub use listener::ChatServer;
