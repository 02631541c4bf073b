//! Connection registry and broadcast fan-out
//!
//! The registry is the only shared state in the server: the set of live
//! connections, the current leader and the set of muted usernames. Every
//! mutation takes the write lock, so leader assignment is a single
//! check-and-set. Broadcasts iterate under the read lock, so a join or leave
//! racing a broadcast is either fully included or fully excluded.
//!
//! # Delivery
//!
//! Each connection owns a bounded outbound queue drained by its writer task.
//! Lines are encoded once into `bytes::Bytes` and the same allocation is
//! reference-counted into every queue. Enqueueing never blocks: a full or
//! closed queue drops the line for that peer only.

pub mod config;
pub mod entry;
pub mod store;

pub use config::RegistryConfig;
pub use entry::{ClientEntry, ConnectionId};
pub use store::{ChatRegistry, RegistryStats};
