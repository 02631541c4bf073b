//! Leader commands
//!
//! Only the current leader may run commands. The argument is everything after
//! the first space and is never tokenized further.

use std::sync::Arc;

use crate::protocol::constants::{CMD_MUTE, CMD_UNMUTE};
use crate::protocol::message::{Command, OutboundEvent};
use crate::registry::{ChatRegistry, ConnectionId};

/// Result of handling one command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// `/mute` applied
    Muted { username: String },
    /// `/unmute` applied; `was_muted` is false if nothing changed
    Unmuted { username: String, was_muted: bool },
    /// Caller is not the leader
    NotLeader,
    /// Command had no argument
    MissingArgument,
    /// Command word not recognized
    Unknown(String),
}

impl CommandOutcome {
    /// Notice sent back to the caller only, if any
    pub fn reply(&self) -> Option<OutboundEvent> {
        match self {
            CommandOutcome::Muted { .. } | CommandOutcome::Unmuted { .. } => None,
            CommandOutcome::NotLeader => Some(OutboundEvent::leader_only()),
            CommandOutcome::MissingArgument => Some(OutboundEvent::command_usage()),
            CommandOutcome::Unknown(_) => Some(OutboundEvent::unknown_command()),
        }
    }
}

/// Interprets leader commands against the registry
#[derive(Clone)]
pub struct Coordinator {
    registry: Arc<ChatRegistry>,
}

impl Coordinator {
    pub fn new(registry: Arc<ChatRegistry>) -> Self {
        Self { registry }
    }

    /// Handle `command` issued by connection `caller`
    pub async fn handle_command(
        &self,
        caller: ConnectionId,
        command: &Command,
    ) -> CommandOutcome {
        if !self.registry.is_leader(caller).await {
            tracing::debug!(
                session_id = caller,
                command = %command.name,
                "Command refused, not leader"
            );
            return CommandOutcome::NotLeader;
        }

        let Some(arg) = command.arg.as_deref() else {
            return CommandOutcome::MissingArgument;
        };

        match command.name.as_str() {
            CMD_MUTE => {
                self.registry.mute(arg).await;
                CommandOutcome::Muted {
                    username: arg.to_string(),
                }
            }
            CMD_UNMUTE => {
                let was_muted = self.registry.unmute(arg).await;
                CommandOutcome::Unmuted {
                    username: arg.to_string(),
                    was_muted,
                }
            }
            other => {
                tracing::debug!(session_id = caller, command = %other, "Unknown command");
                CommandOutcome::Unknown(other.to_string())
            }
        }
    }
}
