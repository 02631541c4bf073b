//! Typed protocol events
//!
//! Inbound lines are decoded once into an [`InboundEvent`] and matched
//! exhaustively by the connection task. Outbound events render to the exact
//! wire literals clients expect.

use std::fmt;

use super::constants::*;

/// Delivery mode of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageMode {
    /// Sender waits for `ACK` before its next message
    Sync,
    /// Fire and forget
    Async,
}

impl MessageMode {
    /// Line prefix a client uses for this mode
    pub fn prefix(self) -> &'static str {
        match self {
            MessageMode::Sync => SYNC_PREFIX,
            MessageMode::Async => ASYNC_PREFIX,
        }
    }
}

/// Typing indicator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingState {
    Start,
    Stop,
}

impl TypingState {
    /// Wire form used inside `TYPING_INFO`
    pub fn as_str(self) -> &'static str {
        match self {
            TypingState::Start => TYPING_STATE_START,
            TypingState::Stop => TYPING_STATE_STOP,
        }
    }

    /// Parse the `START`/`STOP` suffix of a `TYPING_INFO` line
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            TYPING_STATE_START => Some(TypingState::Start),
            TYPING_STATE_STOP => Some(TypingState::Stop),
            _ => None,
        }
    }

    /// Client-side signal line for this state
    pub fn signal(self) -> &'static str {
        match self {
            TypingState::Start => TYPING_START,
            TypingState::Stop => TYPING_STOP,
        }
    }
}

/// A slash command split on its first space
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command word including the leading `/`
    pub name: String,
    /// Everything after the first space, untokenized. `None` if the line had
    /// no space at all.
    pub arg: Option<String>,
}

impl Command {
    /// Split a raw command line
    pub fn parse(line: &str) -> Self {
        match line.split_once(' ') {
            Some((name, arg)) => Self {
                name: name.to_string(),
                arg: Some(arg.to_string()),
            },
            None => Self {
                name: line.to_string(),
                arg: None,
            },
        }
    }
}

/// Event decoded from one client line (after the username handshake)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// `TYPING_START` / `TYPING_STOP`
    Typing(TypingState),
    /// Any line starting with `/`
    Command(Command),
    /// `SYNC:<payload>` or `ASYNC:<payload>`
    Chat { mode: MessageMode, payload: String },
    /// Anything else; produces no broadcast
    Unrecognized(String),
}

impl InboundEvent {
    /// Decode a line. Forms are tried in order, first match wins.
    pub fn decode(line: &str) -> Self {
        if line == TYPING_START {
            return InboundEvent::Typing(TypingState::Start);
        }
        if line == TYPING_STOP {
            return InboundEvent::Typing(TypingState::Stop);
        }
        if line.starts_with(COMMAND_PREFIX) {
            return InboundEvent::Command(Command::parse(line));
        }
        if let Some(payload) = line.strip_prefix(SYNC_PREFIX) {
            return InboundEvent::Chat {
                mode: MessageMode::Sync,
                payload: payload.to_string(),
            };
        }
        if let Some(payload) = line.strip_prefix(ASYNC_PREFIX) {
            return InboundEvent::Chat {
                mode: MessageMode::Async,
                payload: payload.to_string(),
            };
        }
        InboundEvent::Unrecognized(line.to_string())
    }

    /// Whether the mute gate applies to this event
    pub fn is_gated_by_mute(&self) -> bool {
        matches!(
            self,
            InboundEvent::Chat { .. } | InboundEvent::Unrecognized(_)
        )
    }
}

/// Event sent from the server to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    /// `[SISTEMA] <text>`
    System(String),
    /// `[SYNC] <user>: <text>`
    Sync { username: String, text: String },
    /// `<user>: <text>`
    Async { username: String, text: String },
    /// `ACK`
    Ack,
    /// `TYPING_INFO:<user>:START|STOP`
    TypingInfo { username: String, state: TypingState },
}

impl OutboundEvent {
    pub fn new_leader(username: &str) -> Self {
        Self::System(format!("{} é o novo líder.", username))
    }

    pub fn joined(username: &str) -> Self {
        Self::System(format!("{} entrou no chat.", username))
    }

    pub fn left(username: &str) -> Self {
        Self::System(format!("{} saiu do chat.", username))
    }

    pub fn muted(username: &str) -> Self {
        Self::System(format!("Usuário {} foi mutado pelo líder.", username))
    }

    pub fn unmuted(username: &str) -> Self {
        Self::System(format!("Usuário {} foi desmutado pelo líder.", username))
    }

    pub fn mute_refusal() -> Self {
        Self::System("Você está mutado e não pode enviar mensagens.".to_string())
    }

    pub fn leader_only() -> Self {
        Self::System("Apenas o líder pode executar comandos.".to_string())
    }

    pub fn command_usage() -> Self {
        Self::System(format!(
            "Comando inválido. Use {} <username> ou {} <username>.",
            CMD_MUTE, CMD_UNMUTE
        ))
    }

    pub fn unknown_command() -> Self {
        Self::System("Comando desconhecido.".to_string())
    }

    /// Relay form of a chat message from `username`
    pub fn chat(mode: MessageMode, username: &str, text: &str) -> Self {
        let username = username.to_string();
        let text = text.to_string();
        match mode {
            MessageMode::Sync => Self::Sync { username, text },
            MessageMode::Async => Self::Async { username, text },
        }
    }

    /// Render to a wire line (without terminator)
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for OutboundEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundEvent::System(text) => write!(f, "{}{}", SYSTEM_TAG, text),
            OutboundEvent::Sync { username, text } => {
                write!(f, "{}{}: {}", SYNC_TAG, username, text)
            }
            OutboundEvent::Async { username, text } => write!(f, "{}: {}", username, text),
            OutboundEvent::Ack => f.write_str(ACK),
            OutboundEvent::TypingInfo { username, state } => {
                write!(f, "{}{}:{}", TYPING_INFO_PREFIX, username, state.as_str())
            }
        }
    }
}
