//! Server line decoding on the client side

use crate::protocol::constants::{ACK, SYNC_TAG, SYSTEM_TAG, TYPING_INFO_PREFIX};
use crate::protocol::message::TypingState;

/// Event received from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// `[SISTEMA] <text>`
    System(String),
    /// `[SYNC] <user>: <text>`
    Sync { username: String, text: String },
    /// `<user>: <text>`
    Async { username: String, text: String },
    /// `ACK`
    Ack,
    /// `TYPING_INFO:<user>:START|STOP`
    Typing { username: String, state: TypingState },
    /// Any line matching none of the above
    Plain(String),
}

impl ServerEvent {
    /// Decode one server line
    ///
    /// The typing state is taken from the last `:`, so usernames containing
    /// colons still parse.
    pub fn parse(line: &str) -> Self {
        if line == ACK {
            return ServerEvent::Ack;
        }

        if let Some(rest) = line.strip_prefix(TYPING_INFO_PREFIX) {
            if let Some((username, state)) = rest.rsplit_once(':') {
                if let Some(state) = TypingState::parse(state) {
                    return ServerEvent::Typing {
                        username: username.to_string(),
                        state,
                    };
                }
            }
        }

        if let Some(text) = line.strip_prefix(SYSTEM_TAG) {
            return ServerEvent::System(text.to_string());
        }

        if let Some(rest) = line.strip_prefix(SYNC_TAG) {
            if let Some((username, text)) = rest.split_once(": ") {
                return ServerEvent::Sync {
                    username: username.to_string(),
                    text: text.to_string(),
                };
            }
        }

        match line.split_once(": ") {
            Some((username, text)) => ServerEvent::Async {
                username: username.to_string(),
                text: text.to_string(),
            },
            None => ServerEvent::Plain(line.to_string()),
        }
    }
}
