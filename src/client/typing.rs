//! Remote typing indicators
//!
//! Entries are added on START and removed on STOP. There is no timeout: a
//! user whose STOP never arrives stays listed until one does.

use std::collections::BTreeSet;

use crate::protocol::message::TypingState;

/// Set of remote usernames currently typing
#[derive(Debug, Clone, Default)]
pub struct TypingRoster {
    typing: BTreeSet<String>,
}

impl TypingRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one `TYPING_INFO` notification
    pub fn apply(&mut self, username: &str, state: TypingState) {
        match state {
            TypingState::Start => {
                self.typing.insert(username.to_string());
            }
            TypingState::Stop => {
                self.typing.remove(username);
            }
        }
    }

    pub fn is_typing(&self, username: &str) -> bool {
        self.typing.contains(username)
    }

    /// Typing usernames in sorted order
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.typing.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.typing.is_empty()
    }

    /// Status text such as `ana is typing...`, or `None` if nobody is
    pub fn status_line(&self) -> Option<String> {
        match self.typing.len() {
            0 => None,
            1 => Some(format!("{} is typing...", self.users().collect::<String>())),
            _ => Some(format!(
                "{} are typing...",
                self.users().collect::<Vec<_>>().join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_stop() {
        let mut roster = TypingRoster::new();

        roster.apply("ana", TypingState::Start);
        roster.apply("bia", TypingState::Start);
        assert!(roster.is_typing("ana"));
        assert_eq!(roster.users().collect::<Vec<_>>(), vec!["ana", "bia"]);

        roster.apply("ana", TypingState::Stop);
        assert!(!roster.is_typing("ana"));
        assert_eq!(roster.status_line().as_deref(), Some("bia is typing..."));

        // Stop for someone not typing is harmless
        roster.apply("caio", TypingState::Stop);
        roster.apply("bia", TypingState::Stop);
        assert!(roster.is_empty());
        assert_eq!(roster.status_line(), None);
    }

    #[test]
    fn test_status_line_many() {
        let mut roster = TypingRoster::new();
        roster.apply("bia", TypingState::Start);
        roster.apply("ana", TypingState::Start);

        assert_eq!(
            roster.status_line().as_deref(),
            Some("ana, bia are typing...")
        );
    }
}
