//! Wire literals and protocol defaults

/// Port the server listens on when no address is configured
pub const DEFAULT_PORT: u16 = 12345;

/// Default upper bound for a single line, terminator excluded
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// Line terminator
pub const LINE_TERMINATOR: u8 = b'\n';

// Client -> server
pub const TYPING_START: &str = "TYPING_START";
pub const TYPING_STOP: &str = "TYPING_STOP";
pub const COMMAND_PREFIX: char = '/';
pub const SYNC_PREFIX: &str = "SYNC:";
pub const ASYNC_PREFIX: &str = "ASYNC:";

// Commands
pub const CMD_MUTE: &str = "/mute";
pub const CMD_UNMUTE: &str = "/unmute";

// Server -> client
pub const ACK: &str = "ACK";
pub const SYSTEM_TAG: &str = "[SISTEMA] ";
pub const SYNC_TAG: &str = "[SYNC] ";
pub const TYPING_INFO_PREFIX: &str = "TYPING_INFO:";
pub const TYPING_STATE_START: &str = "START";
pub const TYPING_STATE_STOP: &str = "STOP";
