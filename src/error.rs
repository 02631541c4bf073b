//! Error types
//!
//! Transport and framing failures are local to one connection: they end that
//! connection's task and never reach other clients.

use std::fmt;
use std::io;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Underlying transport failure (bind, accept, read or write)
    Io(io::Error),
    /// Peer violated the line protocol or a client-side convention
    Protocol(ProtocolError),
    /// Peer closed the stream
    ConnectionClosed,
}

/// Protocol-level error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A line exceeded the configured maximum length without a terminator
    LineTooLong(usize),
    /// A synchronous message is still waiting for its ACK
    AckPending,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
            Error::ConnectionClosed => write!(f, "Connection closed"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::LineTooLong(max) => {
                write!(f, "Line exceeds maximum length of {} bytes", max)
            }
            ProtocolError::AckPending => write!(f, "Waiting for ACK of previous message"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::Protocol(ProtocolError::LineTooLong(16));
        assert_eq!(
            err.to_string(),
            "Protocol error: Line exceeds maximum length of 16 bytes"
        );
        assert_eq!(Error::ConnectionClosed.to_string(), "Connection closed");
    }

    #[test]
    fn test_from_io() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
