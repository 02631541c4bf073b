//! Newline-delimited line framing
//!
//! Lines are split on `\n`; a trailing `\r` is dropped and invalid UTF-8 is
//! replaced lossily. A final unterminated line is still delivered at EOF.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{ProtocolError, Result};

use super::constants::{DEFAULT_MAX_LINE_LENGTH, LINE_TERMINATOR};

/// Incremental line decoder over a `BytesMut` read buffer
#[derive(Debug, Clone)]
pub struct LineCodec {
    max_length: usize,
    /// Bytes before this index are known not to contain a terminator
    next_index: usize,
}

impl LineCodec {
    /// Create a codec with the default maximum line length
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_LINE_LENGTH)
    }

    /// Create a codec that rejects lines longer than `max_length` bytes
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
        }
    }

    /// Extract the next complete line from `buf`
    ///
    /// Returns `Ok(None)` when more data is needed. A trailing `\r` does not
    /// count toward the maximum length.
    pub fn decode(
        &mut self,
        buf: &mut BytesMut,
    ) -> std::result::Result<Option<String>, ProtocolError> {
        let search_from = self.next_index.min(buf.len());
        let pending_cr = usize::from(buf.last() == Some(&b'\r'));

        match buf[search_from..]
            .iter()
            .position(|b| *b == LINE_TERMINATOR)
        {
            Some(offset) => {
                let newline_index = search_from + offset;
                self.next_index = 0;

                let content_len = match buf[..newline_index].last() {
                    Some(&b'\r') => newline_index - 1,
                    _ => newline_index,
                };
                if content_len > self.max_length {
                    return Err(ProtocolError::LineTooLong(self.max_length));
                }

                let frame = buf.split_to(newline_index + 1);
                Ok(Some(to_line(&frame[..newline_index])))
            }
            None if buf.len() > self.max_length + pending_cr => {
                Err(ProtocolError::LineTooLong(self.max_length))
            }
            None => {
                self.next_index = buf.len();
                Ok(None)
            }
        }
    }

    /// Like [`decode`](Self::decode), but also flushes a trailing
    /// unterminated line once the peer has closed its side.
    pub fn decode_eof(
        &mut self,
        buf: &mut BytesMut,
    ) -> std::result::Result<Option<String>, ProtocolError> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }

        if buf.is_empty() {
            return Ok(None);
        }

        self.next_index = 0;
        let frame = buf.split();
        Ok(Some(to_line(&frame)))
    }

    /// Append `line` and its terminator to `dst`
    pub fn encode(line: &str, dst: &mut BytesMut) {
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(LINE_TERMINATOR);
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn to_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// Async line reader over any byte stream
pub struct LineReader<R> {
    reader: R,
    buf: BytesMut,
    codec: LineCodec,
    eof: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wrap `reader` with the given codec and initial buffer capacity
    pub fn new(reader: R, codec: LineCodec, capacity: usize) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(capacity),
            codec,
            eof: false,
        }
    }

    /// Read the next line
    ///
    /// Returns `Ok(None)` once the peer has closed the stream and every
    /// buffered line has been handed out.
    pub async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            if self.eof {
                return Ok(self.codec.decode_eof(&mut self.buf)?);
            }

            if let Some(line) = self.codec.decode(&mut self.buf)? {
                return Ok(Some(line));
            }

            if self.reader.read_buf(&mut self.buf).await? == 0 {
                self.eof = true;
            }
        }
    }
}

/// Write `line` followed by the terminator
pub async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    let mut buf = BytesMut::with_capacity(line.len() + 1);
    LineCodec::encode(line, &mut buf);
    writer.write_all(&buf).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_decode_lines() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"alice\nASYNC:hi\r\npart"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("alice"));
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("ASYNC:hi"));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"ial\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("partial"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_empty_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"\n"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some(""));
    }

    #[test]
    fn test_decode_eof_flushes_partial() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"bye"[..]);

        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(codec.decode_eof(&mut buf).unwrap().as_deref(), Some("bye"));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_line_too_long() {
        let mut codec = LineCodec::with_max_length(4);
        let mut buf = BytesMut::from(&b"abcdefgh"[..]);

        assert_eq!(codec.decode(&mut buf), Err(ProtocolError::LineTooLong(4)));

        let mut codec = LineCodec::with_max_length(4);
        let mut buf = BytesMut::from(&b"abcd\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("abcd"));
    }

    #[test]
    fn test_carriage_return_not_counted_toward_length() {
        let mut codec = LineCodec::with_max_length(4);
        let mut buf = BytesMut::from(&b"abcd\r\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("abcd"));

        // Split between the carriage return and the newline
        let mut buf = BytesMut::from(&b"wxyz\r"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"\n");
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("wxyz"));

        let mut buf = BytesMut::from(&b"abcde\r\n"[..]);
        assert_eq!(codec.decode(&mut buf), Err(ProtocolError::LineTooLong(4)));
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"ol\xffa\n"[..]);

        assert_eq!(
            codec.decode(&mut buf).unwrap().as_deref(),
            Some("ol\u{FFFD}a")
        );
    }

    #[test]
    fn test_encode() {
        let mut buf = BytesMut::new();
        LineCodec::encode("[SISTEMA] oi", &mut buf);
        LineCodec::encode("ACK", &mut buf);

        assert_eq!(&buf[..], "[SISTEMA] oi\nACK\n".as_bytes());
    }

    #[tokio::test]
    async fn test_line_reader() {
        let stream = tokio_test::io::Builder::new()
            .read(b"bob\nTYPING_")
            .read(b"START\nlast")
            .build();
        let mut reader = LineReader::new(stream, LineCodec::new(), 64);

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("bob"));
        assert_eq!(
            reader.next_line().await.unwrap().as_deref(),
            Some("TYPING_START")
        );
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(reader.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_reader_too_long() {
        let stream = tokio_test::io::Builder::new().read(b"0123456789").build();
        let mut reader = LineReader::new(stream, LineCodec::with_max_length(8), 64);

        let result = reader.next_line().await;
        assert!(matches!(
            result,
            Err(Error::Protocol(ProtocolError::LineTooLong(8)))
        ));
    }

    #[tokio::test]
    async fn test_write_line() {
        let mut stream = tokio_test::io::Builder::new().write(b"ACK\n").build();
        write_line(&mut stream, "ACK").await.unwrap();
    }
}
