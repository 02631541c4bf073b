//! Chat line protocol
//!
//! Every event travels as one UTF-8 line terminated by `\n`. The first line a
//! client sends is its username; every later line is decoded into an
//! [`InboundEvent`](message::InboundEvent).

pub mod codec;
pub mod constants;
pub mod message;

pub use codec::{write_line, LineCodec, LineReader};
pub use message::{Command, InboundEvent, MessageMode, OutboundEvent, TypingState};
