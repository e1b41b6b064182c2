//! Framed binary command protocol core for a microcontroller firmware
//! talking to a host over a byte-oriented serial link.
//!
//! The host sends frames of commands; the device validates each frame
//! (length, sequence number, CRC-16, sync byte), acknowledges it with
//! an empty frame, parses every embedded command against an immutable
//! schema, and dispatches to the registered handler. Responses and
//! asynchronous messages travel back in the same frame format. A noisy
//! link is survived by resynchronizing on the sync byte and letting the
//! host retransmit anything that goes unacknowledged.
//!
//! The crate owns protocol state only. The serial FIFOs, the task
//! scheduler, the shutdown subsystem and the command handlers live with
//! the firmware; they plug in through the [`Transport`] and
//! [`Shutdown`] traits and the [`Schema`] tables.

#![no_std]

pub mod codec;
pub mod crc;
pub mod dispatch;
pub mod frame;
pub mod schema;
pub mod transport;
pub mod vlq;

pub use codec::{Arg, ArgVec, ProgmemBytes, Value};
pub use dispatch::{Dispatcher, Handler, Responder, Shutdown};
pub use frame::{FramePayload, FrameReceiver};
pub use schema::{ArgType, CommandEncoder, CommandParser, Schema, HF_IN_SHUTDOWN, MAX_ARGS};
pub use transport::Transport;

/// Protocol-fatal conditions. Every variant signals a firmware/host
/// disagreement; the dispatcher answers each with a device shutdown
/// carrying the matching reason message. Transient link noise never
/// surfaces here; the frame layer absorbs it with resync and NAK.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// Command id outside the schema, or a hole in the command table.
    UnknownCommand(u8),
    /// A command's arguments ran past the end of its frame.
    PayloadOverrun,
    /// A parser table names an encode-only argument type.
    UnsupportedArgType,
    /// More parameters than the argument vector can carry.
    ArgVectorFull,
    /// Encoder id outside the schema.
    UnknownEncoder(u8),
    /// Encoded message does not fit the encoder's declared size.
    EncodeOverflow,
    /// Argument list does not match the encoder's parameter types.
    ValueMismatch,
}

impl Error {
    /// Shutdown reason message for this fault.
    pub fn shutdown_message(&self) -> &'static str {
        match self {
            Error::UnknownCommand(_) => "Invalid command",
            Error::PayloadOverrun | Error::UnsupportedArgType | Error::ArgVectorFull => {
                "Command parser error"
            }
            Error::UnknownEncoder(_) | Error::EncodeOverflow | Error::ValueMismatch => {
                "Message encode error"
            }
        }
    }
}
