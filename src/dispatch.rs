//! Polled command dispatcher.
//!
//! One [`Dispatcher::poll`] call drains at most one frame from the
//! transport, so a large input backlog cannot starve the other tasks on
//! the cooperative scheduler. Commands inside a frame run in wire
//! order; frames run in sequence-number order because the frame layer
//! refuses anything else.

use crate::codec::{self, Arg, ArgVec, Value};
use crate::frame::{self, FrameReceiver, FRAME_MIN, HEADER_LEN};
use crate::schema::{Schema, HF_IN_SHUTDOWN};
use crate::transport::Transport;
use crate::Error;

/// Shutdown subsystem hook.
///
/// `shutdown` records the fault and arms the device's shutdown state;
/// the dispatcher stops working on the current frame once it has been
/// called. `reason_code` is the static string id reported back to the
/// host for commands that arrive while the device is down.
pub trait Shutdown {
    fn is_shutdown(&self) -> bool;
    fn reason_code(&self) -> u16;
    fn shutdown(&mut self, msg: &'static str);
}

/// Reply channel handed to command handlers.
pub trait Responder {
    fn send(&mut self, encoder_id: u8, args: &[Value<'_>]) -> Result<(), Error>;
}

/// Command handler entry point. Arguments arrive in schema order;
/// buffer arguments borrow the current frame and must be copied if
/// kept. A returned error is a fatal schema violation.
pub type Handler = fn(&mut dyn Responder, &[Arg<'_>]) -> Result<(), Error>;

struct FrameResponder<'a, T: Transport> {
    io: &'a mut T,
    schema: &'static Schema,
    seq: u8,
}

impl<T: Transport> Responder for FrameResponder<'_, T> {
    fn send(&mut self, encoder_id: u8, args: &[Value<'_>]) -> Result<(), Error> {
        transmit(self.schema, self.seq, self.io, encoder_id, args)
    }
}

/// Encode one message and hand it to the transport as a complete frame.
/// A saturated link drops the message silently; the host retransmits
/// whatever it misses an ACK for.
fn transmit<T: Transport>(
    schema: &'static Schema,
    seq: u8,
    io: &mut T,
    encoder_id: u8,
    args: &[Value<'_>],
) -> Result<(), Error> {
    let encoder = schema
        .encoder(encoder_id)
        .ok_or(Error::UnknownEncoder(encoder_id))?;
    let max = encoder.max_size as usize;
    let buf = match io.output_reserve(max + FRAME_MIN) {
        Some(buf) => buf,
        None => return Ok(()),
    };
    let payload_len = if max == 0 {
        0
    } else {
        codec::encode_args(&mut buf[HEADER_LEN..HEADER_LEN + max], encoder, args)?
    };
    let msglen = frame::finish_frame(buf, payload_len, seq);
    io.output_commit(msglen);
    Ok(())
}

/// The protocol core. Owns the receive state machine and the schema
/// reference; the transport and shutdown subsystem are borrowed per
/// call so they stay with their own tasks.
pub struct Dispatcher {
    schema: &'static Schema,
    receiver: FrameReceiver,
}

impl Dispatcher {
    pub const fn new(schema: &'static Schema) -> Self {
        Dispatcher {
            schema,
            receiver: FrameReceiver::new(),
        }
    }

    /// Sequence byte stamped into outgoing messages.
    pub fn sequence(&self) -> u8 {
        self.receiver.sequence()
    }

    /// Send an asynchronous device→host message. Available to any task;
    /// stamps the current sequence number and never advances it.
    pub fn send<T: Transport>(
        &self,
        io: &mut T,
        encoder_id: u8,
        args: &[Value<'_>],
    ) -> Result<(), Error> {
        transmit(self.schema, self.receiver.sequence(), io, encoder_id, args)
    }

    /// Background task body: extract one frame, run its commands.
    pub fn poll<T: Transport, S: Shutdown>(&mut self, io: &mut T, sys: &mut S) {
        let payload = match self.receiver.try_read(io) {
            Some(payload) => payload,
            None => return,
        };
        let mut pos = 0;
        while pos < payload.len() {
            let command_id = payload[pos];
            pos += 1;
            let parser = match self.schema.parser(command_id) {
                Some(parser) => parser,
                None => {
                    sys.shutdown(Error::UnknownCommand(command_id).shutdown_message());
                    return;
                }
            };
            if sys.is_shutdown() && parser.flags & HF_IN_SHUTDOWN == 0 {
                // Not safe to run while down; tell the host why and
                // skip the rest of the frame.
                let reason = sys.reason_code();
                if let Err(err) = self.send(
                    io,
                    self.schema.shutdown_response,
                    &[Value::Int(reason as u32)],
                ) {
                    sys.shutdown(err.shutdown_message());
                }
                return;
            }
            let mut args = ArgVec::new();
            pos = match codec::parse_args(&payload, pos, parser, &mut args) {
                Ok(next) => next,
                Err(err) => {
                    sys.shutdown(err.shutdown_message());
                    return;
                }
            };
            let mut responder = FrameResponder {
                io: &mut *io,
                schema: self.schema,
                seq: self.receiver.sequence(),
            };
            if let Err(err) = (parser.handler)(&mut responder, &args) {
                sys.shutdown(err.shutdown_message());
                return;
            }
        }
    }
}
