//! Schema-driven command payload codec.
//!
//! Parsing walks a command's `param_types` and yields one [`Arg`] per
//! parameter; integers are VLQ-decoded, buffers borrow their bytes
//! straight out of the received frame. Encoding is the mirror image,
//! driven by a [`CommandEncoder`] and a typed [`Value`] list in place
//! of the variadic convention the wire format grew up with.

use heapless::Vec;

use crate::schema::{ArgType, CommandEncoder, CommandParser, MAX_ARGS};
use crate::vlq;
use crate::Error;

/// One parsed command argument.
///
/// `Bytes` borrows the dispatcher's copy of the frame and is only valid
/// for the duration of the handler call; handlers copy what they keep.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arg<'a> {
    Int(u32),
    Bytes(&'a [u8]),
}

impl<'a> Arg<'a> {
    pub fn as_int(&self) -> Option<u32> {
        match *self {
            Arg::Int(v) => Some(v),
            Arg::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match *self {
            Arg::Int(_) => None,
            Arg::Bytes(b) => Some(b),
        }
    }
}

/// Bytes living in read-only program memory.
///
/// On Harvard-architecture targets this is the hook for flash-space
/// reads; on targets with a single address space it is an ordinary
/// static slice.
#[derive(Clone, Copy, Debug)]
pub struct ProgmemBytes(pub &'static [u8]);

impl ProgmemBytes {
    pub fn load(&self) -> &'static [u8] {
        self.0
    }
}

/// One outgoing message argument.
#[derive(Clone, Copy, Debug)]
pub enum Value<'a> {
    Int(u32),
    Str(&'a str),
    Bytes(&'a [u8]),
    Progmem(ProgmemBytes),
}

/// Parsed argument vector, one entry per schema parameter.
pub type ArgVec<'a> = Vec<Arg<'a>, MAX_ARGS>;

/// Parse one command's arguments from `payload` starting at `pos`.
/// Returns the cursor just past the last argument consumed.
pub fn parse_args<'a>(
    payload: &'a [u8],
    mut pos: usize,
    parser: &CommandParser,
    args: &mut ArgVec<'a>,
) -> Result<usize, Error> {
    for &ty in parser.param_types {
        match ty {
            ArgType::Uint32 | ArgType::Int32 | ArgType::Uint16 | ArgType::Int16 | ArgType::Byte => {
                let v = vlq::parse_int(payload, &mut pos)?;
                args.push(Arg::Int(v)).map_err(|_| Error::ArgVectorFull)?;
            }
            ArgType::Buffer => {
                let len = *payload.get(pos).ok_or(Error::PayloadOverrun)? as usize;
                pos += 1;
                let bytes = payload
                    .get(pos..pos + len)
                    .ok_or(Error::PayloadOverrun)?;
                args.push(Arg::Bytes(bytes)).map_err(|_| Error::ArgVectorFull)?;
                pos += len;
            }
            ArgType::String | ArgType::ProgmemBuffer => {
                // Encode-only types have no business in a parser table.
                return Err(Error::UnsupportedArgType);
            }
        }
    }
    Ok(pos)
}

/// Encode `msg_id` and `args` into `out`, which must be sized to the
/// encoder's `max_size`. Returns the payload length written.
pub fn encode_args(
    out: &mut [u8],
    encoder: &CommandEncoder,
    args: &[Value<'_>],
) -> Result<usize, Error> {
    if args.len() != encoder.param_types.len() {
        return Err(Error::ValueMismatch);
    }
    if out.is_empty() {
        return Err(Error::EncodeOverflow);
    }
    out[0] = encoder.msg_id;
    let mut pos = 1;
    for (&ty, &value) in encoder.param_types.iter().zip(args) {
        match (ty, value) {
            (ArgType::Uint32 | ArgType::Int32, Value::Int(v)) => {
                pos = vlq::encode_int(out, pos, v)?;
            }
            (ArgType::Uint16 | ArgType::Int16 | ArgType::Byte, Value::Int(v)) => {
                pos = vlq::encode_int(out, pos, v & 0xffff)?;
            }
            (ArgType::String, Value::Str(s)) => {
                pos = put_counted(out, pos, s.as_bytes())?;
            }
            (ArgType::Buffer, Value::Bytes(b)) => {
                pos = put_counted(out, pos, b)?;
            }
            (ArgType::ProgmemBuffer, Value::Progmem(pm)) => {
                pos = put_counted(out, pos, pm.load())?;
            }
            _ => return Err(Error::ValueMismatch),
        }
    }
    Ok(pos)
}

/// Write a length byte followed by `bytes`, clamped to the remaining
/// space. For strings this is silent truncation with the length byte
/// back-patched; no NUL terminator is written.
fn put_counted(out: &mut [u8], pos: usize, bytes: &[u8]) -> Result<usize, Error> {
    if pos >= out.len() {
        return Err(Error::EncodeOverflow);
    }
    let room = out.len() - pos - 1;
    let take = bytes.len().min(room);
    out[pos] = take as u8;
    out[pos + 1..pos + 1 + take].copy_from_slice(&bytes[..take]);
    Ok(pos + 1 + take)
}
