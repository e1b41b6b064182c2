//! Simulated host/device session over an in-memory link.
//!
//! Feeds two command frames to a [`Dispatcher`] and prints every frame
//! the device sends back (ACKs and the handler's status response).

use hostlink::frame::{finish_frame, DEST_TAG, HEADER_LEN};
use hostlink::schema::{ArgType, CommandEncoder, CommandParser, Schema};
use hostlink::{Arg, Dispatcher, Error, Responder, Shutdown, Transport, Value};

struct PipePort {
    rx: Vec<u8>,
    tx: Vec<u8>,
    scratch: [u8; 96],
}

impl Transport for PipePort {
    fn input_peek(&self) -> &[u8] {
        &self.rx
    }

    fn input_pop(&mut self, count: usize) {
        self.rx.drain(..count.min(self.rx.len()));
    }

    fn output_reserve(&mut self, count: usize) -> Option<&mut [u8]> {
        self.scratch.get_mut(..count)
    }

    fn output_commit(&mut self, count: usize) {
        self.tx.extend_from_slice(&self.scratch[..count]);
    }
}

struct Sched {
    down: bool,
}

impl Shutdown for Sched {
    fn is_shutdown(&self) -> bool {
        self.down
    }

    fn reason_code(&self) -> u16 {
        0
    }

    fn shutdown(&mut self, msg: &'static str) {
        self.down = true;
        eprintln!("device shutdown: {}", msg);
    }
}

const ENC_IS_SHUTDOWN: u8 = 0;
const ENC_TARGET_STATUS: u8 = 1;

fn set_target(rsp: &mut dyn Responder, args: &[Arg<'_>]) -> Result<(), Error> {
    let value = args[0].as_int().unwrap_or(0);
    println!("device: set_target value={}", value);
    rsp.send(ENC_TARGET_STATUS, &[Value::Int(value)])
}

static CMD_SET_TARGET: CommandParser = CommandParser {
    param_types: &[ArgType::Uint32],
    flags: 0,
    handler: set_target,
};

static COMMANDS: [Option<&CommandParser>; 2] = [None, Some(&CMD_SET_TARGET)];

static ENCODERS: [CommandEncoder; 2] = [
    CommandEncoder {
        msg_id: 0x71,
        param_types: &[ArgType::Uint16],
        max_size: 4,
    },
    CommandEncoder {
        msg_id: 0x72,
        param_types: &[ArgType::Uint32],
        max_size: 6,
    },
];

static SCHEMA: Schema = Schema {
    commands: &COMMANDS,
    encoders: &ENCODERS,
    shutdown_response: ENC_IS_SHUTDOWN,
};

fn host_frame(seq: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = [0u8; 64];
    buf[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);
    let len = finish_frame(&mut buf, payload.len(), seq);
    buf[..len].to_vec()
}

fn dump_frames(tx: &[u8]) {
    let mut rest = tx;
    while !rest.is_empty() {
        let len = rest[0] as usize;
        let (frame, tail) = rest.split_at(len);
        let kind = if len == 5 { "ack" } else { "msg" };
        println!(
            "device->host {} seq=0x{:02x}: {:02x?}",
            kind, frame[1], frame
        );
        rest = tail;
    }
}

fn main() {
    let mut io = PipePort {
        rx: Vec::new(),
        tx: Vec::new(),
        scratch: [0; 96],
    };
    let mut sched = Sched { down: false };
    let mut link = Dispatcher::new(&SCHEMA);

    // set_target(42), then set_target(1000), each in its own frame.
    io.rx.extend(host_frame(DEST_TAG, &[0x01, 0x2a]));
    io.rx.extend(host_frame(DEST_TAG | 0x01, &[0x01, 0x87, 0x68]));

    while !io.rx.is_empty() && !sched.down {
        link.poll(&mut io, &mut sched);
        dump_frames(&io.tx);
        io.tx.clear();
    }
}
