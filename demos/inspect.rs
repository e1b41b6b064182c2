use hostlink::frame::{finish_frame, DEST_TAG, HEADER_LEN};
use hostlink::schema::{ArgType, CommandEncoder};
use hostlink::{codec, Value};

fn main() {
    // Encode a "set_target value=%u" style command the way a host
    // would: command id byte, then VLQ arguments, then the frame
    // header/trailer stamped around it.
    let set_target = CommandEncoder {
        msg_id: 0x07,
        param_types: &[ArgType::Uint32],
        max_size: 6,
    };

    let mut buf = [0u8; 64];
    let payload_len = codec::encode_args(
        &mut buf[HEADER_LEN..HEADER_LEN + set_target.max_size as usize],
        &set_target,
        &[Value::Int(42)],
    )
    .unwrap();
    let len = finish_frame(&mut buf, payload_len, DEST_TAG);

    println!("frame len {}", len);
    for (i, b) in buf[..len].iter().enumerate() {
        print!("{:02x} ", b);
        if (i + 1) % 16 == 0 {
            println!();
        }
    }
    println!();
    println!(
        "len=0x{:02x} seq=0x{:02x} payload={:02x?} crc={:02x} {:02x} sync={:02x}",
        buf[0],
        buf[1],
        &buf[2..len - 3],
        buf[len - 3],
        buf[len - 2],
        buf[len - 1]
    );
}
